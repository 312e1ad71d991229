//! Fixed-point math and grid geometry for deterministic simulation.
//!
//! All real-valued simulation math (distances, dice averages) uses
//! fixed-point arithmetic to ensure deterministic behavior across
//! platforms. Floating-point operations can produce different results
//! on different CPUs.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// An integer grid coordinate.
///
/// Positions are plain value types; equality and hashing make them usable
/// directly as grid map keys. `Ord` gives a deterministic sort order
/// (row-major) for iteration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Column coordinate.
    pub x: i32,
    /// Row coordinate.
    pub y: i32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (chessboard) distance to another position.
    ///
    /// This is the number of 8-directional steps between the two cells,
    /// and the adjacency metric for melee range.
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx.max(dy)
    }

    /// Euclidean distance to another position, in fixed-point.
    ///
    /// Used as the A* heuristic and step-cost metric: a cardinal step
    /// costs 1, a diagonal step costs √2.
    #[must_use]
    pub fn euclidean_distance(self, other: Self) -> Fixed {
        let dx = Fixed::from_num(self.x - other.x);
        let dy = Fixed::from_num(self.y - other.y);
        fixed_sqrt(dx * dx + dy * dy)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Computes the square root of a fixed-point number using binary search.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::from_num(1) {
        value
    } else {
        Fixed::from_num(1)
    };

    for _ in 0..32 {
        let mid = (low + high) / Fixed::from_num(2);
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chebyshev_distance() {
        let a = Position::new(0, 0);
        assert_eq!(a.chebyshev_distance(Position::new(5, 5)), 5);
        assert_eq!(a.chebyshev_distance(Position::new(3, 7)), 7);
        assert_eq!(a.chebyshev_distance(Position::new(-2, 1)), 2);
        assert_eq!(a.chebyshev_distance(a), 0);
    }

    #[test]
    fn test_euclidean_distance() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        // 3-4-5 triangle, exact in fixed-point
        let d = a.euclidean_distance(b);
        let epsilon = Fixed::from_num(1) / Fixed::from_num(10000);
        assert!((d - Fixed::from_num(5)).abs() < epsilon, "got {d:?}");
    }

    #[test]
    fn test_diagonal_step_cost() {
        let d = Position::new(0, 0).euclidean_distance(Position::new(1, 1));
        // √2 ≈ 1.41421356
        let expected = fixed_sqrt(Fixed::from_num(2));
        assert_eq!(d, expected);
        assert!(d > Fixed::from_num(1.41) && d < Fixed::from_num(1.42));
    }

    #[test]
    fn test_fixed_determinism() {
        // Same operations must produce identical results
        let a = Position::new(2, 3).euclidean_distance(Position::new(9, -4));
        let b = Position::new(2, 3).euclidean_distance(Position::new(9, -4));
        assert_eq!(a, b);
    }
}
