//! # Tactics Headless
//!
//! Headless battle runner for CI verification and balance testing.
//!
//! Loads RON scenarios, assembles them into [`tactics_core`] battles,
//! and runs them - one seed at a time or as a parallel batch - emitting
//! JSON event logs and outcome summaries.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod runner;
pub mod scenario;
