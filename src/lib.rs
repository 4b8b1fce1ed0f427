//! Daily step counter. Reads today's steps from a health-data provider and tracks progress
//! towards a daily goal, see [tracker::StepGoalTracker].
//!

pub mod cli;
pub mod health;
pub mod tracker;
pub mod utils;
