//! Story domain model.

pub mod aggregates;
pub mod arc;
pub mod commands;
pub mod events;
pub mod prompts;
pub mod scenario;
