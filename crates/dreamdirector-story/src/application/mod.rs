//! Command and query handlers for story sessions.

pub mod command_handlers;
pub mod query_handlers;
