//! DreamDirector story orchestration.
//!
//! Turns a player's story request into a five-choice adventure: picks an
//! opening scenario, asks the text provider for choices and outcomes, walks
//! the scripted story arc, and directs image, video and music generation.
//! Session state is event-sourced through `dreamdirector_core::repository`.

pub mod application;
pub mod domain;
pub mod infrastructure;
