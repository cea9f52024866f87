//! DreamDirector Core: shared domain abstractions.
//!
//! Traits and value types every other crate builds on: the event-sourced
//! aggregate seam, the clock, the error taxonomy, media references and the
//! generative provider ports. No infrastructure code lives here.

pub mod aggregate;
pub mod clock;
pub mod error;
pub mod event;
pub mod media;
pub mod provider;
pub mod repository;
