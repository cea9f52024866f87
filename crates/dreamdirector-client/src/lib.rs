//! DreamDirector client.
//!
//! A single-owner state store for the current story and the media it
//! produced, an HTTP client for the backend, and the controller that ties a
//! user action to both. The `dreamdirector` binary puts a terminal front end
//! on top.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod persistence;
pub mod store;
pub mod view;
