//! Generated media library.
//!
//! Writes provider output into the media directory under predictable names
//! and serves it back by bare file name, searching a list of directories.

mod error;
mod library;

pub use error::MediaError;
pub use library::{MediaLibrary, ResolvedMedia, content_type_for};
