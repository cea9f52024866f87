//! Shared test doubles for the DreamDirector workspace.

mod clock;
mod media;
mod providers;
mod repository;

pub use clock::{FixedClock, fixed_now};
pub use media::InMemoryMediaStore;
pub use providers::{FailingProvider, ScriptedTextGenerator, StaticAssetGenerator, provider_set};
pub use repository::{EmptyEventRepository, FailingEventRepository, RecordingEventRepository};
