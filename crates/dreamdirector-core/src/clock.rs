//! Clock abstraction so timestamps and media filenames stay deterministic
//! under test.

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Compact `YYYYmmdd_HHMMSS` stamp used in generated file names.
    fn file_stamp(&self) -> String {
        self.now().format("%Y%m%d_%H%M%S").to_string()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
