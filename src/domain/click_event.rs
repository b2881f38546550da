//! Click event model for asynchronous click counting.

use std::time::Instant;

/// A successful redirect resolution waiting to be applied to the store.
///
/// Created by [`crate::application::services::RedirectService`] and consumed
/// by [`crate::domain::click_worker::run_click_worker`].
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub short_code: String,
    pub received_at: Instant,
}

impl ClickEvent {
    /// Creates a click event stamped with the current instant.
    pub fn new(short_code: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            received_at: Instant::now(),
        }
    }
}
