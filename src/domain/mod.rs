//! Domain layer: entities, the mapping store contract and the click pipeline.
//!
//! # Modules
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Storage trait definitions
//! - [`click_event`] - Click queue item
//! - [`click_worker`] - Click queue dispatcher and background worker
//!
//! # Click Processing Flow
//!
//! 1. [`crate::application::services::RedirectService`] resolves a short code
//! 2. A [`click_event::ClickEvent`] is dispatched to the bounded click queue
//! 3. [`click_worker::run_click_worker`] coalesces events per code
//! 4. Counters are updated via [`repositories::LinkRepository::add_clicks`]

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
