//! Core domain entities.
//!
//! - [`ShortLink`] - a stored short code to target URL mapping
//! - [`NewShortLink`] - input for inserting a new mapping

pub mod short_link;

pub use short_link::{NewShortLink, ShortLink};
