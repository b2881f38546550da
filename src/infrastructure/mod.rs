//! Infrastructure layer: concrete storage and caching backends behind the
//! domain traits.
//!
//! - [`cache`] - redirect cache (Redis or disabled)
//! - [`persistence`] - mapping store implementations (in-memory, PostgreSQL)

pub mod cache;
pub mod persistence;
