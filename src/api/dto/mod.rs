//! Data Transfer Objects for API requests and responses.
//!
//! Domain entities are never serialized directly; handlers convert them
//! into these types.

pub mod health;
pub mod link;
pub mod shorten;
