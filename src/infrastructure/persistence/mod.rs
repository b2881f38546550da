//! Mapping store implementations.
//!
//! # Repositories
//!
//! - [`MemoryLinkRepository`] - sharded in-process store, used when no database is configured
//! - [`PgLinkRepository`] - PostgreSQL store via SQLx

pub mod memory_link_repository;
pub mod pg_link_repository;

pub use memory_link_repository::MemoryLinkRepository;
pub use pg_link_repository::PgLinkRepository;
