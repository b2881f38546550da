//! Application layer services.
//!
//! Services coordinate the mapping store, the code generator, the redirect
//! cache and the click queue. Each is generic over the repository so unit
//! tests can substitute mocks; the server uses the `dyn LinkRepository`
//! default.
//!
//! - [`services::ShortenService`] - URL validation and collision-free code allocation
//! - [`services::RedirectService`] - code resolution and click dispatch
//! - [`services::LinkService`] - link listing and lookup

pub mod services;
