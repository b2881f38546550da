//! REST API layer for HTTP request/response handling.
//!
//! - [`dto`] - request and response bodies
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - tracing and CORS layers
//! - [`routes`] - `/api` route table

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
