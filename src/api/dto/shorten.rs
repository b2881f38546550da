//! DTOs for the shorten endpoint.

use serde::Deserialize;
use validator::Validate;

/// Request to shorten a single URL.
///
/// ```json
/// { "target_url": "https://example.com/a/very/long/path" }
/// ```
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// Absolute http(s) URL to redirect to.
    #[validate(url(message = "Invalid URL format"))]
    pub target_url: String,
}
