//! Target URL validation and canonicalisation.
//!
//! Every target URL stored by the service passes through [`normalize_url`],
//! so the store only ever holds absolute `http`/`https` URLs in a stable form.

use url::Url;

/// Longest target URL accepted, in bytes, after canonicalisation.
pub const MAX_URL_LENGTH: usize = 2048;

/// Reasons a target URL is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,

    #[error("URL exceeds 2048 characters")]
    TooLong,

    #[error("Failed to normalize URL: {0}")]
    NormalizationFailed(String),
}

/// Validates `input` as an absolute `http`/`https` URL and returns its
/// canonical form.
///
/// Canonicalisation lowercases the host and removes an explicit default port
/// (80 for HTTP, 443 for HTTPS). Path, query and fragment are kept verbatim
/// apart from the percent-encoding applied by the URL parser.
///
/// # Errors
///
/// - [`UrlNormalizationError::InvalidFormat`] for anything that is not an absolute URL
/// - [`UrlNormalizationError::UnsupportedProtocol`] for schemes like `javascript:`, `ftp:`, `data:`
/// - [`UrlNormalizationError::MissingHost`] when the URL has no host
/// - [`UrlNormalizationError::TooLong`] beyond [`MAX_URL_LENGTH`]
///
/// # Examples
///
/// ```
/// use shortlink::utils::url_normalizer::normalize_url;
///
/// assert_eq!(
///     normalize_url("HTTPS://Example.COM:443/a/very/long/path").unwrap(),
///     "https://example.com/a/very/long/path"
/// );
/// assert!(normalize_url("not-a-url").is_err());
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(UrlNormalizationError::TooLong);
    }

    let mut url =
        Url::parse(trimmed).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlNormalizationError::UnsupportedProtocol);
    }

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_ascii_lowercase(),
        _ => return Err(UrlNormalizationError::MissingHost),
    };
    url.set_host(Some(&host))
        .map_err(|e| UrlNormalizationError::NormalizationFailed(e.to_string()))?;

    if matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        url.set_port(None).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to remove default port".to_string())
        })?;
    }

    let normalized = String::from(url);
    if normalized.len() > MAX_URL_LENGTH {
        return Err(UrlNormalizationError::TooLong);
    }

    Ok(normalized)
}
