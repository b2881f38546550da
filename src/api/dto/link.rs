//! Link representations returned by the API.

use serde::{Deserialize, Serialize};

use crate::domain::entities::ShortLink;

/// A short link as seen by API clients.
///
/// Exactly the four public fields of the record; nothing else is exposed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShortLinkResponse {
    pub id: i64,
    pub target_url: String,
    pub short_code: String,
    pub clicks: u64,
}

impl From<ShortLink> for ShortLinkResponse {
    fn from(link: ShortLink) -> Self {
        Self {
            id: link.id,
            target_url: link.target_url,
            short_code: link.short_code,
            clicks: link.clicks,
        }
    }
}

/// `GET /api/urls` response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkListResponse {
    pub urls: Vec<ShortLinkResponse>,
}

/// `GET /api/urls` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}
