//! ShortLink entity representing a short code to target URL mapping.

/// A stored mapping between a short code and its target URL.
///
/// Values of this type are snapshots handed out by the store. Only the
/// `clicks` counter ever changes for a record, and only inside the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub id: i64,
    pub target_url: String,
    pub short_code: String,
    pub clicks: u64,
}

impl ShortLink {
    /// Creates a new ShortLink snapshot.
    pub fn new(id: i64, target_url: String, short_code: String, clicks: u64) -> Self {
        Self {
            id,
            target_url,
            short_code,
            clicks,
        }
    }
}

/// Input data for inserting a new mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub short_code: String,
    pub target_url: String,
}

impl NewShortLink {
    pub fn new(short_code: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            target_url: target_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_link_creation() {
        let link = ShortLink::new(
            1,
            "https://example.com/a/very/long/path".to_string(),
            "aZ3kq1".to_string(),
            0,
        );

        assert_eq!(link.id, 1);
        assert_eq!(link.target_url, "https://example.com/a/very/long/path");
        assert_eq!(link.short_code, "aZ3kq1");
        assert_eq!(link.clicks, 0);
    }

    #[test]
    fn test_new_short_link_creation() {
        let new_link = NewShortLink::new("xyz7890", "https://rust-lang.org");

        assert_eq!(new_link.short_code, "xyz7890");
        assert_eq!(new_link.target_url, "https://rust-lang.org");
    }
}
