use url::Url;

/// The identity of the page being corrected. Exclusion lists are keyed by this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SiteId(String);

impl SiteId {
    /// Derive the site identity of `url`: its lowercased host, or the empty string for
    /// host-less pages such as `about:blank` or `file://` documents.
    pub fn from_url(url: &Url) -> Self {
        Self(url.host_str().unwrap_or_default().to_ascii_lowercase())
    }

    pub fn from_hostname(hostname: &str) -> Self {
        Self(hostname.trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SiteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
