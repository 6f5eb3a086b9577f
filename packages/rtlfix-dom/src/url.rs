use std::ops::Deref;
use std::str::FromStr;

use url::Url;

/// The url of a document, defaulting to `about:blank`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUrl {
    url: Url,
}

impl DocumentUrl {
    /// Resolve a relative url against this one
    pub fn resolve_relative(&self, raw: &str) -> Option<Url> {
        self.url.join(raw).ok()
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }
}

impl Default for DocumentUrl {
    fn default() -> Self {
        Self::from(Url::parse("about:blank").expect("about:blank is a valid url"))
    }
}

impl FromStr for DocumentUrl {
    type Err = url::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Url::parse(s).map(Self::from)
    }
}

impl From<Url> for DocumentUrl {
    fn from(url: Url) -> Self {
        Self { url }
    }
}

impl Deref for DocumentUrl {
    type Target = Url;

    fn deref(&self) -> &Self::Target {
        &self.url
    }
}
