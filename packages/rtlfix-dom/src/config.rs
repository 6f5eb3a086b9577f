/// Options used when constructing a [`BaseDocument`](crate::BaseDocument)
#[derive(Debug, Clone, Default)]
pub struct DocumentConfig {
    /// The url of the page. Its host is the page's site identity.
    pub base_url: Option<String>,
    /// User Agent stylesheets. Defaults to [`DEFAULT_CSS`](crate::DEFAULT_CSS)
    pub ua_stylesheets: Option<Vec<String>>,
}

impl DocumentConfig {
    pub fn with_base_url(url: impl Into<String>) -> Self {
        Self {
            base_url: Some(url.into()),
            ..Default::default()
        }
    }
}
