use std::ops::{Deref, DerefMut};

use rtlfix_dom::{BaseDocument, DocumentConfig};

use crate::DocumentHtmlParser;

/// A [`BaseDocument`] built from HTML source.
pub struct HtmlDocument {
    inner: BaseDocument,
}

impl Deref for HtmlDocument {
    type Target = BaseDocument;

    fn deref(&self) -> &BaseDocument {
        &self.inner
    }
}

impl DerefMut for HtmlDocument {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl From<HtmlDocument> for BaseDocument {
    fn from(doc: HtmlDocument) -> BaseDocument {
        doc.inner
    }
}

impl HtmlDocument {
    /// Parse HTML (or XHTML) into an [`HtmlDocument`]
    pub fn from_html(html: &str, config: DocumentConfig) -> Self {
        let mut doc = BaseDocument::new(config);
        DocumentHtmlParser::parse_into_doc(&mut doc, html);
        HtmlDocument { inner: doc }
    }

    pub fn into_inner(self) -> BaseDocument {
        self.inner
    }
}
