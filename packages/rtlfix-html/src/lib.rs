//! HTML parsing for rtlfix.
//!
//! Parses HTML (or XHTML) into a [`BaseDocument`](rtlfix_dom::BaseDocument) using html5ever.

mod html_document;
mod html_sink;

pub use html_document::HtmlDocument;
pub use html_sink::DocumentHtmlParser;
