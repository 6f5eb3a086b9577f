//! An implementation for Html5ever's sink trait, allowing us to parse HTML into a DOM.

use std::borrow::Cow;
use std::cell::{Cell, Ref, RefCell, RefMut};

use html5ever::ParseOpts;
use html5ever::tokenizer::TokenizerOpts;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{
    QualName,
    tendril::{StrTendril, TendrilSink},
    tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink},
};
use rtlfix_dom::{Attribute, BaseDocument, DocumentMutator, MutationError};

/// Convert an html5ever Attribute which uses tendril for its value to an rtlfix Attribute
/// which uses String.
fn html5ever_to_rtlfix_attr(attr: html5ever::Attribute) -> Attribute {
    Attribute {
        name: attr.name,
        value: attr.value.to_string(),
    }
}

pub struct DocumentHtmlParser<'doc> {
    document_mutator: RefCell<DocumentMutator<'doc>>,

    /// Errors that occurred during parsing.
    pub errors: RefCell<Vec<Cow<'static, str>>>,

    /// The document's quirks mode.
    pub quirks_mode: Cell<QuirksMode>,
    pub is_xml: bool,
}

impl<'doc> DocumentHtmlParser<'doc> {
    #[track_caller]
    /// Get a mutable borrow of the DocumentMutator
    fn mutr(&self) -> RefMut<'_, DocumentMutator<'doc>> {
        self.document_mutator.borrow_mut()
    }

    fn record(&self, result: Result<(), MutationError>) {
        if let Err(err) = result {
            self.errors.borrow_mut().push(Cow::Owned(err.to_string()));
        }
    }
}

impl DocumentHtmlParser<'_> {
    pub fn new(doc: &mut BaseDocument) -> DocumentHtmlParser<'_> {
        DocumentHtmlParser {
            document_mutator: RefCell::new(doc.mutate()),
            errors: RefCell::new(Vec::new()),
            quirks_mode: Cell::new(QuirksMode::NoQuirks),
            is_xml: false,
        }
    }

    pub fn parse_into_doc<'d>(doc: &'d mut BaseDocument, html: &str) -> &'d mut BaseDocument {
        let mut sink = Self::new(doc);

        let is_xhtml_doc = html.starts_with("<?xml")
            || html.starts_with("<!DOCTYPE")
                && html
                    .lines()
                    .next()
                    .is_some_and(|first_line| first_line.contains("XHTML") || first_line.contains("xhtml"));
        sink.is_xml = is_xhtml_doc;

        let opts = if is_xhtml_doc {
            ParseOpts::default()
        } else {
            ParseOpts {
                tokenizer: TokenizerOpts::default(),
                tree_builder: TreeBuilderOpts {
                    exact_errors: false,
                    scripting_enabled: false, // Enables parsing of <noscript> tags
                    iframe_srcdoc: false,
                    drop_doctype: true,
                    quirks_mode: QuirksMode::NoQuirks,
                    ..Default::default()
                },
            }
        };

        if let Err(_err) = html5ever::parse_document(sink, opts)
            .from_utf8()
            .read_from(&mut html.as_bytes())
        {
            #[cfg(feature = "tracing")]
            tracing::warn!("failed to read html input: {_err}");
        }

        doc
    }
}

impl<'b> TreeSink for DocumentHtmlParser<'b> {
    type Output = ();

    // we use the ID of the nodes in the tree as the handle
    type Handle = usize;

    type ElemName<'a>
        = Ref<'a, QualName>
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        let errors = self.errors.into_inner();
        // Dropping the mutator flushes stylesheets of parsed <style> elements
        drop(self.document_mutator.into_inner());

        #[cfg(feature = "tracing")]
        for error in &errors {
            tracing::debug!("html parse error: {error}");
        }
        #[cfg(not(feature = "tracing"))]
        let _ = errors;
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.errors.borrow_mut().push(msg);
    }

    fn get_document(&self) -> Self::Handle {
        0
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        Ref::map(self.document_mutator.borrow(), |mutr| {
            mutr.element_name(*target)
                .expect("TreeSink::elem_name called on a node which is not an element!")
        })
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<html5ever::Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let attrs = attrs.into_iter().map(html5ever_to_rtlfix_attr).collect();
        self.mutr().create_element(name, attrs)
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        self.mutr().create_comment_node()
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        self.mutr().create_comment_node()
    }

    fn append(&self, parent_id: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(id) => {
                let result = self.mutr().append_children(*parent_id, &[id]);
                self.record(result);
            }
            // If content to append is text, first attempt to append it to the last child of parent.
            // Else create a new text node and append it to the parent
            NodeOrText::AppendText(text) => {
                let last_child_id = self.mutr().last_child_id(*parent_id);
                let has_appended = if let Some(id) = last_child_id {
                    self.mutr().append_text_to_node(id, &text).is_ok()
                } else {
                    false
                };
                if !has_appended {
                    let new_child_id = self.mutr().create_text_node(&text);
                    let result = self.mutr().append_children(*parent_id, &[new_child_id]);
                    self.record(result);
                }
            }
        }
    }

    // Note: The tree builder promises we won't have a text node after the insertion point.
    // https://github.com/servo/html5ever/blob/main/rcdom/lib.rs#L338
    fn append_before_sibling(&self, sibling_id: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        match new_node {
            NodeOrText::AppendNode(id) => {
                let result = self.mutr().insert_nodes_before(*sibling_id, &[id]);
                self.record(result);
            }
            // If content to append is text, first attempt to append it to the node before sibling_node
            // Else create a new text node and insert it before sibling_node
            NodeOrText::AppendText(text) => {
                let previous_sibling_id = self.mutr().previous_sibling_id(*sibling_id);
                let has_appended = if let Some(id) = previous_sibling_id {
                    self.mutr().append_text_to_node(id, &text).is_ok()
                } else {
                    false
                };
                if !has_appended {
                    let new_child_id = self.mutr().create_text_node(&text);
                    let result = self.mutr().insert_nodes_before(*sibling_id, &[new_child_id]);
                    self.record(result);
                }
            }
        };
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = self.mutr().node_has_parent(*element);
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        // Ignore. We don't care about the DOCTYPE.
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        // Template contents are parsed as regular children; the UA sheet hides <template>.
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        self.quirks_mode.set(mode);
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<html5ever::Attribute>) {
        let attrs = attrs.into_iter().map(html5ever_to_rtlfix_attr).collect();
        let result = self.mutr().add_attrs_if_missing(*target, attrs);
        self.record(result);
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        let result = self.mutr().remove_node(*target);
        self.record(result);
    }

    fn reparent_children(&self, old_parent_id: &Self::Handle, new_parent_id: &Self::Handle) {
        let result = self.mutr().reparent_children(*old_parent_id, *new_parent_id);
        self.record(result);
    }
}

#[cfg(test)]
mod tests {
    use rtlfix_dom::{BaseDocument, DocumentConfig, Display};

    use super::DocumentHtmlParser;
    use crate::HtmlDocument;

    #[test]
    fn parses_some_html() {
        let html = "<!DOCTYPE html><html><body><h1>hello world</h1></body></html>";
        let mut doc = BaseDocument::new(DocumentConfig::default());
        DocumentHtmlParser::parse_into_doc(&mut doc, html);

        let h1 = doc.get_elements_by_tag_name("h1");
        assert_eq!(h1.len(), 1);
        assert_eq!(doc.text_content(h1[0]), "hello world");
        assert!(doc.get_node(h1[0]).unwrap().is_in_document());
    }

    #[test]
    fn body_is_created_for_fragments() {
        let doc = HtmlDocument::from_html("<p>سلام</p>", DocumentConfig::default());
        let body = doc.body_id().expect("parser creates a body");
        let p = doc.get_elements_by_tag_name("p")[0];
        assert_eq!(doc.parent_element(p), Some(body));
    }

    #[test]
    fn style_elements_become_author_stylesheets() {
        let doc = HtmlDocument::from_html(
            "<html><head><style>.gone { display: none }</style></head><body><p class=gone>x</p></body></html>",
            DocumentConfig::default(),
        );
        let p = doc.get_elements_by_tag_name("p")[0];
        assert_eq!(doc.computed_style(p).unwrap().display, Display::None);
    }

    #[test]
    fn svg_elements_keep_their_namespace() {
        let doc = HtmlDocument::from_html("<svg><text>سلام</text></svg>", DocumentConfig::default());
        let text = doc.get_elements_by_tag_name("text")[0];
        let element = doc.get_node(text).unwrap().element_data().unwrap();
        assert_eq!(element.namespace(), rtlfix_dom::SVG_NAMESPACE);
    }
}
