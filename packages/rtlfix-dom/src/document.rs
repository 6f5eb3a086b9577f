use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use rtlfix_traits::site::SiteId;
use slab::Slab;

use crate::observer::MutationObserver;
use crate::style::{Origin, Stylesheet};
use crate::{DEFAULT_CSS, DocumentConfig, DocumentMutator, DocumentUrl, Node, NodeData, NodeFlags, TextNodeData};

pub struct BaseDocument {
    /// ID of the document
    id: usize,

    /// The page url. Its host is the site identity used by exclusion lists.
    pub(crate) url: DocumentUrl,

    /// A slab-backed tree of nodes. Node 0 is always the `Document` node.
    pub nodes: Box<Slab<Node>>,

    /// Stylesheets added by the useragent
    pub(crate) ua_stylesheets: Vec<Stylesheet>,
    /// Map of `<style>` node IDs to their parsed stylesheet
    pub(crate) author_stylesheets: BTreeMap<usize, Stylesheet>,

    /// Registered mutation observers
    pub(crate) observers: Slab<MutationObserver>,
}

impl BaseDocument {
    /// Create a new (empty) [`BaseDocument`] with the specified configuration
    pub fn new(config: DocumentConfig) -> Self {
        static ID_GENERATOR: AtomicUsize = AtomicUsize::new(1);

        let id = ID_GENERATOR.fetch_add(1, Ordering::SeqCst);

        let url = config
            .base_url
            .and_then(|url| match DocumentUrl::from_str(&url) {
                Ok(url) => Some(url),
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("failed to parse document url {url:?}: {_err}");
                    None
                }
            })
            .unwrap_or_default();

        let mut doc = Self {
            id,
            url,
            nodes: Box::new(Slab::new()),
            ua_stylesheets: Vec::new(),
            author_stylesheets: BTreeMap::new(),
            observers: Slab::new(),
        };

        // Initialise document with root Document node
        doc.create_node(NodeData::Document);
        doc.root_node_mut().flags.insert(NodeFlags::IS_IN_DOCUMENT);

        match config.ua_stylesheets {
            Some(stylesheets) => {
                for css in &stylesheets {
                    doc.add_user_agent_stylesheet(css);
                }
            }
            None => doc.add_user_agent_stylesheet(DEFAULT_CSS),
        }

        doc
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn url(&self) -> &DocumentUrl {
        &self.url
    }

    /// The site identity of the page: the host of its url.
    pub fn site_id(&self) -> SiteId {
        SiteId::from_url(&self.url)
    }

    /// Set the page url
    pub fn set_base_url(&mut self, url: &str) {
        match DocumentUrl::from_str(url) {
            Ok(parsed) => self.url = parsed,
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("failed to parse document url {url:?}: {_err}; keeping {}", *self.url);
            }
        }
    }

    pub fn tree(&self) -> &Slab<Node> {
        &self.nodes
    }

    pub fn get_node(&self, node_id: usize) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn get_node_mut(&mut self, node_id: usize) -> Option<&mut Node> {
        self.nodes.get_mut(node_id)
    }

    pub fn root_node(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn root_node_mut(&mut self) -> &mut Node {
        &mut self.nodes[0]
    }

    /// The `<html>` element, if the document has one yet
    pub fn try_root_element(&self) -> Option<&Node> {
        self.root_node()
            .children
            .iter()
            .filter_map(|&id| self.nodes.get(id))
            .find(|node| node.is_element())
    }

    /// The `<body>` element, if it has been created and attached yet
    pub fn body(&self) -> Option<&Node> {
        self.try_root_element()?
            .children
            .iter()
            .filter_map(|&id| self.nodes.get(id))
            .find(|node| node.local_name() == Some("body"))
    }

    pub fn body_id(&self) -> Option<usize> {
        self.body().map(|node| node.id)
    }

    pub fn create_node(&mut self, node_data: NodeData) -> usize {
        let entry = self.nodes.vacant_entry();
        let id = entry.key();
        entry.insert(Node::new(id, node_data));
        id
    }

    pub fn create_text_node(&mut self, text: &str) -> usize {
        let data = NodeData::Text(TextNodeData::new(text.to_string()));
        self.create_node(data)
    }

    pub fn mutate<'doc>(&'doc mut self) -> DocumentMutator<'doc> {
        DocumentMutator::new(self)
    }

    /// Concatenated text of all descendant text nodes, in tree order.
    pub fn text_content(&self, node_id: usize) -> String {
        let mut out = String::new();
        for id in crate::TreeTraverser::new_with_root(self, node_id) {
            if let Some(text) = self.nodes.get(id).and_then(Node::text_data) {
                out.push_str(&text.content);
            }
        }
        out
    }

    /// The nearest ancestor of `node_id` which is an element.
    pub fn parent_element(&self, node_id: usize) -> Option<usize> {
        let parent_id = self.nodes.get(node_id)?.parent?;
        let parent = self.nodes.get(parent_id)?;
        parent.is_element().then_some(parent_id)
    }

    /// Iterate over the ancestors of `node_id`, nearest first, excluding the node itself.
    pub fn ancestors(&self, node_id: usize) -> impl Iterator<Item = &Node> {
        let mut current = self.nodes.get(node_id).and_then(|node| node.parent);
        let mut remaining = self.nodes.len();
        std::iter::from_fn(move || {
            let node = self.nodes.get(current?)?;
            remaining = remaining.checked_sub(1)?;
            current = node.parent;
            Some(node)
        })
    }

    pub fn is_inclusive_ancestor(&self, ancestor_id: usize, node_id: usize) -> bool {
        ancestor_id == node_id || self.ancestors(node_id).any(|node| node.id == ancestor_id)
    }

    pub fn add_user_agent_stylesheet(&mut self, css: &str) {
        self.ua_stylesheets.push(Stylesheet::parse(css, Origin::UserAgent));
    }

    /// (Re)parse the contents of a `<style>` element into an author stylesheet.
    pub fn upsert_stylesheet_for_node(&mut self, node_id: usize) {
        let css = self.text_content(node_id);
        let sheet = Stylesheet::parse(&css, Origin::Author);
        self.author_stylesheets.insert(node_id, sheet);
    }

    pub fn remove_stylesheet_for_node(&mut self, node_id: usize) {
        self.author_stylesheets.remove(&node_id);
    }
}
