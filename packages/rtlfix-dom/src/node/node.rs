use bitflags::bitflags;

use super::{ElementData, ProcessingMark};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct NodeFlags: u32 {
        /// Whether the node is connected to the document root
        const IS_IN_DOCUMENT = 0b00000001;
        /// The node was evaluated for direction correction and needed no action
        const CHECKED = 0b00000010;
    }
}

impl NodeFlags {
    #[inline(always)]
    pub fn is_in_document(&self) -> bool {
        self.contains(Self::IS_IN_DOCUMENT)
    }

    #[inline(always)]
    pub fn is_checked(&self) -> bool {
        self.contains(Self::CHECKED)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    Comment,
}

/// The different kinds of nodes in the DOM.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// The `Document` itself - the root node of a HTML document.
    Document,

    /// An element with attributes.
    Element(ElementData),

    /// A text node.
    Text(TextNodeData),

    /// A comment.
    Comment,
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Document => NodeKind::Document,
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment => NodeKind::Comment,
        }
    }

    pub fn downcast_element(&self) -> Option<&ElementData> {
        match self {
            Self::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn downcast_element_mut(&mut self) -> Option<&mut ElementData> {
        match self {
            Self::Element(data) => Some(data),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextNodeData {
    /// The textual content of the text node
    pub content: String,
}

impl TextNodeData {
    pub fn new(content: String) -> Self {
        Self { content }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    /// Our Id
    pub id: usize,
    /// Our parent's ID
    pub parent: Option<usize>,
    /// What are our children?
    pub children: Vec<usize>,

    pub flags: NodeFlags,

    /// Node type (Element, TextNode, etc) specific data
    pub data: NodeData,

    /// Direction-correction outcome. `None` while unprocessed.
    pub mark: Option<ProcessingMark>,
}

impl Node {
    pub(crate) fn new(id: usize, data: NodeData) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            flags: NodeFlags::empty(),
            data,
            mark: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn is_text_node(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    pub fn element_data(&self) -> Option<&ElementData> {
        self.data.downcast_element()
    }

    pub fn element_data_mut(&mut self) -> Option<&mut ElementData> {
        self.data.downcast_element_mut()
    }

    pub fn text_data(&self) -> Option<&TextNodeData> {
        match &self.data {
            NodeData::Text(data) => Some(data),
            _ => None,
        }
    }

    pub fn text_data_mut(&mut self) -> Option<&mut TextNodeData> {
        match &mut self.data {
            NodeData::Text(data) => Some(data),
            _ => None,
        }
    }

    pub fn local_name(&self) -> Option<&str> {
        self.element_data().map(ElementData::local_name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element_data()?.attr(name)
    }

    pub fn is_in_document(&self) -> bool {
        self.flags.is_in_document()
    }

    /// Whether the node carries any processing mark or the `CHECKED` flag.
    pub fn is_processed(&self) -> bool {
        self.mark.is_some() || self.flags.is_checked()
    }

    /// Clear the mark and `CHECKED` flag so the node is evaluated again. A `Styled` mark is kept:
    /// the override it records is still applied.
    pub fn invalidate(&mut self) {
        self.flags.remove(NodeFlags::CHECKED);
        if !self.mark.as_ref().is_some_and(ProcessingMark::is_styled) {
            self.mark = None;
        }
    }

    pub fn node_debug_str(&self) -> String {
        let mut s = String::new();

        match &self.data {
            NodeData::Document => s.push_str("DOCUMENT"),
            NodeData::Text(data) => {
                s.push_str(&format!("TEXT {:?}", data.content.trim()));
            }
            NodeData::Comment => s.push_str("COMMENT"),
            NodeData::Element(data) => {
                s.push('<');
                s.push_str(&data.name.local);
                if let Some(id) = &data.id {
                    s.push_str(&format!(" #{id}"));
                }
                let classes: Vec<&str> = data.classes().collect();
                if !classes.is_empty() {
                    s.push_str(&format!(" .{}", classes.join(".")));
                }
                s.push('>');
            }
        }

        if let Some(mark) = &self.mark {
            s.push_str(&format!(" [{}]", mark.as_str()));
        }
        if self.flags.is_checked() {
            s.push_str(" [checked]");
        }

        s
    }
}
