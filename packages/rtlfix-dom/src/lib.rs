//! The DOM abstraction used by rtlfix
//!
//! This crate implements a headless DOM ([`BaseDocument`]) which is designed to be embedded in and "driven" by
//! external code. Most users will build one from markup with
//! [`HtmlDocument`](https://docs.rs/rtlfix-html/latest/rtlfix_html/struct.HtmlDocument.html) from the
//! [rtlfix-html](https://docs.rs/rtlfix-html) crate.
//!
//! It includes:
//!  - A slab-backed tree of nodes, mutated through a [`DocumentMutator`].
//!  - Mutation observation ([`BaseDocument::observe`]) delivering [`MutationRecord`]s for the subtree an observer
//!    is registered on.
//!  - A small cascade resolving the handful of computed properties that matter for text direction:
//!    `display`, `visibility`, `direction` and `text-align` ([`BaseDocument::computed_style`]).
//!  - Per-node processing marks ([`ProcessingMark`]) that direction correction attaches to elements.

// ## Feature flags
//  - `default`: Enables the features listed below.
//  - `tracing`: Enables tracing support.

pub const DEFAULT_CSS: &str = include_str!("../assets/default.css");

/// The DOM implementation.
///
/// This is the primary entry point for this crate.
mod document;

/// The nodes themselves, and their data.
pub mod node;

mod config;
mod debug;
mod mutator;
mod observer;
mod query_selector;
/// Style parsing and computed value resolution
pub mod style;
mod traversal;
mod url;

pub use config::DocumentConfig;
pub use document::BaseDocument;
pub use markup5ever::{LocalName, Namespace, Prefix, QualName};
pub use mutator::{DocumentMutator, MutationError};
pub use node::{Attribute, ElementData, Node, NodeData, NodeFlags, PriorInline, ProcessingMark, TextNodeData};
pub use observer::{MutationRecord, ObserverId, ObserverOptions};
pub use style::{ComputedStyle, Direction, Display, StyleError, TextAlign, Visibility};
pub use traversal::TreeTraverser;
pub use url::DocumentUrl;

pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";
