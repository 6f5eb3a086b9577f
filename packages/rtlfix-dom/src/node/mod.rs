#![allow(clippy::module_inception)]

mod attributes;
pub mod element;
mod mark;
mod node;

pub use attributes::{Attribute, Attributes};
pub use element::ElementData;
pub use mark::{PriorInline, ProcessingMark};
pub use node::*;
