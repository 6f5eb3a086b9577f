//! Style parsing and computed value resolution.
//!
//! Only the properties that decide whether and how text direction is corrected are resolved:
//! `display`, `visibility`, `direction` and `text-align`. Everything else in a stylesheet or
//! `style` attribute is parsed and kept, but never computed.

mod cascade;
mod computed;
mod declarations;
mod selector;
mod stylesheet;

pub use computed::{ComputedStyle, Direction, Display, TextAlign, Visibility};
pub use declarations::{Declaration, Declarations};
pub use selector::{CompoundSelector, Specificity, parse_selector_list};
pub use stylesheet::{Origin, StyleRule, Stylesheet};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    #[error("node {0} does not exist")]
    NodeNotFound(usize),

    #[error("node {0} is not an element")]
    NotAnElement(usize),

    #[error("node {0} is not connected to the document")]
    Detached(usize),

    #[error("ancestor {missing} of node {node} is missing")]
    BrokenAncestry { node: usize, missing: usize },
}

/// Remove `/* ... */` comments. An unterminated comment runs to the end of the input.
pub(crate) fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}
