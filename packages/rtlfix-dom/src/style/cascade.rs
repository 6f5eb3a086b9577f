use super::{ComputedStyle, Origin, Specificity, StyleError};
use crate::BaseDocument;
use crate::node::ElementData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    UserAgent,
    PresentationalHint,
    Author,
    Inline,
}

/// Cascade order: importance, then level, then specificity, then source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Precedence {
    important: bool,
    level: Level,
    specificity: Specificity,
    order: usize,
}

impl BaseDocument {
    /// Resolve the computed style of an element.
    ///
    /// Fails if the node is missing, is not an element, is not connected to the document, or
    /// if its ancestor chain is broken.
    pub fn computed_style(&self, node_id: usize) -> Result<ComputedStyle, StyleError> {
        let node = self.nodes.get(node_id).ok_or(StyleError::NodeNotFound(node_id))?;
        if !node.is_element() {
            return Err(StyleError::NotAnElement(node_id));
        }
        if !node.is_in_document() {
            return Err(StyleError::Detached(node_id));
        }

        // Collect the element ancestors, innermost first
        let mut chain = vec![node_id];
        let mut top = node_id;
        let mut current = node.parent;
        while let Some(parent_id) = current {
            let parent = self.nodes.get(parent_id).ok_or(StyleError::BrokenAncestry {
                node: node_id,
                missing: parent_id,
            })?;
            if parent.is_element() {
                chain.push(parent_id);
            }
            if chain.len() > self.nodes.len() {
                return Err(StyleError::BrokenAncestry {
                    node: node_id,
                    missing: parent_id,
                });
            }
            top = parent_id;
            current = parent.parent;
        }
        if top != 0 {
            return Err(StyleError::Detached(node_id));
        }

        let mut style = ComputedStyle::default();
        for &id in chain.iter().rev() {
            let Some(element) = self.nodes[id].element_data() else {
                continue;
            };
            style = self.cascade_element(id, element, &style);
        }
        Ok(style)
    }

    fn cascade_element(
        &self,
        node_id: usize,
        element: &ElementData,
        parent: &ComputedStyle,
    ) -> ComputedStyle {
        let mut declared: Vec<(Precedence, &str, &str)> = Vec::new();
        let mut order = 0;

        let sheets = self
            .ua_stylesheets
            .iter()
            .chain(self.author_stylesheets.values());
        for sheet in sheets {
            let level = match sheet.origin {
                Origin::UserAgent => Level::UserAgent,
                Origin::Author => Level::Author,
            };
            for rule in &sheet.rules {
                let Some(specificity) = rule
                    .selectors
                    .iter()
                    .filter(|selector| selector.matches(element))
                    .map(|selector| selector.specificity())
                    .max()
                else {
                    continue;
                };
                for decl in rule.declarations.iter() {
                    order += 1;
                    let precedence = Precedence {
                        important: decl.important,
                        level,
                        specificity,
                        order,
                    };
                    declared.push((precedence, decl.property.as_str(), decl.value.as_str()));
                }
            }
        }

        let hint = |order: usize| Precedence {
            important: false,
            level: Level::PresentationalHint,
            specificity: Specificity::default(),
            order,
        };
        if element.has_attr("hidden") {
            order += 1;
            declared.push((hint(order), "display", "none"));
        }
        if let Some(dir) = self.dir_attribute_direction(node_id, element) {
            order += 1;
            declared.push((hint(order), "direction", dir));
        }

        for decl in element.style_attribute.iter() {
            order += 1;
            let precedence = Precedence {
                important: decl.important,
                level: Level::Inline,
                specificity: Specificity::default(),
                order,
            };
            declared.push((precedence, decl.property.as_str(), decl.value.as_str()));
        }

        declared.sort_by_key(|(precedence, _, _)| *precedence);

        let mut style = ComputedStyle::inherit_from(parent);
        for (_, property, value) in declared {
            style.apply(property, value, parent);
        }
        style
    }

    /// The direction implied by the `dir` attribute. `auto` picks the direction of the first
    /// strong character in the element's text.
    fn dir_attribute_direction(&self, node_id: usize, element: &ElementData) -> Option<&'static str> {
        let dir = element.attr("dir")?.trim().to_ascii_lowercase();
        match dir.as_str() {
            "rtl" => Some("rtl"),
            "ltr" => Some("ltr"),
            "auto" => {
                let text = self.text_content(node_id);
                match unicode_bidi::get_base_direction(text.as_str()) {
                    unicode_bidi::Direction::Rtl => Some("rtl"),
                    _ => Some("ltr"),
                }
            }
            _ => None,
        }
    }
}
