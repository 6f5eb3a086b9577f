use std::str::FromStr;

use markup5ever::QualName;

use super::{Attribute, Attributes};
use crate::style::Declarations;

#[derive(Debug, Clone)]
pub struct ElementData {
    /// The elements tag name, namespace and prefix
    pub name: QualName,

    /// The elements id attribute (if it has one)
    pub id: Option<String>,

    /// The element's attributes
    pub attrs: Attributes,

    /// The element's parsed style attribute. Kept in sync with the `style` attribute.
    pub style_attribute: Declarations,
}

impl ElementData {
    pub fn new(name: QualName, attrs: Vec<Attribute>) -> Self {
        let attrs = Attributes::new(attrs);
        let id = attrs.get("id").map(str::to_string);
        let style_attribute = attrs.get("style").map(Declarations::parse).unwrap_or_default();

        ElementData {
            name,
            id,
            attrs,
            style_attribute,
        }
    }

    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    pub fn namespace(&self) -> &str {
        &self.name.ns
    }

    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }

    pub fn attr_parsed<T: FromStr>(&self, name: &str) -> Option<T> {
        self.attr(name)?.parse::<T>().ok()
    }

    /// Detects the presence of the attribute, treating *any* value as truthy.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.get(name).is_some()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_ascii_whitespace()
    }

    /// The element's own `contenteditable` state: `Some(true)` for `""`, `"true"` and
    /// `"plaintext-only"`, `Some(false)` for `"false"`, `None` when it inherits.
    pub fn content_editable(&self) -> Option<bool> {
        let value = self.attr("contenteditable")?;
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "true" | "plaintext-only" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// Set an attribute, keeping derived state (`id`, parsed inline style) in sync.
    pub(crate) fn set_attr(&mut self, name: &str, value: &str) -> Option<String> {
        let old = self.attrs.set(name, value);
        self.flush_attr(name);
        old
    }

    pub(crate) fn remove_attr(&mut self, name: &str) -> Option<Attribute> {
        let old = self.attrs.remove(name);
        self.flush_attr(name);
        old
    }

    fn flush_attr(&mut self, name: &str) {
        match name {
            "id" => self.id = self.attrs.get("id").map(str::to_string),
            "style" => {
                self.style_attribute = self
                    .attrs
                    .get("style")
                    .map(Declarations::parse)
                    .unwrap_or_default()
            }
            _ => {}
        }
    }

    /// Re-serialize the parsed inline style into the `style` attribute.
    pub(crate) fn flush_style_attribute(&mut self) {
        if self.style_attribute.is_empty() {
            self.attrs.remove("style");
        } else {
            let css = self.style_attribute.to_css_string();
            self.attrs.set("style", &css);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markup5ever::{LocalName, Namespace};

    fn element(attrs: Vec<Attribute>) -> ElementData {
        ElementData::new(
            QualName::new(None, Namespace::from(crate::HTML_NAMESPACE), LocalName::from("p")),
            attrs,
        )
    }

    #[test]
    fn style_attribute_is_parsed_on_creation() {
        let el = element(vec![Attribute::new("style", "direction: rtl; color: red")]);
        assert_eq!(el.style_attribute.value("direction"), Some("rtl"));
    }

    #[test]
    fn setting_style_attribute_reparses() {
        let mut el = element(vec![]);
        el.set_attr("style", "text-align: right");
        assert_eq!(el.style_attribute.value("text-align"), Some("right"));
        el.remove_attr("style");
        assert!(el.style_attribute.is_empty());
    }

    #[test]
    fn content_editable_states() {
        assert_eq!(element(vec![Attribute::new("contenteditable", "")]).content_editable(), Some(true));
        assert_eq!(element(vec![Attribute::new("contenteditable", "false")]).content_editable(), Some(false));
        assert_eq!(element(vec![Attribute::new("contenteditable", "bogus")]).content_editable(), None);
        assert_eq!(element(vec![]).content_editable(), None);
    }

    #[test]
    fn classes_split_on_whitespace() {
        let el = element(vec![Attribute::new("class", " lead  note ")]);
        assert!(el.has_class("lead"));
        assert!(el.has_class("note"));
        assert!(!el.has_class("lea"));
    }
}
