use crate::node::ElementData;

/// `(ids, classes, types)` as defined by CSS selectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity(pub u32, pub u32, pub u32);

/// A compound selector made of an optional type (or `*`), an optional `#id` and any number of
/// `.class` parts. Combinators, attribute selectors and pseudo-classes are not supported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    pub local_name: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl CompoundSelector {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let mut selector = CompoundSelector::default();
        let mut chars = input.char_indices().peekable();

        if input.starts_with('*') {
            chars.next();
        } else if input.starts_with(is_ident_char) {
            let end = ident_end(input, 0);
            selector.local_name = Some(input[..end].to_ascii_lowercase());
            while chars.peek().is_some_and(|&(idx, _)| idx < end) {
                chars.next();
            }
        }

        while let Some((idx, ch)) = chars.next() {
            let start = idx + ch.len_utf8();
            let end = ident_end(input, start);
            if end == start {
                return None;
            }
            let ident = input[start..end].to_string();
            match ch {
                '#' if selector.id.is_none() => selector.id = Some(ident),
                '.' => selector.classes.push(ident),
                _ => return None,
            }
            while chars.peek().is_some_and(|&(i, _)| i < end) {
                chars.next();
            }
        }

        Some(selector)
    }

    pub fn specificity(&self) -> Specificity {
        Specificity(
            self.id.is_some() as u32,
            self.classes.len() as u32,
            self.local_name.is_some() as u32,
        )
    }

    pub fn matches(&self, element: &ElementData) -> bool {
        if let Some(name) = &self.local_name {
            if !element.local_name().eq_ignore_ascii_case(name) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|class| element.has_class(class))
    }
}

/// Parse a comma separated selector list. Returns `None` if any selector in the list is
/// unsupported, in which case the whole rule must be dropped.
pub fn parse_selector_list(input: &str) -> Option<Vec<CompoundSelector>> {
    input.split(',').map(CompoundSelector::parse).collect()
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}

fn ident_end(input: &str, start: usize) -> usize {
    input[start..]
        .char_indices()
        .find(|&(_, ch)| !is_ident_char(ch))
        .map_or(input.len(), |(idx, _)| start + idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Attribute;
    use markup5ever::{LocalName, Namespace, QualName};

    fn element(name: &str, attrs: Vec<Attribute>) -> ElementData {
        ElementData::new(
            QualName::new(None, Namespace::from(crate::HTML_NAMESPACE), LocalName::from(name)),
            attrs,
        )
    }

    #[test]
    fn parses_compound_selectors() {
        let sel = CompoundSelector::parse("p#intro.lead.note").unwrap();
        assert_eq!(sel.local_name.as_deref(), Some("p"));
        assert_eq!(sel.id.as_deref(), Some("intro"));
        assert_eq!(sel.classes, vec!["lead".to_string(), "note".to_string()]);
        assert_eq!(sel.specificity(), Specificity(1, 2, 1));
    }

    #[test]
    fn universal_and_class_only() {
        assert_eq!(CompoundSelector::parse("*").unwrap().specificity(), Specificity(0, 0, 0));
        let sel = CompoundSelector::parse(".rtl").unwrap();
        assert!(sel.local_name.is_none());
        assert_eq!(sel.classes, vec!["rtl".to_string()]);
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert!(CompoundSelector::parse("div p").is_none());
        assert!(CompoundSelector::parse("div > p").is_none());
        assert!(CompoundSelector::parse("a:hover").is_none());
        assert!(CompoundSelector::parse("[dir=rtl]").is_none());
        assert!(parse_selector_list("p, div span").is_none());
    }

    #[test]
    fn matches_elements() {
        let el = element("P", vec![Attribute::new("id", "x"), Attribute::new("class", "a b")]);
        assert!(CompoundSelector::parse("p").unwrap().matches(&el));
        assert!(CompoundSelector::parse("#x.b").unwrap().matches(&el));
        assert!(!CompoundSelector::parse("p.c").unwrap().matches(&el));
        assert!(!CompoundSelector::parse("div").unwrap().matches(&el));
    }
}
