use super::strip_comments;

/// A single `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: &str, value: &str) -> Self {
        Self {
            property: property.trim().to_ascii_lowercase(),
            value: value.trim().to_string(),
            important: false,
        }
    }
}

/// An ordered declaration block, as found in a `style` attribute or a rule body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations(Vec<Declaration>);

impl Declarations {
    /// Parse a declaration block. Malformed declarations are skipped.
    pub fn parse(css: &str) -> Self {
        let css = strip_comments(css);
        let mut declarations: Vec<Declaration> = Vec::new();

        for chunk in split_top_level(&css, ';') {
            let Some((property, value)) = chunk.split_once(':') else {
                continue;
            };
            let property = property.trim().to_ascii_lowercase();
            let (value, important) = split_important(value.trim());
            if property.is_empty() || value.is_empty() {
                continue;
            }

            // Later declarations of the same property win
            declarations.retain(|d| d.property != property);
            declarations.push(Declaration {
                property,
                value: value.to_string(),
                important,
            });
        }

        Self(declarations)
    }

    pub fn get(&self, property: &str) -> Option<&Declaration> {
        self.0.iter().find(|d| d.property == property)
    }

    pub fn value(&self, property: &str) -> Option<&str> {
        self.get(property).map(|d| d.value.as_str())
    }

    /// Set a property, returning the declaration it replaced.
    pub fn set(&mut self, declaration: Declaration) -> Option<Declaration> {
        match self.0.iter_mut().find(|d| d.property == declaration.property) {
            Some(existing) => Some(std::mem::replace(existing, declaration)),
            None => {
                self.0.push(declaration);
                None
            }
        }
    }

    pub fn remove(&mut self, property: &str) -> Option<Declaration> {
        let idx = self.0.iter().position(|d| d.property == property)?;
        Some(self.0.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_css_string(&self) -> String {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|d| {
                if d.important {
                    format!("{}: {} !important;", d.property, d.value)
                } else {
                    format!("{}: {};", d.property, d.value)
                }
            })
            .collect();
        parts.join(" ")
    }
}

fn split_important(value: &str) -> (&str, bool) {
    if let Some(bang) = value.rfind('!') {
        if value[bang + 1..].trim().eq_ignore_ascii_case("important") {
            return (value[..bang].trim_end(), true);
        }
    }
    (value, false)
}

/// Split on `separator` outside of quotes and parentheses.
pub(crate) fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (idx, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, c) if c == separator && depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}
