use super::{CompoundSelector, Declarations, parse_selector_list, strip_comments};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Origin {
    UserAgent,
    Author,
}

#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selectors: Vec<CompoundSelector>,
    pub declarations: Declarations,
}

#[derive(Debug, Clone)]
pub struct Stylesheet {
    pub origin: Origin,
    pub rules: Vec<StyleRule>,
}

impl Stylesheet {
    /// Parse a stylesheet. At-rules are skipped entirely, as are rules whose selector list
    /// contains anything [`CompoundSelector`] cannot represent.
    pub fn parse(css: &str, origin: Origin) -> Self {
        let css = strip_comments(css);
        let mut rules = Vec::new();
        let mut rest = css.as_str();

        while let Some(open) = rest.find('{') {
            let prelude = rest[..open].trim();
            let Some(close) = matching_brace(rest, open) else {
                break;
            };
            let body = &rest[open + 1..close];
            rest = &rest[close + 1..];

            // `@charset "x";` style statements can precede a block
            let prelude = prelude.rsplit(';').next().unwrap_or(prelude).trim();
            if prelude.starts_with('@') {
                #[cfg(feature = "tracing")]
                tracing::trace!("skipping at-rule {prelude}");
                continue;
            }

            match parse_selector_list(prelude) {
                Some(selectors) => rules.push(StyleRule {
                    selectors,
                    declarations: Declarations::parse(body),
                }),
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!("dropping rule with unsupported selector {prelude:?}");
                }
            }
        }

        Self { origin, rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn matching_brace(input: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in input[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}
