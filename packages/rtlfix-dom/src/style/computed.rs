#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Display {
    #[default]
    Inline,
    Block,
    InlineBlock,
    ListItem,
    Flex,
    Grid,
    Table,
    TableRow,
    TableCell,
    Contents,
    /// A valid keyword with no bearing on direction correction
    Other,
    None,
}

impl Display {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Some(match value.as_str() {
            "none" => Display::None,
            "inline" => Display::Inline,
            "block" | "flow-root" => Display::Block,
            "inline-block" => Display::InlineBlock,
            "list-item" => Display::ListItem,
            "flex" | "inline-flex" => Display::Flex,
            "grid" | "inline-grid" => Display::Grid,
            "table" | "inline-table" => Display::Table,
            "table-row" => Display::TableRow,
            "table-cell" => Display::TableCell,
            "contents" => Display::Contents,
            "table-header-group" | "table-row-group" | "table-footer-group" | "table-caption"
            | "table-column" | "table-column-group" | "ruby" | "run-in" => Display::Other,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

impl Visibility {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "visible" => Some(Visibility::Visible),
            "hidden" => Some(Visibility::Hidden),
            "collapse" => Some(Visibility::Collapse),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ltr" => Some(Direction::Ltr),
            "rtl" => Some(Direction::Rtl),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Start,
    End,
    Left,
    Right,
    Center,
    Justify,
}

impl TextAlign {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "start" => Some(TextAlign::Start),
            "end" => Some(TextAlign::End),
            "left" => Some(TextAlign::Left),
            "right" => Some(TextAlign::Right),
            "center" => Some(TextAlign::Center),
            "justify" => Some(TextAlign::Justify),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Start => "start",
            TextAlign::End => "end",
            TextAlign::Left => "left",
            TextAlign::Right => "right",
            TextAlign::Center => "center",
            TextAlign::Justify => "justify",
        }
    }
}

/// The resolved values of the properties this crate computes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
    pub direction: Direction,
    pub text_align: TextAlign,
}

impl ComputedStyle {
    /// Initial values for an element whose parent has `parent` as its computed style.
    /// `direction`, `text-align` and `visibility` inherit; `display` does not.
    pub fn inherit_from(parent: &ComputedStyle) -> Self {
        Self {
            display: Display::default(),
            visibility: parent.visibility,
            direction: parent.direction,
            text_align: parent.text_align,
        }
    }

    /// Apply a declaration. Unknown properties and invalid values are ignored, as CSS does.
    /// `inherit` keeps the inherited value; `initial` resets to the initial value.
    pub(crate) fn apply(&mut self, property: &str, value: &str, parent: &ComputedStyle) {
        let keyword = value.trim().to_ascii_lowercase();
        let initial = ComputedStyle::default();
        match property {
            "display" => match keyword.as_str() {
                "inherit" => self.display = parent.display,
                "initial" | "unset" => self.display = initial.display,
                _ => {
                    if let Some(display) = Display::parse(&keyword) {
                        self.display = display;
                    }
                }
            },
            "visibility" => match keyword.as_str() {
                "inherit" | "unset" => self.visibility = parent.visibility,
                "initial" => self.visibility = initial.visibility,
                _ => {
                    if let Some(visibility) = Visibility::parse(&keyword) {
                        self.visibility = visibility;
                    }
                }
            },
            "direction" => match keyword.as_str() {
                "inherit" | "unset" => self.direction = parent.direction,
                "initial" => self.direction = initial.direction,
                _ => {
                    if let Some(direction) = Direction::parse(&keyword) {
                        self.direction = direction;
                    }
                }
            },
            "text-align" => match keyword.as_str() {
                "inherit" | "unset" => self.text_align = parent.text_align,
                "initial" => self.text_align = initial.text_align,
                _ => {
                    if let Some(text_align) = TextAlign::parse(&keyword) {
                        self.text_align = text_align;
                    }
                }
            },
            _ => {}
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.display != Display::None && self.visibility == Visibility::Visible
    }
}
