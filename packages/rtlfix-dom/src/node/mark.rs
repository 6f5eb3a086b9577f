use crate::style::Declaration;

/// The outcome of evaluating an element for direction correction.
///
/// At most one mark is held at a time. An element without a mark is unprocessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingMark {
    /// The element's text contains no right-to-left script.
    NoRtlDetected,
    /// The element already renders right-to-left.
    AlreadyRtl,
    /// Computed style could not be read.
    StyleError,
    /// The element is `display: none` or not visible.
    Hidden,
    /// Direction and alignment were overridden. Holds the inline declarations that were replaced.
    Styled(PriorInline),
}

impl ProcessingMark {
    pub fn is_styled(&self) -> bool {
        matches!(self, ProcessingMark::Styled(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMark::NoRtlDetected => "no-rtl-detected",
            ProcessingMark::AlreadyRtl => "already-rtl",
            ProcessingMark::StyleError => "style-error",
            ProcessingMark::Hidden => "hidden",
            ProcessingMark::Styled(_) => "styled",
        }
    }
}

/// Inline `direction` and `text-align` declarations as they were before an override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorInline {
    pub direction: Option<Declaration>,
    pub text_align: Option<Declaration>,
}
