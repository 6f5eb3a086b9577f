//! Right-to-left script detection.
//!
//! This is a lexical check over code point ranges, not language identification: a string is
//! right-to-left if it contains a single character from the Arabic blocks, whatever the rest
//! of it is.

use std::ops::RangeInclusive;

/// Arabic, Arabic Supplement, Arabic Extended-A and Arabic Presentation Forms A and B.
/// Persian, Urdu and the other Arabic-script languages live in these blocks.
const RTL_RANGES: [RangeInclusive<u32>; 5] = [
    0x0600..=0x06FF,
    0x0750..=0x077F,
    0x08A0..=0x08FF,
    0xFB50..=0xFDFF,
    0xFE70..=0xFEFF,
];

#[inline]
pub fn is_rtl_char(c: char) -> bool {
    let cp = c as u32;
    RTL_RANGES.iter().any(|range| range.contains(&cp))
}

/// Whether `text` contains any right-to-left script character. Stops at the first one found.
pub fn contains_rtl(text: &str) -> bool {
    text.chars().any(is_rtl_char)
}
