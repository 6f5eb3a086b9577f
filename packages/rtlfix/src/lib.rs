//! Incremental text direction correction.
//!
//! Finds elements whose text is written in a right-to-left script (Persian, Arabic, ...) but
//! which render left-to-right, and overrides their `direction` and `text-align`. Pages are
//! corrected once when correction activates, again after a fallback delay, and then
//! incrementally as their content changes.
//!
//! The engine works on a headless [`BaseDocument`](rtlfix_dom::BaseDocument) and is driven
//! through [`DirectionFixer`]:
//!
//! ```rust
//! use std::time::Instant;
//!
//! use rtlfix::{DirectionFixer, DocumentConfig, FixerConfig, HtmlDocument, SettingsSnapshot};
//!
//! let mut doc = HtmlDocument::from_html(
//!     "<p>سلام world</p>",
//!     DocumentConfig::with_base_url("https://example.com/"),
//! );
//! let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
//! let now = Instant::now();
//! fixer.initialize(&mut doc, Ok(SettingsSnapshot::new(true, ["other.org"])), now);
//!
//! let p = doc.get_elements_by_tag_name("p")[0];
//! assert_eq!(doc.get_node(p).unwrap().attr("style"), Some("direction: rtl; text-align: right;"));
//! ```

// ## Feature flags
//  - `default`: Enables the features listed below.
//  - `tracing`: Enables tracing support.

pub mod activation;
pub mod classifier;
mod config;
pub mod corrector;
pub mod debounce;
mod error;
pub mod filter;
mod fixer;
pub mod reactor;
pub mod scan;
pub mod settings;
pub mod walker;

pub use activation::{ActivationPolicy, ActivationState, Transition};
pub use classifier::contains_rtl;
pub use config::{FixerConfig, RetryPolicy};
pub use corrector::{apply_fix, revert_fix};
pub use error::{FixError, SettingsError};
pub use filter::{Rejection, Verdict, is_candidate};
pub use fixer::DirectionFixer;
pub use reactor::{MutationReactor, PollReport, ReactorState};
pub use scan::scan;
pub use settings::{SettingsSnapshot, fetch_settings};
pub use walker::{WalkStats, check_and_fix};

pub use rtlfix_dom::{BaseDocument, DocumentConfig};
pub use rtlfix_html::HtmlDocument;
pub use rtlfix_traits::settings::{Acknowledgement, SettingsProvider};
pub use rtlfix_traits::site::SiteId;
