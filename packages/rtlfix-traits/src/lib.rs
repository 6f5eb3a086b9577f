//! Types and traits shared between the rtlfix engine and its embedders.
//!
//! - [`settings`]: the message contract spoken with the configuration collaborator, and the
//!   [`SettingsProvider`](settings::SettingsProvider) seam used to query it.
//! - [`site`]: how a page's site identity (its hostname) is derived.

pub mod settings;
pub mod site;
