//! The settings contract between the content context and the configuration collaborator.
//!
//! The collaborator owns persistence of the enabled flag and the per-site exclusion list. The
//! engine only ever sees these shapes: a full snapshot in response to a query, and partial
//! `updateState` pushes afterwards.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// Response to a settings query: `{ "isEnabled": bool, "excludedSites": [string] }`.
///
/// Both fields are required. A response missing either one, or carrying the wrong type, fails
/// to deserialize and must be treated like a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub is_enabled: bool,
    pub excluded_sites: Vec<String>,
}

impl SettingsResponse {
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Payload of an `updateState` push. Only the fields present are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_sites: Option<Vec<String>>,
}

impl StateUpdate {
    pub fn is_empty(&self) -> bool {
        self.is_enabled.is_none() && self.excluded_sites.is_none()
    }
}

/// Messages pushed into the content context, encoded as `{ "action": ..., "payload": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
pub enum ContentMessage {
    UpdateState(StateUpdate),
}

impl ContentMessage {
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        ContentMessage::deserialize(value)
    }
}

/// Reply sent back for every pushed message: `{ "success": bool }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub success: bool,
}

impl Acknowledgement {
    pub const fn accepted() -> Self {
        Self { success: true }
    }

    pub const fn rejected() -> Self {
        Self { success: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("settings collaborator is not reachable")]
    Disconnected,

    #[error("settings request timed out")]
    Timeout,

    #[error("settings request failed: {0}")]
    Other(String),
}

/// Transport to the configuration collaborator.
///
/// Implementations perform a single request. Retrying is the caller's responsibility.
pub trait SettingsProvider {
    fn request_settings(&self)
    -> impl Future<Output = Result<serde_json::Value, ProviderError>>;
}

/// A provider with no collaborator behind it. Every request fails with
/// [`ProviderError::Disconnected`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DummySettingsProvider;

impl SettingsProvider for DummySettingsProvider {
    fn request_settings(
        &self,
    ) -> impl Future<Output = Result<serde_json::Value, ProviderError>> {
        std::future::ready(Err(ProviderError::Disconnected))
    }
}
