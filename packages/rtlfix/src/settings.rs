//! The engine's copy of the collaborator's settings, and retrieving it.

use std::collections::HashSet;

use rtlfix_traits::settings::{SettingsProvider, SettingsResponse, StateUpdate};
use rtlfix_traits::site::SiteId;

use crate::SettingsError;
use crate::config::RetryPolicy;

/// An immutable copy of the enabled flag and the exclusion list. Updates produce a new snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsSnapshot {
    pub enabled: bool,
    pub excluded_sites: HashSet<SiteId>,
}

impl SettingsSnapshot {
    pub fn new<'a>(enabled: bool, excluded_sites: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            enabled,
            excluded_sites: excluded_sites.into_iter().map(SiteId::from_hostname).collect(),
        }
    }

    pub fn is_excluded(&self, site: &SiteId) -> bool {
        self.excluded_sites.contains(site)
    }

    /// Apply a partial update. Returns `None` if no present field differs from this snapshot.
    pub fn apply(&self, update: &StateUpdate) -> Option<SettingsSnapshot> {
        let mut next = self.clone();
        if let Some(enabled) = update.is_enabled {
            next.enabled = enabled;
        }
        if let Some(sites) = &update.excluded_sites {
            next.excluded_sites = sites.iter().map(|site| SiteId::from_hostname(site)).collect();
        }
        (next != *self).then_some(next)
    }
}

impl From<SettingsResponse> for SettingsSnapshot {
    fn from(response: SettingsResponse) -> Self {
        Self::new(response.is_enabled, response.excluded_sites.iter().map(String::as_str))
    }
}

async fn request_once<P: SettingsProvider>(provider: &P) -> Result<SettingsSnapshot, SettingsError> {
    let value = provider.request_settings().await?;
    let response =
        SettingsResponse::from_value(value).map_err(|err| SettingsError::Malformed(err.to_string()))?;
    Ok(response.into())
}

/// Request the settings snapshot, retrying failed and malformed responses with exponential
/// backoff. Fails with [`SettingsError::Exhausted`] once `policy` runs out of attempts.
pub async fn fetch_settings<P: SettingsProvider>(
    provider: &P,
    policy: &RetryPolicy,
) -> Result<SettingsSnapshot, SettingsError> {
    let attempts = policy.attempts();
    let mut attempt = 0;
    loop {
        let err = match request_once(provider).await {
            Ok(snapshot) => return Ok(snapshot),
            Err(err) => err,
        };
        attempt += 1;

        if attempt >= attempts {
            #[cfg(feature = "tracing")]
            tracing::warn!("giving up on settings after {attempts} attempts: {err}");
            return Err(SettingsError::Exhausted {
                attempts,
                last: Box::new(err),
            });
        }

        let delay = policy.delay_after(attempt - 1);
        #[cfg(feature = "tracing")]
        tracing::debug!("settings attempt {attempt} failed ({err}); retrying in {delay:?}");
        tokio::time::sleep(delay).await;
    }
}
