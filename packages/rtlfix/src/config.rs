use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::FixError;

/// Tunables of the correction loop. Every field is optional when deserializing; missing
/// fields take their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixerConfig {
    /// Quiet period after the last mutation before a batch is processed
    pub debounce_ms: u64,
    /// Longest a continuous stream of mutations may postpone a batch
    pub max_batch_delay_ms: u64,
    /// Delay of the second, fallback scan after activation. `None` or `0` disables it.
    pub fallback_scan_delay_ms: Option<u64>,
    /// Interval between attempts to attach the observer while `<body>` is missing
    pub body_retry_interval_ms: u64,
    /// How many times to retry attaching the observer before giving up
    pub body_retry_limit: u32,
    /// Revert applied styling when correction is switched off globally
    pub revert_on_disable: bool,
    /// Revert applied styling when the current site is added to the exclusion list
    pub revert_on_exclude: bool,
    /// Backoff for the initial settings request
    pub retry: RetryPolicy,
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            max_batch_delay_ms: 2000,
            fallback_scan_delay_ms: Some(3000),
            body_retry_interval_ms: 100,
            body_retry_limit: 20,
            revert_on_disable: true,
            revert_on_exclude: true,
            retry: RetryPolicy::default(),
        }
    }
}

impl FixerConfig {
    pub fn from_json(json: &str) -> Result<Self, FixError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn max_batch_delay(&self) -> Duration {
        Duration::from_millis(self.max_batch_delay_ms.max(self.debounce_ms))
    }

    pub fn fallback_scan_delay(&self) -> Option<Duration> {
        self.fallback_scan_delay_ms
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }

    pub fn body_retry_interval(&self) -> Duration {
        Duration::from_millis(self.body_retry_interval_ms)
    }
}

/// Bounded exponential backoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub multiplier: u32,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 100,
            multiplier: 2,
            max_delay_ms: 2000,
        }
    }
}

impl RetryPolicy {
    /// The delay to wait after failed attempt number `attempt` (zero-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = u64::from(self.multiplier.max(1)).saturating_pow(attempt);
        let ms = self.initial_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        Duration::from_millis(ms)
    }

    /// Attempts to make in total. Always at least one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}
