//! Controller configuration.
//!
//! All configuration is driven by environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Settings for the controller loop that drives reconcile ticks.
///
/// # Examples
///
/// ```
/// use rustack_provider_core::ControllerConfig;
///
/// let config = ControllerConfig::builder().max_concurrent_reconciles(2).build();
/// assert_eq!(config.max_concurrent_reconciles, 2);
/// assert_eq!(config.poll_interval_secs, 60);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfig {
    /// Directory holding manifest files.
    #[builder(default = String::from("./manifests"))]
    pub manifest_dir: String,

    /// Seconds between polls of up-to-date resources.
    #[builder(default = 60)]
    pub poll_interval_secs: u64,

    /// Upper bound on ticks running at the same time.
    #[builder(default = 8)]
    pub max_concurrent_reconciles: usize,

    /// Seconds a single tick may take before it is cancelled.
    #[builder(default = 120)]
    pub reconcile_timeout_secs: u64,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Log output format, `text` or `json`.
    #[builder(default = String::from("text"))]
    pub log_format: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `MANIFEST_DIR` | `./manifests` |
    /// | `POLL_INTERVAL_SECS` | `60` |
    /// | `MAX_CONCURRENT_RECONCILES` | `8` |
    /// | `RECONCILE_TIMEOUT_SECS` | `120` |
    /// | `LOG_LEVEL` | `info` |
    /// | `LOG_FORMAT` | `text` |
    ///
    /// Unparsable numbers keep their default.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("MANIFEST_DIR") {
            config.manifest_dir = v;
        }
        if let Some(v) = parse_env("POLL_INTERVAL_SECS") {
            config.poll_interval_secs = v;
        }
        if let Some(v) = parse_env("MAX_CONCURRENT_RECONCILES") {
            config.max_concurrent_reconciles = v;
        }
        if let Some(v) = parse_env("RECONCILE_TIMEOUT_SECS") {
            config.reconcile_timeout_secs = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("LOG_FORMAT") {
            config.log_format = v;
        }

        config
    }

    /// Poll interval as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Tick timeout as a [`Duration`].
    #[must_use]
    pub fn reconcile_timeout(&self) -> Duration {
        Duration::from_secs(self.reconcile_timeout_secs)
    }

    /// Whether logs should be emitted as JSON.
    #[must_use]
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_default_config() {
        let config = ControllerConfig::default();
        assert_eq!(config.manifest_dir, "./manifests");
        assert_eq!(config.max_concurrent_reconciles, 8);
        assert_eq!(config.reconcile_timeout(), Duration::from_secs(120));
        assert!(!config.json_logs());
    }

    #[test]
    fn test_should_override_with_builder() {
        let config = ControllerConfig::builder()
            .poll_interval_secs(5)
            .log_format("JSON".to_owned())
            .build();
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert!(config.json_logs());
    }
}
