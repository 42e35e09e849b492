//! Bucket provider configuration.
//!
//! Settings that apply to every AWS S3 client the provider builds, loaded
//! from environment variables. Per-resource settings (region, credentials)
//! come from the bucket manifest and its provider config instead.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// S3 adapter configuration.
///
/// # Examples
///
/// ```
/// use rustack_s3_provider::config::S3ProviderConfig;
///
/// let config = S3ProviderConfig::default();
/// assert!(config.endpoint_url.is_none());
/// assert!(!config.force_path_style);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct S3ProviderConfig {
    /// Endpoint override used when the provider config names none, e.g. a
    /// local emulator at `http://localhost:4566`.
    #[builder(default, setter(strip_option, into))]
    pub endpoint_url: Option<String>,

    /// Whether to address buckets path-style instead of virtual-hosted.
    #[builder(default = false)]
    pub force_path_style: bool,
}

impl S3ProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `AWS_ENDPOINT_URL` | unset |
    /// | `S3_FORCE_PATH_STYLE` | `false` |
    ///
    /// An endpoint override implies path-style addressing unless
    /// `S3_FORCE_PATH_STYLE` says otherwise.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("AWS_ENDPOINT_URL") {
            if !v.trim().is_empty() {
                config.endpoint_url = Some(v);
                config.force_path_style = true;
            }
        }
        if let Ok(v) = std::env::var("S3_FORCE_PATH_STYLE") {
            config.force_path_style = parse_bool(&v);
        }

        config
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
