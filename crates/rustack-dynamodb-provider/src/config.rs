//! Table provider configuration.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// DynamoDB adapter configuration.
///
/// # Examples
///
/// ```
/// use rustack_dynamodb_provider::config::DynamoDBProviderConfig;
///
/// let config = DynamoDBProviderConfig::builder()
///     .endpoint_url("http://localhost:4566")
///     .build();
/// assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:4566"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct DynamoDBProviderConfig {
    /// Endpoint override used when the provider config names none.
    #[builder(default, setter(strip_option, into))]
    pub endpoint_url: Option<String>,
}

impl DynamoDBProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `AWS_ENDPOINT_URL_DYNAMODB` | unset |
    /// | `AWS_ENDPOINT_URL` | unset |
    ///
    /// The service-specific variable wins.
    #[must_use]
    pub fn from_env() -> Self {
        let endpoint_url = ["AWS_ENDPOINT_URL_DYNAMODB", "AWS_ENDPOINT_URL"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|v| !v.trim().is_empty());
        Self { endpoint_url }
    }
}
