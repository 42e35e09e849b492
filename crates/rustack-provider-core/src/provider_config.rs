//! Provider configuration objects and credential resolution.
//!
//! A managed resource names a [`ProviderConfig`] through
//! `spec.providerConfigRef`. The config says where credentials come from:
//! a secret holding a JSON document, the runtime's injected identity, or the
//! process environment.

use std::fmt::{self, Debug};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ProviderResult};

/// Name of the provider config used when a resource names none.
pub const DEFAULT_PROVIDER_CONFIG: &str = "default";

/// Where credentials come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialsSource {
    /// A secret holding `{accessKeyId, secretAccessKey, sessionToken?}`.
    #[default]
    Secret,
    /// The runtime's ambient identity (instance profile, IRSA, ...).
    InjectedIdentity,
    /// `AWS_ACCESS_KEY_ID` and friends in the process environment.
    Environment,
}

/// Points at one key of a secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKeySelector {
    /// Secret name.
    pub name: String,
    /// Key within the secret.
    pub key: String,
}

/// Credentials block of a provider config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentials {
    /// Credentials source.
    #[serde(default)]
    pub source: CredentialsSource,
    /// Secret to read when `source` is `Secret`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SecretKeySelector>,
}

/// A provider config object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Object name.
    pub name: String,
    /// Credentials settings.
    #[serde(default)]
    pub credentials: ProviderCredentials,
    /// Endpoint override, e.g. a LocalStack-compatible URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Static AWS credentials parsed from a secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsCredentials {
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token for temporary credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

impl AwsCredentials {
    /// Parse the JSON document stored in a credentials secret.
    pub fn from_secret(data: &str) -> ProviderResult<Self> {
        let creds: Self = serde_json::from_str(data)
            .map_err(|e| ProviderError::Connect(format!("cannot parse credentials secret: {e}")))?;
        if creds.access_key_id.is_empty() || creds.secret_access_key.is_empty() {
            return Err(ProviderError::Connect(
                "credentials secret is missing accessKeyId or secretAccessKey".to_owned(),
            ));
        }
        Ok(creds)
    }
}

/// Credentials to hand to a provider SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCredentials {
    /// Explicit static credentials.
    Static(AwsCredentials),
    /// Let the SDK's default chain find credentials.
    DefaultChain,
}

/// Everything a connector needs to build a provider client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectSettings {
    /// Region the client talks to.
    pub region: String,
    /// Credentials.
    pub credentials: ResolvedCredentials,
    /// Endpoint override.
    pub endpoint: Option<String>,
}

/// Read access to provider configs and secrets.
#[async_trait]
pub trait CredentialStore: Send + Sync + Debug {
    /// Look up a provider config by name.
    async fn provider_config(&self, name: &str) -> ProviderResult<Option<ProviderConfig>>;

    /// Read one key of a secret.
    async fn secret(&self, name: &str, key: &str) -> ProviderResult<Option<String>>;
}

/// Resolve the provider config a resource points at into connect settings.
///
/// `config_name` falls back to [`DEFAULT_PROVIDER_CONFIG`].
pub async fn resolve_connect_settings(
    store: &dyn CredentialStore,
    config_name: Option<&str>,
    region: &str,
) -> ProviderResult<ConnectSettings> {
    let name = config_name.unwrap_or(DEFAULT_PROVIDER_CONFIG);
    let config = store
        .provider_config(name)
        .await?
        .ok_or_else(|| ProviderError::Connect(format!("provider config {name} not found")))?;

    let credentials = match config.credentials.source {
        CredentialsSource::Secret => {
            let selector = config.credentials.secret_ref.as_ref().ok_or_else(|| {
                ProviderError::Connect(format!(
                    "provider config {name} uses a secret but sets no secretRef"
                ))
            })?;
            let data = store
                .secret(&selector.name, &selector.key)
                .await?
                .ok_or_else(|| {
                    ProviderError::Connect(format!(
                        "secret {}/{} not found",
                        selector.name, selector.key
                    ))
                })?;
            ResolvedCredentials::Static(AwsCredentials::from_secret(&data)?)
        }
        CredentialsSource::InjectedIdentity | CredentialsSource::Environment => {
            ResolvedCredentials::DefaultChain
        }
    };

    Ok(ConnectSettings {
        region: region.to_owned(),
        credentials,
        endpoint: config.endpoint,
    })
}
