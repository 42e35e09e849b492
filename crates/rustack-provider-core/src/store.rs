//! In-memory control plane.
//!
//! [`ControlPlane`] keeps managed resources, provider configs, secrets and
//! published connection details in `DashMap`s keyed by `(kind, name)`. It
//! backs the binary's manifest directory and the test suites, and implements
//! every collaborator trait the reconcile driver consumes.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::external::{ConnectionDetails, ResourceWriter};
use crate::provider_config::{CredentialStore, ProviderConfig};
use crate::reference::{ReferenceSource, ReferencedObject};
use crate::resource::Managed;

type Key = (String, String);

fn key(kind: &str, name: &str) -> Key {
    (kind.to_owned(), name.to_owned())
}

/// Thread-safe in-memory control plane.
#[derive(Debug, Default)]
pub struct ControlPlane {
    resources: DashMap<Key, serde_json::Value>,
    objects: DashMap<Key, ReferencedObject>,
    connection_details: DashMap<Key, ConnectionDetails>,
    provider_configs: DashMap<String, ProviderConfig>,
    secrets: DashMap<Key, String>,
    writes: AtomicU64,
    reject_writes: AtomicBool,
}

impl ControlPlane {
    /// Create an empty control plane.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a managed resource and index it as a reference target.
    pub fn apply<R: Managed>(&self, resource: &R) -> ProviderResult<()> {
        let value = serde_json::to_value(resource)
            .map_err(|e| ProviderError::ControlPlane(e.to_string()))?;
        let k = key(resource.kind(), &resource.meta().name);
        self.objects.insert(k.clone(), resource.to_referenced());
        self.resources.insert(k, value);
        Ok(())
    }

    /// Register a reference target that is not a managed resource here,
    /// e.g. an IAM role or KMS key managed elsewhere.
    pub fn register(&self, object: ReferencedObject) {
        self.objects
            .insert(key(&object.kind, &object.name), object);
    }

    /// Store a provider config.
    pub fn add_provider_config(&self, config: ProviderConfig) {
        self.provider_configs.insert(config.name.clone(), config);
    }

    /// Store one key of a secret.
    pub fn add_secret(&self, name: &str, key_name: &str, value: impl Into<String>) {
        self.secrets.insert(key(name, key_name), value.into());
    }

    /// Read a stored resource back as `T`.
    #[must_use]
    pub fn get_resource<T: DeserializeOwned>(&self, kind: &str, name: &str) -> Option<T> {
        self.resources
            .get(&key(kind, name))
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Remove a resource once its external counterpart is gone.
    pub fn remove(&self, kind: &str, name: &str) {
        let k = key(kind, name);
        self.resources.remove(&k);
        self.objects.remove(&k);
        self.connection_details.remove(&k);
    }

    /// Names of stored resources of a kind, sorted.
    #[must_use]
    pub fn names(&self, kind: &str) -> Vec<String> {
        let mut names: Vec<_> = self
            .resources
            .iter()
            .filter(|e| e.key().0 == kind)
            .map(|e| e.key().1.clone())
            .collect();
        names.sort();
        names
    }

    /// Connection details last published for a resource.
    #[must_use]
    pub fn connection_details(&self, kind: &str, name: &str) -> Option<ConnectionDetails> {
        self.connection_details
            .get(&key(kind, name))
            .map(|v| v.clone())
    }

    /// Number of successful resource writes.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Make subsequent writes fail, to exercise write-back error paths.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::Relaxed);
    }
}

#[async_trait]
impl<R: Managed> ResourceWriter<R> for ControlPlane {
    async fn write(&self, resource: &R) -> ProviderResult<()> {
        if self.reject_writes.load(Ordering::Relaxed) {
            return Err(ProviderError::ControlPlane("writes are rejected".to_owned()));
        }
        self.apply(resource)?;
        self.writes.fetch_add(1, Ordering::Relaxed);
        debug!(kind = resource.kind(), name = %resource.meta().name, "resource written");
        Ok(())
    }

    async fn publish_connection_details(
        &self,
        resource: &R,
        details: &ConnectionDetails,
    ) -> ProviderResult<()> {
        self.connection_details
            .insert(key(resource.kind(), &resource.meta().name), details.clone());
        Ok(())
    }
}

#[async_trait]
impl ReferenceSource for ControlPlane {
    async fn get(&self, kind: &str, name: &str) -> ProviderResult<Option<ReferencedObject>> {
        Ok(self.objects.get(&key(kind, name)).map(|v| v.clone()))
    }

    async fn list(&self, kind: &str) -> ProviderResult<Vec<ReferencedObject>> {
        Ok(self
            .objects
            .iter()
            .filter(|e| e.key().0 == kind)
            .map(|e| e.value().clone())
            .collect())
    }
}

#[async_trait]
impl CredentialStore for ControlPlane {
    async fn provider_config(&self, name: &str) -> ProviderResult<Option<ProviderConfig>> {
        Ok(self.provider_configs.get(name).map(|v| v.clone()))
    }

    async fn secret(&self, name: &str, key_name: &str) -> ProviderResult<Option<String>> {
        Ok(self.secrets.get(&key(name, key_name)).map(|v| v.clone()))
    }
}
