//! The manifest directory.
//!
//! Every `*.json` file in the directory holds one document:
//!
//! ```text
//! { "kind": "Bucket", "object": { "metadata": { "name": "logs" }, "spec": { ... } } }
//! ```
//!
//! `ProviderConfig` and `ReferenceTarget` documents are loaded into the
//! control plane once. `Bucket` and `Table` documents are reconciled and
//! written back to the file they came from whenever a tick changes them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use rustack_dynamodb_model::Table;
use rustack_provider_core::{
    ConnectionDetails, ControlPlane, Managed, ProviderConfig, ProviderError, ProviderResult,
    ReferencedObject, ResourceWriter, SecretKeySelector,
};
use rustack_s3_model::Bucket;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Directory below the manifest directory holding secret files.
const SECRETS_DIR: &str = "secrets";

/// One manifest document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "object")]
pub enum Document {
    /// Credentials and endpoint settings.
    ProviderConfig(ProviderConfig),
    /// A managed bucket.
    Bucket(Box<Bucket>),
    /// A managed table.
    Table(Box<Table>),
    /// An object managed elsewhere that references point at, e.g. an IAM
    /// role or a KMS key.
    ReferenceTarget(ReferencedObject),
}

/// Managed objects found in the manifest directory.
#[derive(Debug, Default)]
pub struct Manifests {
    /// Buckets to reconcile.
    pub buckets: Vec<Bucket>,
    /// Tables to reconcile.
    pub tables: Vec<Table>,
}

/// Name of the environment variable that may hold a secret key, e.g.
/// `SECRET_AWS_CREDS_CREDENTIALS` for secret `aws-creds`, key `credentials`.
fn secret_env_var(selector: &SecretKeySelector) -> String {
    let normalize = |s: &str| {
        s.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect::<String>()
    };
    format!(
        "SECRET_{}_{}",
        normalize(&selector.name),
        normalize(&selector.key)
    )
}

/// Read a secret key from the environment, then from
/// `<dir>/secrets/<name>/<key>`.
async fn read_secret(dir: &Path, selector: &SecretKeySelector) -> Option<String> {
    if let Ok(value) = std::env::var(secret_env_var(selector)) {
        return Some(value);
    }
    let path = dir
        .join(SECRETS_DIR)
        .join(&selector.name)
        .join(&selector.key);
    tokio::fs::read_to_string(&path)
        .await
        .ok()
        .map(|v| v.trim_end().to_owned())
}

/// Control plane view of the manifest directory.
///
/// Reads go to the in-memory [`ControlPlane`]; writes also go to disk.
#[derive(Debug)]
pub struct ManifestStore {
    dir: PathBuf,
    plane: Arc<ControlPlane>,
    paths: DashMap<(String, String), PathBuf>,
}

impl ManifestStore {
    /// Create a store over `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            plane: Arc::new(ControlPlane::new()),
            paths: DashMap::new(),
        }
    }

    /// The in-memory control plane.
    #[must_use]
    pub fn plane(&self) -> &Arc<ControlPlane> {
        &self.plane
    }

    /// Load every document in the directory, in file name order.
    pub async fn load(&self) -> Result<Manifests> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("cannot read manifest dir {}", self.dir.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        let mut manifests = Manifests::default();
        for path in files {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("cannot read {}", path.display()))?;
            let document: Document = serde_json::from_str(&raw)
                .with_context(|| format!("invalid manifest {}", path.display()))?;
            match document {
                Document::ProviderConfig(config) => self.add_provider_config(config).await,
                Document::ReferenceTarget(object) => {
                    debug!(kind = %object.kind, name = %object.name, "registered reference target");
                    self.plane.register(object);
                }
                Document::Bucket(bucket) => {
                    self.track(bucket.as_ref(), path);
                    self.plane.apply(bucket.as_ref())?;
                    manifests.buckets.push(*bucket);
                }
                Document::Table(table) => {
                    self.track(table.as_ref(), path);
                    self.plane.apply(table.as_ref())?;
                    manifests.tables.push(*table);
                }
            }
        }
        info!(
            dir = %self.dir.display(),
            buckets = manifests.buckets.len(),
            tables = manifests.tables.len(),
            "loaded manifests"
        );
        Ok(manifests)
    }

    async fn add_provider_config(&self, config: ProviderConfig) {
        if let Some(selector) = &config.credentials.secret_ref {
            match read_secret(&self.dir, selector).await {
                Some(value) => self.plane.add_secret(&selector.name, &selector.key, value),
                None => warn!(
                    provider_config = %config.name,
                    secret = %selector.name,
                    env = %secret_env_var(selector),
                    "secret not found in the environment or the secrets directory"
                ),
            }
        }
        debug!(name = %config.name, "loaded provider config");
        self.plane.add_provider_config(config);
    }

    fn track<R: Managed>(&self, resource: &R, path: PathBuf) {
        self.paths.insert(
            (resource.kind().to_owned(), resource.meta().name.clone()),
            path,
        );
    }

    fn path_of<R: Managed>(&self, resource: &R) -> PathBuf {
        let key = (resource.kind().to_owned(), resource.meta().name.clone());
        self.paths.get(&key).map_or_else(
            || {
                self.dir.join(format!(
                    "{}-{}.json",
                    resource.kind().to_ascii_lowercase(),
                    resource.meta().name
                ))
            },
            |p| p.clone(),
        )
    }

    /// Drop a resource whose external counterpart is gone, removing its
    /// manifest file.
    pub async fn forget<R: Managed>(&self, resource: &R) -> Result<()> {
        let path = self.path_of(resource);
        self.plane.remove(resource.kind(), &resource.meta().name);
        self.paths
            .remove(&(resource.kind().to_owned(), resource.meta().name.clone()));
        match tokio::fs::remove_file(&path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(e).with_context(|| format!("cannot remove {}", path.display()))
            }
            _ => {
                info!(kind = resource.kind(), name = %resource.meta().name, "removed manifest");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl<R: Managed> ResourceWriter<R> for ManifestStore {
    async fn write(&self, resource: &R) -> ProviderResult<()> {
        ResourceWriter::<R>::write(self.plane.as_ref(), resource).await?;

        let document = serde_json::json!({ "kind": resource.kind(), "object": resource });
        let body = serde_json::to_vec_pretty(&document)
            .map_err(|e| ProviderError::ControlPlane(e.to_string()))?;
        let path = self.path_of(resource);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| ProviderError::ControlPlane(format!("{}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| ProviderError::ControlPlane(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "manifest written");
        Ok(())
    }

    async fn publish_connection_details(
        &self,
        resource: &R,
        details: &ConnectionDetails,
    ) -> ProviderResult<()> {
        ResourceWriter::<R>::publish_connection_details(self.plane.as_ref(), resource, details)
            .await
    }
}
