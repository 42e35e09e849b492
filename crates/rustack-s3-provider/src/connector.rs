//! Turns a bucket manifest into a ready-to-use [`BucketEngine`].
//!
//! Connecting resolves the bucket's provider config into region, credentials
//! and endpoint, then asks a [`BucketApiFactory`] for a client. The factory
//! seam is what lets the same connector drive real S3 or the in-memory store.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use rustack_provider_core::{
    ConnectSettings, CredentialStore, ExternalClient, ExternalConnector, Managed,
    ProviderResult, resolve_connect_settings,
};
use rustack_s3_model::Bucket;
use tracing::debug;

use crate::api::BucketApi;
use crate::external::{BucketEngine, bucket_region};
use crate::memory::MemoryBucketApi;

/// Builds a [`BucketApi`] from resolved connect settings.
#[async_trait]
pub trait BucketApiFactory: Send + Sync + Debug {
    /// Build a client.
    async fn build(&self, settings: &ConnectSettings) -> ProviderResult<Arc<dyn BucketApi>>;
}

/// Hands out one shared in-memory store regardless of settings.
#[derive(Debug, Clone)]
pub struct MemoryBucketApiFactory {
    store: Arc<MemoryBucketApi>,
}

impl MemoryBucketApiFactory {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: Arc<MemoryBucketApi>) -> Self {
        Self { store }
    }

    /// The wrapped store.
    #[must_use]
    pub fn store(&self) -> &Arc<MemoryBucketApi> {
        &self.store
    }
}

#[async_trait]
impl BucketApiFactory for MemoryBucketApiFactory {
    async fn build(&self, _settings: &ConnectSettings) -> ProviderResult<Arc<dyn BucketApi>> {
        let api: Arc<dyn BucketApi> = self.store.clone();
        Ok(api)
    }
}

/// Connector for [`Bucket`] resources.
#[derive(Debug, Clone)]
pub struct BucketConnector {
    credentials: Arc<dyn CredentialStore>,
    factory: Arc<dyn BucketApiFactory>,
}

impl BucketConnector {
    /// Create a connector.
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialStore>, factory: Arc<dyn BucketApiFactory>) -> Self {
        Self {
            credentials,
            factory,
        }
    }
}

#[async_trait]
impl ExternalConnector<Bucket> for BucketConnector {
    async fn connect(&self, bucket: &Bucket) -> ProviderResult<Box<dyn ExternalClient<Bucket>>> {
        let region = bucket_region(&bucket.spec.for_provider);
        let settings = resolve_connect_settings(
            self.credentials.as_ref(),
            bucket.provider_config_name(),
            region,
        )
        .await?;
        debug!(bucket = %bucket.metadata.name, region, "connecting");
        let api = self.factory.build(&settings).await?;
        Ok(Box::new(BucketEngine::new(api)))
    }
}
