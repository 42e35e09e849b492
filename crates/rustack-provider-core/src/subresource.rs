//! The uniform sub-resource contract and the ordered runner over it.
//!
//! Each sub-resource owns one aspect of an external resource (versioning,
//! CORS, tags, ...). A [`SubresourceSet`] holds them in a fixed order and runs
//! the late-init, drift and update passes the engines are built from.
//!
//! Deletion is a separate capability: only sub-resources whose provider API
//! can remove the configuration return a [`SubresourceDeleter`]. The runner
//! downgrades `NeedsDeletion` from any other sub-resource to `Updated`, so an
//! unset block never removes configuration that has no delete API.

use std::fmt::{self, Debug};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{ERR_CREATE_OR_UPDATE, ERR_DELETE, ProviderError, ProviderResult};

/// Classification of one sub-resource against its desired block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceStatus {
    /// Nothing to do.
    Updated,
    /// Desired block is set and differs from the provider.
    NeedsUpdate,
    /// Desired block is unset but the provider still has configuration.
    NeedsDeletion,
}

/// One aspect of an external resource.
#[async_trait]
pub trait Subresource<R>: Send + Sync + Debug
where
    R: Send + Sync + 'static,
{
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch the provider state and classify it against the desired block.
    async fn observe(&self, resource: &R) -> ProviderResult<ResourceStatus>;

    /// Apply the desired block. No-op when the block is unset.
    async fn create_or_update(&self, resource: &R) -> ProviderResult<()>;

    /// Fill unset desired fields from the provider. Never overwrites.
    async fn late_initialize(&self, resource: &mut R) -> ProviderResult<()>;

    /// Whether the desired block is present.
    fn subresource_exists(&self, resource: &R) -> bool;

    /// `false` when the provider shape cannot be projected back losslessly;
    /// such sub-resources are skipped by the per-tick late-init pass.
    fn late_initializes(&self) -> bool {
        true
    }

    /// The delete capability, for sub-resources whose API has one.
    fn deleter(&self) -> Option<&dyn SubresourceDeleter<R>> {
        None
    }
}

/// Delete capability of a sub-resource.
#[async_trait]
pub trait SubresourceDeleter<R>: Send + Sync
where
    R: Send + Sync + 'static,
{
    /// Remove the configuration. Not-found is success.
    async fn delete(&self, resource: &R) -> ProviderResult<()>;
}

/// The first sub-resource found out of date by [`SubresourceSet::first_drift`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drift {
    /// Sub-resource name.
    pub subresource: &'static str,
    /// Its classification.
    pub status: ResourceStatus,
}

/// An ordered list of sub-resources.
pub struct SubresourceSet<R> {
    subresources: Vec<Box<dyn Subresource<R>>>,
}

impl<R> Debug for SubresourceSet<R>
where
    R: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<R> SubresourceSet<R>
where
    R: Send + Sync + 'static,
{
    /// Create a set; the order given is the reconcile order.
    #[must_use]
    pub fn new(subresources: Vec<Box<dyn Subresource<R>>>) -> Self {
        Self { subresources }
    }

    /// Sub-resource names in reconcile order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.subresources.iter().map(|s| s.name()).collect()
    }

    /// Observe one sub-resource, downgrading an unsupported deletion.
    pub async fn classify(
        &self,
        subresource: &dyn Subresource<R>,
        resource: &R,
    ) -> ProviderResult<ResourceStatus> {
        let status = subresource.observe(resource).await?;
        if status == ResourceStatus::NeedsDeletion && subresource.deleter().is_none() {
            warn!(
                subresource = subresource.name(),
                "sub-resource has no delete API, ignoring deletion"
            );
            return Ok(ResourceStatus::Updated);
        }
        debug!(subresource = subresource.name(), status = ?status, "observed sub-resource");
        Ok(status)
    }

    /// Per-tick late-init: skips lossy sub-resources and stops at the first
    /// failure.
    pub async fn late_initialize(&self, resource: &mut R) -> ProviderResult<()> {
        for subresource in self.subresources.iter().filter(|s| s.late_initializes()) {
            subresource.late_initialize(resource).await?;
        }
        Ok(())
    }

    /// Creation-time late-init: runs every sub-resource and reports all
    /// failures together.
    pub async fn late_initialize_all(&self, resource: &mut R) -> ProviderResult<()> {
        let mut errors = Vec::new();
        for subresource in &self.subresources {
            if let Err(err) = subresource.late_initialize(resource).await {
                warn!(subresource = subresource.name(), error = %err, "late-init failed");
                errors.push(err);
            }
        }
        ProviderError::aggregate(errors).map_or(Ok(()), Err)
    }

    /// Observe in order and return the first sub-resource that is not
    /// [`ResourceStatus::Updated`].
    pub async fn first_drift(&self, resource: &R) -> ProviderResult<Option<Drift>> {
        for subresource in &self.subresources {
            let status = self.classify(subresource.as_ref(), resource).await?;
            if status != ResourceStatus::Updated {
                return Ok(Some(Drift {
                    subresource: subresource.name(),
                    status,
                }));
            }
        }
        Ok(None)
    }

    /// Update pass: observe each sub-resource in order and delete or apply it
    /// as classified. Stops at the first failure.
    pub async fn apply(&self, resource: &R) -> ProviderResult<()> {
        for subresource in &self.subresources {
            let status = self.classify(subresource.as_ref(), resource).await?;
            Self::converge(subresource.as_ref(), status, resource).await?;
        }
        Ok(())
    }

    /// Update pass for providers that accept one modification at a time:
    /// converges the first drifted sub-resource only and returns its name.
    pub async fn apply_one(&self, resource: &R) -> ProviderResult<Option<&'static str>> {
        for subresource in &self.subresources {
            let status = self.classify(subresource.as_ref(), resource).await?;
            if status != ResourceStatus::Updated {
                Self::converge(subresource.as_ref(), status, resource).await?;
                return Ok(Some(subresource.name()));
            }
        }
        Ok(None)
    }

    async fn converge(
        subresource: &dyn Subresource<R>,
        status: ResourceStatus,
        resource: &R,
    ) -> ProviderResult<()> {
        match status {
            ResourceStatus::Updated => Ok(()),
            ResourceStatus::NeedsDeletion => {
                let Some(deleter) = subresource.deleter() else {
                    return Ok(());
                };
                debug!(subresource = subresource.name(), "deleting sub-resource");
                deleter
                    .delete(resource)
                    .await
                    .map_err(|e| ProviderError::context(ERR_DELETE, e))
            }
            ResourceStatus::NeedsUpdate => {
                debug!(subresource = subresource.name(), "updating sub-resource");
                subresource
                    .create_or_update(resource)
                    .await
                    .map_err(|e| ProviderError::context(ERR_CREATE_OR_UPDATE, e))
            }
        }
    }
}
