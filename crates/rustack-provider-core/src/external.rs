//! Contracts between the reconcile driver and a provider engine.

use std::collections::BTreeMap;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::ProviderResult;

/// Connection details published once a resource is ready.
pub type ConnectionDetails = BTreeMap<String, String>;

/// Result of observing an external resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalObservation {
    /// Whether the external resource exists.
    pub resource_exists: bool,
    /// Whether it matches the desired state.
    pub resource_up_to_date: bool,
    /// Whether late-initialization changed the desired state.
    pub resource_late_initialized: bool,
    /// Connection details to publish.
    pub connection_details: ConnectionDetails,
}

impl ExternalObservation {
    /// The external resource does not exist.
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    /// The external resource exists, up to date or not.
    #[must_use]
    pub fn present(up_to_date: bool) -> Self {
        Self {
            resource_exists: true,
            resource_up_to_date: up_to_date,
            ..Self::default()
        }
    }
}

/// Result of creating an external resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalCreation {
    /// Connection details known right after creation.
    pub connection_details: ConnectionDetails,
}

/// Result of updating an external resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalUpdate {
    /// Connection details known right after the update.
    pub connection_details: ConnectionDetails,
}

/// An engine scoped to one managed resource.
///
/// `observe` may mutate the resource (observation, conditions, late-init);
/// `update` must not touch the desired state.
#[async_trait]
pub trait ExternalClient<R>: Send + Sync + Debug {
    /// Observe the external resource.
    async fn observe(&self, resource: &mut R) -> ProviderResult<ExternalObservation>;

    /// Create the external resource.
    async fn create(&self, resource: &mut R) -> ProviderResult<ExternalCreation>;

    /// Drive the external resource toward the desired state.
    async fn update(&self, resource: &R) -> ProviderResult<ExternalUpdate>;

    /// Delete the external resource.
    async fn delete(&self, resource: &mut R) -> ProviderResult<()>;
}

/// Builds an [`ExternalClient`] for a managed resource.
#[async_trait]
pub trait ExternalConnector<R>: Send + Sync + Debug {
    /// Resolve credentials and region, and return a fresh engine.
    async fn connect(&self, resource: &R) -> ProviderResult<Box<dyn ExternalClient<R>>>;
}

/// Persists managed resources to the control plane.
#[async_trait]
pub trait ResourceWriter<R>: Send + Sync + Debug {
    /// Write the whole object back.
    async fn write(&self, resource: &R) -> ProviderResult<()>;

    /// Publish connection details for the object.
    async fn publish_connection_details(
        &self,
        resource: &R,
        details: &ConnectionDetails,
    ) -> ProviderResult<()>;
}
