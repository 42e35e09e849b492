//! The managed resource object model.
//!
//! A managed resource has three compartments: the user-authored desired state
//! (`spec.forProvider`), the last observation from the provider
//! (`status.atProvider`) and the condition set. The external-name annotation
//! identifies the resource at the provider and defaults to `metadata.name`.

use std::collections::BTreeMap;
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::condition::{Condition, set_condition};
use crate::reference::ReferencedObject;

/// Annotation carrying the provider-side name of a managed resource.
pub const EXTERNAL_NAME_ANNOTATION: &str = "crossplane.io/external-name";

/// Object metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Control-plane identifier.
    pub name: String,
    /// Labels used by reference selectors.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Free-form annotations, including the external name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    /// Set by the control plane once deletion was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_timestamp: Option<DateTime<Utc>>,
}

impl ObjectMeta {
    /// Create metadata with just a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The external name, falling back to the object name.
    #[must_use]
    pub fn external_name(&self) -> &str {
        self.annotations
            .get(EXTERNAL_NAME_ANNOTATION)
            .filter(|v| !v.is_empty())
            .map_or(self.name.as_str(), String::as_str)
    }

    /// Whether the external-name annotation is explicitly set.
    #[must_use]
    pub fn has_external_name(&self) -> bool {
        self.annotations
            .get(EXTERNAL_NAME_ANNOTATION)
            .is_some_and(|v| !v.is_empty())
    }

    /// Set the external-name annotation.
    pub fn set_external_name(&mut self, name: impl Into<String>) {
        self.annotations
            .insert(EXTERNAL_NAME_ANNOTATION.to_owned(), name.into());
    }

    /// Whether deletion was requested.
    #[must_use]
    pub fn is_deleting(&self) -> bool {
        self.deletion_timestamp.is_some()
    }
}

/// What happens to the external resource when the managed resource goes away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeletionPolicy {
    /// Delete the external resource.
    #[default]
    Delete,
    /// Leave the external resource in place.
    Orphan,
}

/// Pointer at a `ProviderConfig` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfigReference {
    /// Name of the referenced provider config.
    pub name: String,
}

/// The `spec` compartment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec<P> {
    /// Desired provider state.
    pub for_provider: P,
    /// Credentials and region configuration to use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigReference>,
    /// Deletion behavior.
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

/// The `status` compartment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedStatus<O> {
    /// Last observation from the provider.
    #[serde(default)]
    pub at_provider: O,
    /// Condition set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

/// Desired-state records that can be wrapped in a [`ManagedResource`].
pub trait ForProvider:
    Debug + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Kind name of the managed resource, e.g. `Bucket`.
    const KIND: &'static str;
}

/// Observation records that can be wrapped in a [`ManagedResource`].
pub trait AtProvider:
    Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// ARN of the external resource, when known.
    fn arn(&self) -> Option<&str> {
        None
    }
}

/// A managed resource: metadata, desired state and status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(
        serialize = "P: Serialize, O: Serialize",
        deserialize = "P: DeserializeOwned, O: DeserializeOwned + Default"
    )
)]
pub struct ManagedResource<P, O> {
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Desired state and reconcile settings.
    pub spec: ResourceSpec<P>,
    /// Observed state and conditions.
    #[serde(default)]
    pub status: ManagedStatus<O>,
}

impl<P, O: Default> ManagedResource<P, O> {
    /// Create a resource with default status.
    pub fn new(metadata: ObjectMeta, for_provider: P) -> Self {
        Self {
            metadata,
            spec: ResourceSpec {
                for_provider,
                provider_config_ref: None,
                deletion_policy: DeletionPolicy::default(),
            },
            status: ManagedStatus::default(),
        }
    }

    /// Point the resource at a provider config.
    #[must_use]
    pub fn with_provider_config(mut self, name: impl Into<String>) -> Self {
        self.spec.provider_config_ref = Some(ProviderConfigReference { name: name.into() });
        self
    }

    /// Set the deletion policy.
    #[must_use]
    pub fn with_deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.spec.deletion_policy = policy;
        self
    }
}

/// Uniform access to the parts of a managed resource the reconciler drives.
pub trait Managed: Debug + Clone + PartialEq + Serialize + Send + Sync + 'static {
    /// Kind name.
    fn kind(&self) -> &'static str;
    /// Object metadata.
    fn meta(&self) -> &ObjectMeta;
    /// Mutable object metadata.
    fn meta_mut(&mut self) -> &mut ObjectMeta;
    /// Current conditions.
    fn conditions(&self) -> &[Condition];
    /// Set a condition, replacing one of the same type.
    fn set_condition(&mut self, condition: Condition);
    /// Deletion behavior.
    fn deletion_policy(&self) -> DeletionPolicy;
    /// Name of the referenced provider config.
    fn provider_config_name(&self) -> Option<&str>;
    /// ARN of the external resource, when observed.
    fn arn(&self) -> Option<&str>;

    /// Snapshot used by reference resolution in other resources.
    fn to_referenced(&self) -> ReferencedObject {
        let meta = self.meta();
        ReferencedObject {
            kind: self.kind().to_owned(),
            name: meta.name.clone(),
            labels: meta.labels.clone(),
            external_name: meta
                .has_external_name()
                .then(|| meta.external_name().to_owned()),
            arn: self.arn().map(str::to_owned),
        }
    }
}

impl<P: ForProvider, O: AtProvider> Managed for ManagedResource<P, O> {
    fn kind(&self) -> &'static str {
        P::KIND
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn conditions(&self) -> &[Condition] {
        &self.status.conditions
    }

    fn set_condition(&mut self, condition: Condition) {
        set_condition(&mut self.status.conditions, condition);
    }

    fn deletion_policy(&self) -> DeletionPolicy {
        self.spec.deletion_policy
    }

    fn provider_config_name(&self) -> Option<&str> {
        self.spec.provider_config_ref.as_ref().map(|r| r.name.as_str())
    }

    fn arn(&self) -> Option<&str> {
        self.status.at_provider.arn()
    }
}
