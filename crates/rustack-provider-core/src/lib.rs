//! Managed-resource runtime shared by every Rustack provider.
//!
//! This crate holds everything about reconciling a declarative resource that
//! does not depend on a particular AWS service: the object model and its
//! conditions, the sub-resource contract and its ordered runner, reference
//! resolution, provider-config and credential handling, an in-memory control
//! plane and the per-tick reconcile driver.
//!
//! # Architecture
//!
//! ```text
//!   Reconciler (one tick)
//!        |
//!        +--> ReferenceResolver --> ReferenceSource (control plane)
//!        |
//!        +--> ExternalConnector --> ExternalClient (service engine)
//!                                        |
//!                                        v
//!                                  SubresourceSet (ordered)
//! ```

mod condition;
mod config;
mod error;
mod external;
pub mod late_init;
mod provider_config;
mod reconciler;
pub mod reference;
mod resource;
mod store;
mod subresource;
mod types;

pub use condition::{
    Condition, ConditionReason, ConditionStatus, ConditionType, get_condition, set_condition,
};
pub use config::ControllerConfig;
pub use error::{BoxError, ERR_CREATE_OR_UPDATE, ERR_DELETE, ProviderError, ProviderResult};
pub use external::{
    ConnectionDetails, ExternalClient, ExternalConnector, ExternalCreation, ExternalObservation,
    ExternalUpdate, ResourceWriter,
};
pub use provider_config::{
    AwsCredentials, ConnectSettings, CredentialStore, CredentialsSource, DEFAULT_PROVIDER_CONFIG,
    ProviderConfig, ProviderCredentials, ResolvedCredentials, SecretKeySelector,
    resolve_connect_settings,
};
pub use reconciler::{ReconcileOutcome, Reconciler};
pub use reference::{
    Reference, ReferenceResolver, ReferenceSource, ReferencedObject, ResolutionRequest,
    ResolutionResponse, Selector,
};
pub use resource::{
    AtProvider, DeletionPolicy, EXTERNAL_NAME_ANNOTATION, ForProvider, Managed, ManagedResource,
    ManagedStatus, ObjectMeta, ProviderConfigReference, ResourceSpec,
};
pub use store::ControlPlane;
pub use subresource::{Drift, ResourceStatus, Subresource, SubresourceDeleter, SubresourceSet};
pub use types::{AccountId, AwsRegion, Partition};
