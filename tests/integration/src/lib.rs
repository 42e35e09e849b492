//! End-to-end reconcile scenarios for Rustack providers.
//!
//! Most tests drive the full reconcile tick (references, connect, observe,
//! create/update/delete, conditions, write-back) against the in-memory
//! adapters. Tests that talk to a real endpoint are marked `#[ignore]`.
//!
//! Run the live ones with:
//! ```text
//! AWS_ENDPOINT_URL=http://localhost:4566 cargo test -p rustack-integration -- --ignored
//! ```

use std::sync::{Arc, Once};

use rustack_dynamodb_model::Table;
use rustack_dynamodb_provider::{
    AwsTableApiFactory, DynamoDBProviderConfig, MemoryTableApi, MemoryTableApiFactory,
    MemoryTableOptions, TableApiFactory, TableConnector, TableReferenceResolver,
};
use rustack_provider_core::{
    Condition, ConditionType, ControlPlane, CredentialsSource, DEFAULT_PROVIDER_CONFIG, Managed,
    ProviderConfig, ProviderCredentials, ReconcileOutcome, Reconciler, get_condition,
};
use rustack_s3_model::Bucket;
use rustack_s3_provider::{
    AwsBucketApiFactory, BucketApiFactory, BucketConnector, BucketReferenceResolver,
    MemoryBucketApi, MemoryBucketApiFactory, MemoryOptions, S3ProviderConfig,
};
use tracing::debug;

static INIT: Once = Once::new();

/// Upper bound on ticks [`converge`] runs before giving up.
pub const MAX_TICKS: usize = 12;

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint for live tests.
fn endpoint_url() -> String {
    std::env::var("AWS_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

/// A control plane with a `default` provider config using the ambient
/// identity, optionally pointed at `endpoint`.
#[must_use]
pub fn control_plane(endpoint: Option<String>) -> Arc<ControlPlane> {
    init_tracing();
    let plane = Arc::new(ControlPlane::new());
    plane.add_provider_config(ProviderConfig {
        name: DEFAULT_PROVIDER_CONFIG.to_owned(),
        credentials: ProviderCredentials {
            source: CredentialsSource::InjectedIdentity,
            secret_ref: None,
        },
        endpoint,
    });
    plane
}

fn bucket_reconciler(
    plane: &Arc<ControlPlane>,
    factory: Arc<dyn BucketApiFactory>,
) -> Reconciler<Bucket> {
    Reconciler::new(
        Arc::new(BucketConnector::new(plane.clone(), factory)),
        plane.clone(),
        plane.clone(),
    )
    .with_resolver(Arc::new(BucketReferenceResolver))
}

fn table_reconciler(
    plane: &Arc<ControlPlane>,
    factory: Arc<dyn TableApiFactory>,
) -> Reconciler<Table> {
    Reconciler::new(
        Arc::new(TableConnector::new(plane.clone(), factory)),
        plane.clone(),
        plane.clone(),
    )
    .with_resolver(Arc::new(TableReferenceResolver))
}

/// Bucket reconciler wired to an in-memory S3.
#[derive(Debug)]
pub struct BucketHarness {
    /// Control plane holding configs, reference targets and written objects.
    pub plane: Arc<ControlPlane>,
    /// The in-memory S3, for out-of-band edits and call assertions.
    pub store: Arc<MemoryBucketApi>,
    /// The reconciler under test.
    pub reconciler: Reconciler<Bucket>,
}

impl BucketHarness {
    /// Harness with default store options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(MemoryOptions::default())
    }

    /// Harness with custom store options.
    #[must_use]
    pub fn with_options(options: MemoryOptions) -> Self {
        let plane = control_plane(None);
        let store = Arc::new(MemoryBucketApi::new(options));
        let reconciler =
            bucket_reconciler(&plane, Arc::new(MemoryBucketApiFactory::new(store.clone())));
        Self {
            plane,
            store,
            reconciler,
        }
    }
}

impl Default for BucketHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Table reconciler wired to an in-memory DynamoDB.
#[derive(Debug)]
pub struct TableHarness {
    /// Control plane holding configs, reference targets and written objects.
    pub plane: Arc<ControlPlane>,
    /// The in-memory DynamoDB.
    pub store: Arc<MemoryTableApi>,
    /// The reconciler under test.
    pub reconciler: Reconciler<Table>,
}

impl TableHarness {
    /// Harness with custom store options.
    #[must_use]
    pub fn with_options(options: MemoryTableOptions) -> Self {
        let plane = control_plane(None);
        let store = Arc::new(MemoryTableApi::new(options));
        let reconciler =
            table_reconciler(&plane, Arc::new(MemoryTableApiFactory::new(store.clone())));
        Self {
            plane,
            store,
            reconciler,
        }
    }
}

/// Bucket reconciler against the live endpoint.
#[must_use]
pub fn live_bucket_reconciler() -> (Arc<ControlPlane>, Reconciler<Bucket>) {
    let plane = control_plane(Some(endpoint_url()));
    let factory = Arc::new(AwsBucketApiFactory::new(S3ProviderConfig::default()));
    let reconciler = bucket_reconciler(&plane, factory);
    (plane, reconciler)
}

/// Table reconciler against the live endpoint.
#[must_use]
pub fn live_table_reconciler() -> (Arc<ControlPlane>, Reconciler<Table>) {
    let plane = control_plane(Some(endpoint_url()));
    let factory = Arc::new(AwsTableApiFactory::new(DynamoDBProviderConfig::default()));
    let reconciler = table_reconciler(&plane, factory);
    (plane, reconciler)
}

/// Tick until the resource settles on `Poll` or `Deleted`, returning every
/// outcome seen.
pub async fn converge<R: Managed>(
    reconciler: &Reconciler<R>,
    resource: &mut R,
) -> Vec<ReconcileOutcome> {
    let mut outcomes = Vec::new();
    for _ in 0..MAX_TICKS {
        let outcome = reconciler.reconcile(resource).await;
        debug!(kind = resource.kind(), name = %resource.meta().name, ?outcome, "tick");
        outcomes.push(outcome);
        if outcome != ReconcileOutcome::Requeue {
            break;
        }
    }
    outcomes
}

/// Look up a condition, panicking when it is missing.
#[must_use]
pub fn condition(conditions: &[Condition], kind: ConditionType) -> &Condition {
    get_condition(conditions, kind).unwrap_or_else(|| panic!("missing {kind:?} condition"))
}

/// Generate a unique resource name for a live test.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("rustack-{prefix}-{id}")
}

mod test_bucket;
mod test_drift;
mod test_live;
mod test_object_lock;
mod test_policy;
mod test_references;
mod test_replication;
mod test_table;
mod test_tagging;
