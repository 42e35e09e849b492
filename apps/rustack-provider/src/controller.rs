//! Per-object reconcile loops.
//!
//! Each managed object gets its own task that ticks, sleeps according to the
//! outcome and ticks again. A shared semaphore bounds how many ticks run at
//! once and every tick runs under the configured timeout.

use std::sync::Arc;
use std::time::Duration;

use rustack_dynamodb_model::Table;
use rustack_dynamodb_provider::{
    AwsTableApiFactory, DynamoDBProviderConfig, MemoryTableApi, MemoryTableApiFactory,
    MemoryTableOptions, TableApiFactory, TableConnector, TableReferenceResolver,
};
use rustack_provider_core::{ControllerConfig, Managed, ReconcileOutcome, Reconciler};
use rustack_s3_model::Bucket;
use rustack_s3_provider::{
    AwsBucketApiFactory, BucketApiFactory, BucketConnector, BucketReferenceResolver,
    MemoryBucketApi, MemoryBucketApiFactory, MemoryOptions, S3ProviderConfig,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::manifest::{ManifestStore, Manifests};

/// Delay before an object that asked for a requeue is ticked again.
const REQUEUE_DELAY: Duration = Duration::from_secs(5);

/// Where reconcilers send their API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// AWS, or whatever endpoint the provider config names.
    Aws,
    /// Process-local in-memory stores, for dry runs.
    Memory,
}

/// Runs reconcile loops for every object in the manifest directory.
#[derive(Debug)]
pub struct Controller {
    config: ControllerConfig,
    store: Arc<ManifestStore>,
    permits: Arc<Semaphore>,
    buckets: Arc<Reconciler<Bucket>>,
    tables: Arc<Reconciler<Table>>,
}

impl Controller {
    /// Wire reconcilers for both kinds against `store`.
    #[must_use]
    pub fn new(config: ControllerConfig, store: Arc<ManifestStore>, backend: Backend) -> Self {
        let bucket_factory: Arc<dyn BucketApiFactory>;
        let table_factory: Arc<dyn TableApiFactory>;
        match backend {
            Backend::Aws => {
                bucket_factory = Arc::new(AwsBucketApiFactory::new(S3ProviderConfig::from_env()));
                table_factory =
                    Arc::new(AwsTableApiFactory::new(DynamoDBProviderConfig::from_env()));
            }
            Backend::Memory => {
                let buckets = MemoryBucketApi::new(MemoryOptions::builder().build());
                let tables = MemoryTableApi::new(MemoryTableOptions::builder().build());
                bucket_factory = Arc::new(MemoryBucketApiFactory::new(Arc::new(buckets)));
                table_factory = Arc::new(MemoryTableApiFactory::new(Arc::new(tables)));
            }
        }

        let plane = store.plane().clone();
        let buckets = Reconciler::new(
            Arc::new(BucketConnector::new(plane.clone(), bucket_factory)),
            plane.clone(),
            store.clone(),
        )
        .with_resolver(Arc::new(BucketReferenceResolver));
        let tables = Reconciler::new(
            Arc::new(TableConnector::new(plane.clone(), table_factory)),
            plane,
            store.clone(),
        )
        .with_resolver(Arc::new(TableReferenceResolver));

        Self {
            permits: Arc::new(Semaphore::new(config.max_concurrent_reconciles.max(1))),
            config,
            store,
            buckets: Arc::new(buckets),
            tables: Arc::new(tables),
        }
    }

    /// Start one loop per managed object.
    pub fn spawn(&self, manifests: Manifests) -> JoinSet<()> {
        let mut tasks = JoinSet::new();
        for bucket in manifests.buckets {
            tasks.spawn(self.run_loop(self.buckets.clone(), bucket));
        }
        for table in manifests.tables {
            tasks.spawn(self.run_loop(self.tables.clone(), table));
        }
        tasks
    }

    /// Tick every managed object exactly once and wait for all of them.
    pub async fn run_once(&self, manifests: Manifests) -> Vec<ReconcileOutcome> {
        let mut tasks = JoinSet::new();
        for bucket in manifests.buckets {
            tasks.spawn(self.tick_once(self.buckets.clone(), bucket));
        }
        for table in manifests.tables {
            tasks.spawn(self.tick_once(self.tables.clone(), table));
        }
        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => warn!(error = %e, "reconcile task failed"),
            }
        }
        outcomes
    }

    fn tick_once<R: Managed>(
        &self,
        reconciler: Arc<Reconciler<R>>,
        mut resource: R,
    ) -> impl Future<Output = ReconcileOutcome> + Send + 'static {
        let permits = self.permits.clone();
        let store = self.store.clone();
        let timeout = self.config.reconcile_timeout();
        async move {
            let outcome = tick(&permits, timeout, &reconciler, &mut resource).await;
            if outcome == ReconcileOutcome::Deleted {
                if let Err(e) = store.forget(&resource).await {
                    warn!(name = %resource.meta().name, error = %e, "cannot forget resource");
                }
            }
            outcome
        }
    }

    fn run_loop<R: Managed>(
        &self,
        reconciler: Arc<Reconciler<R>>,
        mut resource: R,
    ) -> impl Future<Output = ()> + Send + 'static {
        let permits = self.permits.clone();
        let store = self.store.clone();
        let timeout = self.config.reconcile_timeout();
        let poll = self.config.poll_interval();
        async move {
            loop {
                let delay = match tick(&permits, timeout, &reconciler, &mut resource).await {
                    ReconcileOutcome::Requeue => REQUEUE_DELAY,
                    ReconcileOutcome::Poll => poll,
                    ReconcileOutcome::Deleted => {
                        if let Err(e) = store.forget(&resource).await {
                            warn!(
                                name = %resource.meta().name,
                                error = %e,
                                "cannot forget resource"
                            );
                        }
                        return;
                    }
                };
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// One bounded, timed tick.
async fn tick<R: Managed>(
    permits: &Semaphore,
    timeout: Duration,
    reconciler: &Reconciler<R>,
    resource: &mut R,
) -> ReconcileOutcome {
    let Ok(_permit) = permits.acquire().await else {
        return ReconcileOutcome::Poll;
    };
    match tokio::time::timeout(timeout, reconciler.reconcile(resource)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(
                kind = resource.kind(),
                name = %resource.meta().name,
                timeout_secs = timeout.as_secs(),
                "reconcile timed out"
            );
            ReconcileOutcome::Requeue
        }
    }
}

/// Wait for every loop to finish, or abort them all on Ctrl-C.
pub async fn run_until_shutdown(mut tasks: JoinSet<()>) {
    let drained = async { while tasks.join_next().await.is_some() {} };
    let interrupted = tokio::select! {
        _ = tokio::signal::ctrl_c() => true,
        () = drained => false,
    };
    if interrupted {
        info!(running = tasks.len(), "received shutdown signal, stopping reconcilers");
        tasks.abort_all();
        while tasks.join_next().await.is_some() {}
    } else {
        info!("every managed object is gone, exiting");
    }
}

#[cfg(test)]
mod tests {
    use rustack_provider_core::{ConditionStatus, ConditionType, get_condition};

    use super::*;
    use crate::manifest::Document;

    const BUCKET: &str = r#"{
        "kind": "Bucket",
        "object": {
            "metadata": { "name": "logs" },
            "spec": { "forProvider": { "locationConstraint": "us-east-1" } }
        }
    }"#;

    const TABLE: &str = r#"{
        "kind": "Table",
        "object": {
            "metadata": { "name": "orders" },
            "spec": {
                "forProvider": {
                    "region": "us-east-1",
                    "attributeDefinitions": [{ "attributeName": "pk", "attributeType": "S" }],
                    "keySchema": [{ "attributeName": "pk", "keyType": "HASH" }],
                    "billingMode": "PAY_PER_REQUEST"
                }
            }
        }
    }"#;

    const CONFIG: &str = r#"{
        "kind": "ProviderConfig",
        "object": { "name": "default", "credentials": { "source": "InjectedIdentity" } }
    }"#;

    async fn setup() -> (tempfile::TempDir, Arc<ManifestStore>) {
        let dir = tempfile::tempdir().unwrap();
        let files = [("bucket.json", BUCKET), ("table.json", TABLE), ("config.json", CONFIG)];
        for (name, body) in files {
            tokio::fs::write(dir.path().join(name), body).await.unwrap();
        }
        let store = Arc::new(ManifestStore::new(dir.path()));
        (dir, store)
    }

    fn config() -> ControllerConfig {
        ControllerConfig::builder()
            .max_concurrent_reconciles(1)
            .reconcile_timeout_secs(10)
            .build()
    }

    #[tokio::test]
    async fn test_should_create_every_object_against_memory_backend() {
        let (dir, store) = setup().await;
        let controller = Controller::new(config(), store.clone(), Backend::Memory);

        let outcomes = controller.run_once(store.load().await.unwrap()).await;
        assert_eq!(outcomes, vec![ReconcileOutcome::Requeue; 2]);

        let raw = tokio::fs::read_to_string(dir.path().join("table.json"))
            .await
            .unwrap();
        let Document::Table(table) = serde_json::from_str(&raw).unwrap() else {
            panic!("expected a table document");
        };
        assert_eq!(table.metadata.external_name(), "orders");
        let synced = get_condition(&table.status.conditions, ConditionType::Synced).unwrap();
        assert_eq!(synced.status, ConditionStatus::True);
    }

    #[tokio::test]
    async fn test_should_report_missing_provider_config() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("bucket.json"), BUCKET)
            .await
            .unwrap();
        let store = Arc::new(ManifestStore::new(dir.path()));
        let controller = Controller::new(config(), store.clone(), Backend::Memory);

        let mut resource = store.load().await.unwrap().buckets.remove(0);
        let outcome = tick(
            &controller.permits,
            Duration::from_secs(10),
            &controller.buckets,
            &mut resource,
        )
        .await;
        assert_ne!(outcome, ReconcileOutcome::Deleted);
        let synced = get_condition(&resource.status.conditions, ConditionType::Synced).unwrap();
        assert_eq!(synced.status, ConditionStatus::False);
    }
}
