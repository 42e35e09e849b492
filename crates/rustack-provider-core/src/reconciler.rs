//! One reconcile tick for one managed resource.
//!
//! ```text
//! external-name default -> references -> connect -> observe
//!     -> delete | create | update -> conditions -> write status
//! ```
//!
//! Failures never escape the tick: they become a `Synced=False` condition and
//! the outcome tells the caller when to come back. Dropping the future cancels
//! the tick at its next await point; nothing is rolled back.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::condition::Condition;
use crate::error::ProviderResult;
use crate::external::{ConnectionDetails, ExternalConnector, ResourceWriter};
use crate::reference::{ReferenceResolver, ReferenceSource};
use crate::resource::{DeletionPolicy, Managed};

/// What the caller should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Reconcile again soon: something changed or a transient error occurred.
    Requeue,
    /// Nothing left to do until the next poll interval or a spec change.
    Poll,
    /// The external resource is gone (or orphaned); drop the managed object.
    Deleted,
}

/// Drives reconcile ticks for one resource kind.
pub struct Reconciler<R> {
    connector: Arc<dyn ExternalConnector<R>>,
    references: Arc<dyn ReferenceSource>,
    writer: Arc<dyn ResourceWriter<R>>,
    resolver: Option<Arc<dyn ReferenceResolver<R>>>,
}

impl<R> fmt::Debug for Reconciler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("connector", &self.connector)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl<R: Managed> Reconciler<R> {
    /// Create a reconciler.
    pub fn new(
        connector: Arc<dyn ExternalConnector<R>>,
        references: Arc<dyn ReferenceSource>,
        writer: Arc<dyn ResourceWriter<R>>,
    ) -> Self {
        Self {
            connector,
            references,
            writer,
            resolver: None,
        }
    }

    /// Resolve references with `resolver` before every tick.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn ReferenceResolver<R>>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Run one tick against `resource`, updating it in place.
    pub async fn reconcile(&self, resource: &mut R) -> ReconcileOutcome {
        let snapshot = resource.clone();
        let outcome = match self.tick(resource).await {
            Ok(outcome) => {
                resource.set_condition(Condition::reconcile_success());
                outcome
            }
            Err(err) => {
                warn!(
                    kind = resource.kind(),
                    name = %resource.meta().name,
                    error = %err,
                    terminal = err.is_terminal(),
                    "reconcile failed"
                );
                resource.set_condition(Condition::reconcile_error(&err));
                if err.is_terminal() {
                    ReconcileOutcome::Poll
                } else {
                    ReconcileOutcome::Requeue
                }
            }
        };

        if outcome != ReconcileOutcome::Deleted && *resource != snapshot {
            if let Err(err) = self.writer.write(resource).await {
                warn!(name = %resource.meta().name, error = %err, "cannot write status");
                return ReconcileOutcome::Requeue;
            }
        }
        outcome
    }

    async fn tick(&self, resource: &mut R) -> ProviderResult<ReconcileOutcome> {
        if !resource.meta().has_external_name() {
            let name = resource.meta().name.clone();
            resource.meta_mut().set_external_name(name);
            self.writer.write(resource).await?;
        }

        let deleting = resource.meta().is_deleting();
        if deleting && resource.deletion_policy() == DeletionPolicy::Orphan {
            info!(name = %resource.meta().name, "orphaning external resource");
            resource.set_condition(Condition::deleting());
            return Ok(ReconcileOutcome::Deleted);
        }

        if !deleting {
            if let Some(resolver) = &self.resolver {
                let before = resource.clone();
                resolver
                    .resolve_references(self.references.as_ref(), resource)
                    .await?;
                if *resource != before {
                    self.writer.write(resource).await?;
                }
            }
        }

        let client = self.connector.connect(resource).await?;
        let observation = client.observe(resource).await?;
        debug!(
            name = %resource.meta().name,
            exists = observation.resource_exists,
            up_to_date = observation.resource_up_to_date,
            "observed external resource"
        );
        if observation.resource_late_initialized {
            self.writer.write(resource).await?;
        }

        if deleting {
            resource.set_condition(Condition::deleting());
            if observation.resource_exists {
                client.delete(resource).await?;
                return Ok(ReconcileOutcome::Requeue);
            }
            info!(name = %resource.meta().name, "external resource deleted");
            return Ok(ReconcileOutcome::Deleted);
        }

        self.publish(resource, &observation.connection_details).await?;

        if !observation.resource_exists {
            let creation = client.create(resource).await?;
            resource.set_condition(Condition::creating());
            info!(name = %resource.meta().name, "external resource created");
            self.publish(resource, &creation.connection_details).await?;
            return Ok(ReconcileOutcome::Requeue);
        }

        if observation.resource_up_to_date {
            return Ok(ReconcileOutcome::Poll);
        }

        let update = client.update(resource).await?;
        self.publish(resource, &update.connection_details).await?;
        Ok(ReconcileOutcome::Requeue)
    }

    async fn publish(&self, resource: &R, details: &ConnectionDetails) -> ProviderResult<()> {
        if details.is_empty() {
            return Ok(());
        }
        self.writer.publish_connection_details(resource, details).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::condition::{ConditionReason, ConditionStatus, ConditionType, get_condition};
    use crate::error::ProviderError;
    use crate::external::{ExternalClient, ExternalCreation, ExternalObservation, ExternalUpdate};
    use crate::resource::{AtProvider, ForProvider, ManagedResource, ObjectMeta};
    use crate::store::ControlPlane;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        size: u32,
    }

    impl ForProvider for Widget {
        const KIND: &'static str = "Widget";
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct WidgetObservation {}

    impl AtProvider for WidgetObservation {}

    type ManagedWidget = ManagedResource<Widget, WidgetObservation>;

    #[derive(Debug, Default)]
    struct World {
        exists: bool,
        size: u32,
        fail_connect: bool,
        fail_update: Option<fn() -> ProviderError>,
        calls: Vec<&'static str>,
    }

    #[derive(Debug, Clone, Default)]
    struct Shared(Arc<Mutex<World>>);

    #[derive(Debug)]
    struct Client(Shared);

    #[async_trait]
    impl ExternalClient<ManagedWidget> for Client {
        async fn observe(&self, r: &mut ManagedWidget) -> ProviderResult<ExternalObservation> {
            let mut world = self.0.0.lock();
            world.calls.push("observe");
            if !world.exists {
                return Ok(ExternalObservation::absent());
            }
            let mut obs = ExternalObservation::present(world.size == r.spec.for_provider.size);
            obs.connection_details
                .insert("endpoint".into(), r.metadata.external_name().to_owned());
            Ok(obs)
        }

        async fn create(&self, r: &mut ManagedWidget) -> ProviderResult<ExternalCreation> {
            let mut world = self.0.0.lock();
            world.calls.push("create");
            world.exists = true;
            world.size = r.spec.for_provider.size;
            Ok(ExternalCreation::default())
        }

        async fn update(&self, r: &ManagedWidget) -> ProviderResult<ExternalUpdate> {
            let mut world = self.0.0.lock();
            world.calls.push("update");
            if let Some(err) = world.fail_update {
                return Err(err());
            }
            world.size = r.spec.for_provider.size;
            Ok(ExternalUpdate::default())
        }

        async fn delete(&self, _: &mut ManagedWidget) -> ProviderResult<()> {
            let mut world = self.0.0.lock();
            world.calls.push("delete");
            world.exists = false;
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Connector(Shared);

    #[async_trait]
    impl ExternalConnector<ManagedWidget> for Connector {
        async fn connect(
            &self,
            _: &ManagedWidget,
        ) -> ProviderResult<Box<dyn ExternalClient<ManagedWidget>>> {
            if self.0.0.lock().fail_connect {
                return Err(ProviderError::Connect("no credentials".into()));
            }
            Ok(Box::new(Client(self.0.clone())))
        }
    }

    fn setup() -> (Reconciler<ManagedWidget>, Shared, Arc<ControlPlane>) {
        let shared = Shared::default();
        let plane = Arc::new(ControlPlane::new());
        let reconciler = Reconciler::new(
            Arc::new(Connector(shared.clone())),
            plane.clone(),
            plane.clone(),
        );
        (reconciler, shared, plane)
    }

    fn widget() -> ManagedWidget {
        ManagedWidget::new(ObjectMeta::named("w"), Widget { size: 3 })
    }

    fn synced(r: &ManagedWidget) -> &Condition {
        get_condition(&r.status.conditions, ConditionType::Synced).unwrap()
    }

    #[tokio::test]
    async fn test_should_create_then_poll() {
        let (reconciler, shared, plane) = setup();
        let mut w = widget();

        assert_eq!(reconciler.reconcile(&mut w).await, ReconcileOutcome::Requeue);
        assert_eq!(w.metadata.external_name(), "w");
        assert!(w.metadata.has_external_name());
        assert_eq!(
            get_condition(&w.status.conditions, ConditionType::Ready).unwrap().reason,
            ConditionReason::Creating
        );

        assert_eq!(reconciler.reconcile(&mut w).await, ReconcileOutcome::Poll);
        assert_eq!(shared.0.lock().calls, vec!["observe", "create", "observe"]);
        assert_eq!(synced(&w).status, ConditionStatus::True);
        assert_eq!(
            plane.connection_details("Widget", "w").unwrap()["endpoint"],
            "w"
        );
    }

    #[tokio::test]
    async fn test_should_update_stale_resource() {
        let (reconciler, shared, _) = setup();
        shared.0.lock().exists = true;
        shared.0.lock().size = 1;
        let mut w = widget();

        assert_eq!(reconciler.reconcile(&mut w).await, ReconcileOutcome::Requeue);
        assert_eq!(shared.0.lock().size, 3);
        assert_eq!(reconciler.reconcile(&mut w).await, ReconcileOutcome::Poll);
    }

    #[tokio::test]
    async fn test_should_surface_errors_as_conditions() {
        let (reconciler, shared, _) = setup();
        shared.0.lock().fail_connect = true;
        let mut w = widget();

        assert_eq!(reconciler.reconcile(&mut w).await, ReconcileOutcome::Requeue);
        let cond = synced(&w);
        assert_eq!(cond.reason, ConditionReason::ReconcileError);
        assert_eq!(
            cond.message.as_deref(),
            Some("cannot connect to provider: no credentials")
        );
    }

    #[tokio::test]
    async fn test_should_not_requeue_terminal_errors() {
        let (reconciler, shared, _) = setup();
        {
            let mut world = shared.0.lock();
            world.exists = true;
            world.fail_update = Some(|| ProviderError::configuration("invalid"));
        }
        let mut w = widget();
        assert_eq!(reconciler.reconcile(&mut w).await, ReconcileOutcome::Poll);
        assert_eq!(synced(&w).status, ConditionStatus::False);
    }

    #[tokio::test]
    async fn test_should_delete_until_gone() {
        let (reconciler, shared, _) = setup();
        shared.0.lock().exists = true;
        shared.0.lock().size = 3;
        let mut w = widget();
        w.metadata.deletion_timestamp = Some(chrono::Utc::now());

        assert_eq!(reconciler.reconcile(&mut w).await, ReconcileOutcome::Requeue);
        assert_eq!(reconciler.reconcile(&mut w).await, ReconcileOutcome::Deleted);
        assert_eq!(
            shared.0.lock().calls,
            vec!["observe", "delete", "observe"]
        );
    }

    #[tokio::test]
    async fn test_should_orphan_without_provider_calls() {
        let (reconciler, shared, _) = setup();
        shared.0.lock().exists = true;
        let mut w = widget().with_deletion_policy(DeletionPolicy::Orphan);
        w.metadata.deletion_timestamp = Some(chrono::Utc::now());

        assert_eq!(reconciler.reconcile(&mut w).await, ReconcileOutcome::Deleted);
        assert!(shared.0.lock().calls.is_empty());
        assert!(shared.0.lock().exists);
    }
}
