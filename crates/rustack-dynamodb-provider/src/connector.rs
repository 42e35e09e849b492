//! Turns a table manifest into a ready-to-use [`TableEngine`].

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use rustack_dynamodb_model::Table;
use rustack_provider_core::{
    ConnectSettings, CredentialStore, ExternalClient, ExternalConnector, Managed,
    ProviderResult, resolve_connect_settings,
};
use tracing::debug;

use crate::api::TableApi;
use crate::external::{TableEngine, table_region};
use crate::memory::MemoryTableApi;

/// Builds a [`TableApi`] from resolved connect settings.
#[async_trait]
pub trait TableApiFactory: Send + Sync + Debug {
    /// Build a client.
    async fn build(&self, settings: &ConnectSettings) -> ProviderResult<Arc<dyn TableApi>>;
}

/// Hands out one shared in-memory store regardless of settings.
#[derive(Debug, Clone)]
pub struct MemoryTableApiFactory {
    store: Arc<MemoryTableApi>,
}

impl MemoryTableApiFactory {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: Arc<MemoryTableApi>) -> Self {
        Self { store }
    }

    /// The wrapped store.
    #[must_use]
    pub fn store(&self) -> &Arc<MemoryTableApi> {
        &self.store
    }
}

#[async_trait]
impl TableApiFactory for MemoryTableApiFactory {
    async fn build(&self, _settings: &ConnectSettings) -> ProviderResult<Arc<dyn TableApi>> {
        let api: Arc<dyn TableApi> = self.store.clone();
        Ok(api)
    }
}

/// Connector for [`Table`] resources.
#[derive(Debug, Clone)]
pub struct TableConnector {
    credentials: Arc<dyn CredentialStore>,
    factory: Arc<dyn TableApiFactory>,
}

impl TableConnector {
    /// Create a connector.
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialStore>, factory: Arc<dyn TableApiFactory>) -> Self {
        Self {
            credentials,
            factory,
        }
    }
}

#[async_trait]
impl ExternalConnector<Table> for TableConnector {
    async fn connect(&self, table: &Table) -> ProviderResult<Box<dyn ExternalClient<Table>>> {
        let region = table_region(&table.spec.for_provider);
        let settings = resolve_connect_settings(
            self.credentials.as_ref(),
            table.provider_config_name(),
            region,
        )
        .await?;
        debug!(table = %table.metadata.name, region, "connecting");
        let api = self.factory.build(&settings).await?;
        Ok(Box::new(TableEngine::new(api)))
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use rustack_dynamodb_model::TableParameters;
    use rustack_provider_core::{
        ControlPlane, CredentialsSource, ObjectMeta, ProviderConfig, ProviderCredentials,
        ResolvedCredentials,
    };

    use super::*;

    #[derive(Debug, Default)]
    struct Recording {
        seen: Mutex<Vec<ConnectSettings>>,
    }

    #[async_trait]
    impl TableApiFactory for Recording {
        async fn build(&self, settings: &ConnectSettings) -> ProviderResult<Arc<dyn TableApi>> {
            self.seen.lock().push(settings.clone());
            Ok(Arc::new(MemoryTableApi::default()))
        }
    }

    fn table(region: &str) -> Table {
        Table::new(
            ObjectMeta::named("orders"),
            TableParameters {
                region: region.into(),
                ..TableParameters::default()
            },
        )
    }

    #[tokio::test]
    async fn test_should_connect_with_injected_identity() {
        let plane = ControlPlane::new();
        plane.add_provider_config(ProviderConfig {
            name: "default".into(),
            credentials: ProviderCredentials {
                source: CredentialsSource::InjectedIdentity,
                secret_ref: None,
            },
            endpoint: None,
        });
        let factory = Arc::new(Recording::default());
        let connector = TableConnector::new(Arc::new(plane), factory.clone());

        connector.connect(&table("ap-southeast-2")).await.unwrap();

        let seen = factory.seen.lock();
        assert_eq!(seen[0].region, "ap-southeast-2");
        assert!(matches!(seen[0].credentials, ResolvedCredentials::DefaultChain));
        assert!(seen[0].endpoint.is_none());
    }

    #[tokio::test]
    async fn test_should_share_memory_store() {
        let plane = ControlPlane::new();
        plane.add_provider_config(ProviderConfig {
            name: "default".into(),
            credentials: ProviderCredentials {
                source: CredentialsSource::Environment,
                secret_ref: None,
            },
            endpoint: None,
        });
        let store = Arc::new(MemoryTableApi::default());
        let connector = TableConnector::new(
            Arc::new(plane),
            Arc::new(MemoryTableApiFactory::new(Arc::clone(&store))),
        );
        let engine = connector.connect(&table("us-east-1")).await.unwrap();
        let observation = engine.observe(&mut table("us-east-1")).await.unwrap();
        assert!(!observation.resource_exists);
        assert_eq!(store.count("DescribeTable"), 1);
    }
}
