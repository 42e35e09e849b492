//! Deletion protection.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_dynamodb_model::Table;
use rustack_dynamodb_model::types::UpdateTableInput;
use rustack_provider_core::late_init::late_init;
use rustack_provider_core::{ProviderResult, ResourceStatus, Subresource};

use super::{describe, params, params_mut, table_name, update};
use crate::api::TableApi;

/// Reconciles `deletionProtectionEnabled`.
#[derive(Debug)]
pub struct DeletionProtectionClient {
    api: Arc<dyn TableApi>,
}

impl DeletionProtectionClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn TableApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Subresource<Table> for DeletionProtectionClient {
    fn name(&self) -> &'static str {
        "deletion-protection"
    }

    async fn observe(&self, table: &Table) -> ProviderResult<ResourceStatus> {
        let Some(desired) = params(table).deletion_protection_enabled else {
            return Ok(ResourceStatus::Updated);
        };
        let observed = describe(self.api.as_ref(), table).await?;
        Ok(if desired == observed.deletion_protection_enabled {
            ResourceStatus::Updated
        } else {
            ResourceStatus::NeedsUpdate
        })
    }

    async fn create_or_update(&self, table: &Table) -> ProviderResult<()> {
        let input = UpdateTableInput {
            deletion_protection_enabled: params(table).deletion_protection_enabled,
            ..UpdateTableInput::new(table_name(table))
        };
        update(self.api.as_ref(), &input).await
    }

    async fn late_initialize(&self, table: &mut Table) -> ProviderResult<()> {
        let observed = describe(self.api.as_ref(), table).await?;
        late_init(
            &mut params_mut(table).deletion_protection_enabled,
            Some(&observed.deletion_protection_enabled),
        );
        Ok(())
    }

    fn subresource_exists(&self, table: &Table) -> bool {
        params(table).deletion_protection_enabled.is_some()
    }
}
