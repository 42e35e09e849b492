//! Billing mode and provisioned capacity.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_dynamodb_model::Table;
use rustack_dynamodb_model::types::{BillingMode, TableDescription, UpdateTableInput};
use rustack_provider_core::late_init::late_init;
use rustack_provider_core::{ProviderResult, ResourceStatus, Subresource};

use super::{describe, params, params_mut, table_name, update};
use crate::api::TableApi;
use crate::validation::validate_billing;

/// Reconciles `billingMode` and `provisionedThroughput`.
#[derive(Debug)]
pub struct BillingClient {
    api: Arc<dyn TableApi>,
}

impl BillingClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn TableApi>) -> Self {
        Self { api }
    }
}

/// The UpdateTable that moves `observed` to the desired billing, if any.
fn billing_update(table: &Table, observed: &TableDescription) -> UpdateTableInput {
    let desired = params(table);
    let mut input = UpdateTableInput::new(table_name(table));
    let Some(mode) = desired.billing_mode else {
        return input;
    };
    if mode != observed.effective_billing_mode() {
        input.billing_mode = Some(mode);
    }
    if mode == BillingMode::Provisioned
        && desired.provisioned_throughput.is_some()
        && desired.provisioned_throughput != observed.provisioned_throughput
    {
        input.provisioned_throughput = desired.provisioned_throughput;
    }
    input
}

#[async_trait]
impl Subresource<Table> for BillingClient {
    fn name(&self) -> &'static str {
        "billing"
    }

    async fn observe(&self, table: &Table) -> ProviderResult<ResourceStatus> {
        let observed = describe(self.api.as_ref(), table).await?;
        Ok(if billing_update(table, &observed).is_empty() {
            ResourceStatus::Updated
        } else {
            ResourceStatus::NeedsUpdate
        })
    }

    async fn create_or_update(&self, table: &Table) -> ProviderResult<()> {
        let desired = params(table);
        if desired.billing_mode.is_none() {
            return Ok(());
        }
        validate_billing(desired.billing_mode, desired.provisioned_throughput.as_ref())?;
        let observed = describe(self.api.as_ref(), table).await?;
        update(self.api.as_ref(), &billing_update(table, &observed)).await
    }

    async fn late_initialize(&self, table: &mut Table) -> ProviderResult<()> {
        let observed = describe(self.api.as_ref(), table).await?;
        let mode = observed.effective_billing_mode();
        let desired = params_mut(table);
        late_init(&mut desired.billing_mode, Some(&mode));
        if desired.billing_mode == Some(BillingMode::Provisioned) {
            late_init(
                &mut desired.provisioned_throughput,
                observed.provisioned_throughput.as_ref(),
            );
        }
        Ok(())
    }

    fn subresource_exists(&self, table: &Table) -> bool {
        params(table).billing_mode.is_some()
    }
}

#[cfg(test)]
mod tests {
    use rustack_dynamodb_model::TableParameters;
    use rustack_dynamodb_model::types::ProvisionedThroughput;

    use super::*;
    use crate::subresource::testing::{TABLE, store, table};

    fn provisioned(read: i64, write: i64) -> TableParameters {
        TableParameters {
            billing_mode: Some(BillingMode::Provisioned),
            provisioned_throughput: Some(ProvisionedThroughput {
                read_capacity_units: read,
                write_capacity_units: write,
            }),
            ..TableParameters::default()
        }
    }

    #[tokio::test]
    async fn test_should_switch_on_demand_table_to_provisioned() {
        let (store, api) = store().await;
        let client = BillingClient::new(api);
        let t = table(provisioned(5, 5));

        assert_eq!(client.observe(&t).await.unwrap(), ResourceStatus::NeedsUpdate);
        client.create_or_update(&t).await.unwrap();

        let description = store.snapshot(TABLE).unwrap();
        assert_eq!(description.billing_mode, Some(BillingMode::Provisioned));
        assert_eq!(
            description.provisioned_throughput,
            Some(ProvisionedThroughput {
                read_capacity_units: 5,
                write_capacity_units: 5
            })
        );
        assert_eq!(client.observe(&t).await.unwrap(), ResourceStatus::Updated);
    }

    #[tokio::test]
    async fn test_should_change_capacity_only_when_it_differs() {
        let (store, api) = store().await;
        let client = BillingClient::new(api);
        client.create_or_update(&table(provisioned(5, 5))).await.unwrap();

        let bigger = table(provisioned(10, 5));
        assert_eq!(client.observe(&bigger).await.unwrap(), ResourceStatus::NeedsUpdate);
        store.clear_calls();
        client.create_or_update(&bigger).await.unwrap();
        assert_eq!(store.count("UpdateTable"), 1);
        assert_eq!(
            store
                .snapshot(TABLE)
                .unwrap()
                .provisioned_throughput
                .unwrap()
                .read_capacity_units,
            10
        );
    }

    #[tokio::test]
    async fn test_should_reject_provisioned_without_capacity() {
        let (store, api) = store().await;
        let client = BillingClient::new(api);
        let t = table(TableParameters {
            billing_mode: Some(BillingMode::Provisioned),
            ..TableParameters::default()
        });
        let err = client.create_or_update(&t).await.unwrap_err();
        assert!(err.is_terminal());
        assert_eq!(store.count("UpdateTable"), 0);
    }

    #[tokio::test]
    async fn test_should_late_init_billing_mode() {
        let (_store, api) = store().await;
        let client = BillingClient::new(api);
        let mut t = table(TableParameters::default());

        assert_eq!(client.observe(&t).await.unwrap(), ResourceStatus::Updated);
        client.late_initialize(&mut t).await.unwrap();
        assert_eq!(
            t.spec.for_provider.billing_mode,
            Some(BillingMode::PayPerRequest)
        );
        assert!(t.spec.for_provider.provisioned_throughput.is_none());
    }
}
