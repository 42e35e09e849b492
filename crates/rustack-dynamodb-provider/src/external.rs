//! The table engine.
//!
//! [`TableEngine`] is the [`ExternalClient`] for `Table` resources. Readiness
//! follows the table status reported by DescribeTable, and nothing is
//! changed while the table is not `ACTIVE`: a table that is still being
//! created or updated is reported as up to date so the reconciler waits for
//! the next tick instead of issuing calls DynamoDB would reject.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_dynamodb_model::types::{CreateTableInput, TableDescription, TableStatus};
use rustack_dynamodb_model::{Table, TableParameters};
use rustack_provider_core::{
    AwsRegion, Condition, ConnectionDetails, ExternalClient, ExternalCreation,
    ExternalObservation, ExternalUpdate, Managed, ProviderError, ProviderResult, SubresourceSet,
};
use tracing::{debug, info};

use crate::api::TableApi;
use crate::subresource::{table_name, table_subresources};
use crate::validation::validate_table;

const ERR_DESCRIBE: &str = "cannot describe table";
const ERR_CREATE: &str = "cannot create table";
const ERR_DELETE_TABLE: &str = "cannot delete table";

/// Connection detail key holding the table name.
pub const CONNECTION_TABLE_NAME: &str = "tableName";
/// Connection detail key holding the table region.
pub const CONNECTION_REGION: &str = "region";
/// Connection detail key holding the latest stream ARN.
pub const CONNECTION_STREAM_ARN: &str = "streamArn";

/// Region of a table; empty means `us-east-1`.
#[must_use]
pub fn table_region(params: &TableParameters) -> &str {
    if params.region.is_empty() {
        AwsRegion::DEFAULT
    } else {
        &params.region
    }
}

/// Ready condition for a table status.
fn readiness(status: TableStatus) -> Condition {
    match status {
        TableStatus::Active => Condition::available(),
        TableStatus::Creating => Condition::creating(),
        TableStatus::Deleting => Condition::deleting(),
        _ => Condition::unavailable(),
    }
}

fn record_observation(table: &mut Table, description: &TableDescription) {
    let at_provider = &mut table.status.at_provider;
    at_provider.arn = Some(description.table_arn.clone());
    at_provider.table_status = Some(description.table_status);
    at_provider.stream_arn.clone_from(&description.latest_stream_arn);
}

fn connection_details(table: &Table) -> ConnectionDetails {
    let mut details = ConnectionDetails::from([
        (CONNECTION_TABLE_NAME.to_owned(), table_name(table).to_owned()),
        (
            CONNECTION_REGION.to_owned(),
            table_region(&table.spec.for_provider).to_owned(),
        ),
    ]);
    if let Some(arn) = &table.status.at_provider.stream_arn {
        details.insert(CONNECTION_STREAM_ARN.to_owned(), arn.clone());
    }
    details
}

/// Reconciles one `Table` against a [`TableApi`].
#[derive(Debug)]
pub struct TableEngine {
    api: Arc<dyn TableApi>,
    subresources: SubresourceSet<Table>,
}

impl TableEngine {
    /// Create an engine with the standard sub-resource order.
    #[must_use]
    pub fn new(api: Arc<dyn TableApi>) -> Self {
        let subresources = table_subresources(&api);
        Self { api, subresources }
    }

    /// Sub-resource names in reconcile order.
    #[must_use]
    pub fn subresource_names(&self) -> Vec<&'static str> {
        self.subresources.names()
    }
}

#[async_trait]
impl ExternalClient<Table> for TableEngine {
    async fn observe(&self, table: &mut Table) -> ProviderResult<ExternalObservation> {
        let name = table_name(table).to_owned();
        let description = match self.api.describe_table(&name).await {
            Ok(description) => description,
            Err(err) if err.is_not_found() => {
                debug!(table = %name, "table does not exist");
                return Ok(ExternalObservation::absent());
            }
            Err(err) => return Err(ProviderError::api(ERR_DESCRIBE, err)),
        };

        record_observation(table, &description);
        table.set_condition(readiness(description.table_status));
        if table.meta().is_deleting() {
            return Ok(ExternalObservation::present(true));
        }
        if description.table_status != TableStatus::Active {
            debug!(table = %name, status = %description.table_status, "table is not active");
            return Ok(ExternalObservation::present(true));
        }

        let desired = table.spec.for_provider.clone();
        self.subresources.late_initialize(table).await?;
        let late_initialized = table.spec.for_provider != desired;

        if let Some(drift) = self.subresources.first_drift(table).await? {
            debug!(
                table = %name,
                subresource = drift.subresource,
                status = ?drift.status,
                "table is out of date"
            );
            table.set_condition(Condition::unavailable());
            return Ok(ExternalObservation {
                resource_late_initialized: late_initialized,
                ..ExternalObservation::present(false)
            });
        }

        Ok(ExternalObservation {
            resource_late_initialized: late_initialized,
            connection_details: connection_details(table),
            ..ExternalObservation::present(true)
        })
    }

    async fn create(&self, table: &mut Table) -> ProviderResult<ExternalCreation> {
        let name = table_name(table).to_owned();
        let params = &table.spec.for_provider;
        validate_table(&name, params)?;

        let input = CreateTableInput {
            table_name: name.clone(),
            attribute_definitions: params.attribute_definitions.clone(),
            key_schema: params.key_schema.clone(),
            billing_mode: params.billing_mode,
            provisioned_throughput: params.provisioned_throughput,
            stream_specification: params.stream_specification,
            sse_specification: params
                .sse_specification
                .as_ref()
                .map(|sse| sse.to_specification()),
            tags: params.tags.clone().unwrap_or_default(),
            deletion_protection_enabled: params.deletion_protection_enabled,
        };

        match self.api.create_table(&input).await {
            Ok(description) => {
                info!(table = %name, region = table_region(params), "created table");
                record_observation(table, &description);
            }
            Err(err) if err.is_in_use() => {
                debug!(table = %name, "table already exists, treating create as done");
            }
            Err(err) => return Err(ProviderError::api(ERR_CREATE, err)),
        }
        // No late-init pass here: the table is still CREATING and observe
        // fills defaults in once it turns ACTIVE.
        table.set_condition(Condition::creating());
        Ok(ExternalCreation::default())
    }

    async fn update(&self, table: &Table) -> ProviderResult<ExternalUpdate> {
        if table.status.at_provider.table_status != Some(TableStatus::Active) {
            debug!(table = table_name(table), "skipping update of inactive table");
            return Ok(ExternalUpdate::default());
        }
        if let Some(applied) = self.subresources.apply_one(table).await? {
            info!(table = table_name(table), subresource = applied, "updated table");
        }
        Ok(ExternalUpdate::default())
    }

    async fn delete(&self, table: &mut Table) -> ProviderResult<()> {
        table.set_condition(Condition::deleting());
        if table.status.at_provider.table_status == Some(TableStatus::Deleting) {
            return Ok(());
        }
        let name = table_name(table).to_owned();
        match self.api.delete_table(&name).await {
            Ok(()) => {
                info!(table = %name, "deleted table");
                table.status.at_provider.table_status = Some(TableStatus::Deleting);
                Ok(())
            }
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(ProviderError::api(ERR_DELETE_TABLE, err)),
        }
    }
}
