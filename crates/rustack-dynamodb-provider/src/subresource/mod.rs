//! The five table sub-resources.
//!
//! Billing, stream, encryption and deletion protection all change through
//! UpdateTable, which DynamoDB accepts only for one kind of change at a time
//! and only on an `ACTIVE` table; the engine therefore converges one of them
//! per tick. Tags go through the tagging API and are keyed by table ARN.

mod billing;
mod deletion_protection;
mod sse;
mod stream;
mod tags;

use std::sync::Arc;

use rustack_dynamodb_model::types::{TableDescription, UpdateTableInput};
use rustack_dynamodb_model::{Table, TableParameters};
use rustack_provider_core::{ProviderError, ProviderResult, SubresourceSet};

pub use self::billing::BillingClient;
pub use self::deletion_protection::DeletionProtectionClient;
pub use self::sse::SseClient;
pub use self::stream::StreamClient;
pub use self::tags::TagsClient;
use crate::api::TableApi;

const ERR_DESCRIBE: &str = "cannot describe table";
const ERR_UPDATE: &str = "cannot update table";

/// Build the ordered sub-resource set of a table.
#[must_use]
pub fn table_subresources(api: &Arc<dyn TableApi>) -> SubresourceSet<Table> {
    SubresourceSet::new(vec![
        Box::new(BillingClient::new(Arc::clone(api))),
        Box::new(StreamClient::new(Arc::clone(api))),
        Box::new(SseClient::new(Arc::clone(api))),
        Box::new(DeletionProtectionClient::new(Arc::clone(api))),
        Box::new(TagsClient::new(Arc::clone(api))),
    ])
}

/// Provider-side name of the table.
pub(crate) fn table_name(table: &Table) -> &str {
    table.metadata.external_name()
}

pub(crate) fn params(table: &Table) -> &TableParameters {
    &table.spec.for_provider
}

pub(crate) fn params_mut(table: &mut Table) -> &mut TableParameters {
    &mut table.spec.for_provider
}

pub(crate) async fn describe(
    api: &dyn TableApi,
    table: &Table,
) -> ProviderResult<TableDescription> {
    api.describe_table(table_name(table))
        .await
        .map_err(|e| ProviderError::api(ERR_DESCRIBE, e))
}

/// Send an UpdateTable unless it changes nothing.
pub(crate) async fn update(api: &dyn TableApi, input: &UpdateTableInput) -> ProviderResult<()> {
    if input.is_empty() {
        return Ok(());
    }
    api.update_table(input)
        .await
        .map_err(|e| ProviderError::api(ERR_UPDATE, e))?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by the sub-resource tests.

    use std::sync::Arc;

    use rustack_dynamodb_model::types::{
        AttributeDefinition, BillingMode, CreateTableInput, KeySchemaElement, KeyType,
        ScalarAttributeType,
    };
    use rustack_dynamodb_model::{Table, TableParameters};
    use rustack_provider_core::ObjectMeta;

    use crate::api::TableApi;
    use crate::memory::{MemoryTableApi, MemoryTableOptions};

    pub const TABLE: &str = "orders";

    pub fn key_schema() -> Vec<KeySchemaElement> {
        vec![KeySchemaElement {
            attribute_name: "pk".into(),
            key_type: KeyType::Hash,
        }]
    }

    pub fn attribute_definitions() -> Vec<AttributeDefinition> {
        vec![AttributeDefinition {
            attribute_name: "pk".into(),
            attribute_type: ScalarAttributeType::S,
        }]
    }

    pub fn table(params: TableParameters) -> Table {
        let mut table = Table::new(
            ObjectMeta::named(TABLE),
            TableParameters {
                region: "us-east-1".into(),
                key_schema: key_schema(),
                attribute_definitions: attribute_definitions(),
                ..params
            },
        );
        table.metadata.set_external_name(TABLE);
        table
    }

    /// A store holding an active on-demand `orders` table.
    pub async fn store_with(
        options: MemoryTableOptions,
    ) -> (Arc<MemoryTableApi>, Arc<dyn TableApi>) {
        let store = Arc::new(MemoryTableApi::new(options));
        store
            .create_table(&CreateTableInput {
                table_name: TABLE.to_owned(),
                key_schema: key_schema(),
                attribute_definitions: attribute_definitions(),
                billing_mode: Some(BillingMode::PayPerRequest),
                ..CreateTableInput::default()
            })
            .await
            .unwrap();
        store.clear_calls();
        let api: Arc<dyn TableApi> = store.clone();
        (store, api)
    }

    pub async fn store() -> (Arc<MemoryTableApi>, Arc<dyn TableApi>) {
        store_with(MemoryTableOptions::default()).await
    }
}
