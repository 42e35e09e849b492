//! In-memory [`TableApi`] used by tests and by local runs without AWS.
//!
//! Tables go through the same status machine as in DynamoDB: `CREATING`,
//! `UPDATING` and `DELETING` last for a configurable number of DescribeTable
//! calls before settling, and UpdateTable or DeleteTable on a table that is
//! not `ACTIVE` fails with `ResourceInUseException`. Every call is recorded
//! and a one-shot fault can be injected per operation.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use rustack_dynamodb_model::types::{
    BillingMode, CreateTableInput, ProvisionedThroughput, SseDescription, SseSpecification,
    SseStatus, SseType, StreamSpecification, TableDescription, TableStatus, Tag, UpdateTableInput,
};
use rustack_dynamodb_model::{DynamoDBError, DynamoDBErrorCode, dynamodb_error};
use rustack_provider_core::Partition;
use tracing::{debug, info};
use typed_builder::TypedBuilder;

use crate::api::{DynamoDBResult, TableApi};

/// Account id reported in ARNs.
pub const DEFAULT_ACCOUNT_ID: &str = "000000000000";

/// Behavior switches of the in-memory store.
#[derive(Debug, Clone, TypedBuilder)]
pub struct MemoryTableOptions {
    /// Region reported in ARNs.
    #[builder(default = "us-east-1".to_owned(), setter(into))]
    pub region: String,
    /// Account reported in ARNs.
    #[builder(default = DEFAULT_ACCOUNT_ID.to_owned(), setter(into))]
    pub account_id: String,
    /// DescribeTable calls that still report a transitional status before
    /// it settles. Zero settles immediately.
    #[builder(default)]
    pub settle_after: u32,
    /// Tags the provider attaches to every new table.
    #[builder(default)]
    pub system_tags: Vec<Tag>,
}

impl Default for MemoryTableOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// One recorded provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    /// DynamoDB operation name, e.g. `UpdateTable`.
    pub operation: &'static str,
    /// Target table name or ARN.
    pub target: String,
}

#[derive(Debug, Clone)]
struct MemoryTable {
    description: TableDescription,
    tags: Vec<Tag>,
    /// Describes left before the transitional status settles.
    remaining: u32,
}

/// Table store backed by a `DashMap`.
#[derive(Debug, Default)]
pub struct MemoryTableApi {
    tables: DashMap<String, MemoryTable>,
    options: MemoryTableOptions,
    calls: Mutex<Vec<ApiCall>>,
    faults: DashMap<&'static str, DynamoDBError>,
}

impl MemoryTableApi {
    /// Create an empty store.
    #[must_use]
    pub fn new(options: MemoryTableOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// All calls made so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    /// Operation names of all calls made so far.
    #[must_use]
    pub fn operations(&self) -> Vec<&'static str> {
        self.calls.lock().iter().map(|c| c.operation).collect()
    }

    /// How many times `operation` was called.
    #[must_use]
    pub fn count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Forget the call log.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Fail the next call of `operation` with `err`.
    pub fn fail_next(&self, operation: &'static str, err: DynamoDBError) {
        self.faults.insert(operation, err);
    }

    /// Whether a table exists, in any status.
    #[must_use]
    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Current description of a table without recording a call or advancing
    /// its status.
    #[must_use]
    pub fn snapshot(&self, name: &str) -> Option<TableDescription> {
        self.tables.get(name).map(|t| t.description.clone())
    }

    /// Current tags of a table.
    #[must_use]
    pub fn tags(&self, name: &str) -> Vec<Tag> {
        self.tables
            .get(name)
            .map(|t| t.tags.clone())
            .unwrap_or_default()
    }

    /// Force a table into `status`, e.g. to simulate an out-of-band update.
    pub fn set_table_status(&self, name: &str, status: TableStatus) {
        if let Some(mut table) = self.tables.get_mut(name) {
            table.description.table_status = status;
            table.remaining = self.options.settle_after;
        }
    }

    /// Change a table behind the reconciler's back.
    pub fn modify(&self, name: &str, f: impl FnOnce(&mut TableDescription)) {
        if let Some(mut table) = self.tables.get_mut(name) {
            f(&mut table.description);
        }
    }

    fn enter(&self, operation: &'static str, target: &str) -> DynamoDBResult<()> {
        debug!(operation, target, "memory table api call");
        self.calls.lock().push(ApiCall {
            operation,
            target: target.to_owned(),
        });
        match self.faults.remove(operation) {
            Some((_, err)) => Err(err),
            None => Ok(()),
        }
    }

    fn table_arn(&self, name: &str) -> String {
        format!(
            "arn:{}:dynamodb:{}:{}:table/{name}",
            Partition::for_region(&self.options.region),
            self.options.region,
            self.options.account_id
        )
    }

    fn managed_key_arn(&self) -> String {
        format!(
            "arn:{}:kms:{}:{}:alias/aws/dynamodb",
            Partition::for_region(&self.options.region),
            self.options.region,
            self.options.account_id
        )
    }

    /// Status a transition starts in, or the settled one when transitions
    /// are instant.
    fn transition(&self, status: TableStatus) -> TableStatus {
        if self.options.settle_after == 0 {
            settled(status)
        } else {
            status
        }
    }

    fn sse_description(&self, sse: &SseSpecification) -> Option<SseDescription> {
        sse.enabled.then(|| SseDescription {
            status: Some(SseStatus::Enabled),
            sse_type: Some(SseType::Kms),
            kms_master_key_arn: Some(
                sse.kms_master_key_id
                    .clone()
                    .unwrap_or_else(|| self.managed_key_arn()),
            ),
        })
    }

    fn name_for_arn(&self, arn: &str) -> DynamoDBResult<String> {
        self.tables
            .iter()
            .find(|t| t.description.table_arn == arn)
            .map(|t| t.key().clone())
            .ok_or_else(|| {
                DynamoDBError::with_message(
                    DynamoDBErrorCode::ResourceNotFoundException,
                    format!("Requested resource not found: ResourceArn: {arn} not found"),
                )
            })
    }
}

fn settled(status: TableStatus) -> TableStatus {
    match status {
        TableStatus::Creating | TableStatus::Updating => TableStatus::Active,
        other => other,
    }
}

fn check_billing(
    mode: BillingMode,
    throughput: Option<&ProvisionedThroughput>,
) -> DynamoDBResult<()> {
    match (mode, throughput) {
        (BillingMode::Provisioned, None) => Err(dynamodb_error!(
            ValidationException,
            "One or more parameter values were invalid: ReadCapacityUnits and \
             WriteCapacityUnits must both be specified when BillingMode is PROVISIONED"
        )),
        (BillingMode::PayPerRequest, Some(_)) => Err(dynamodb_error!(
            ValidationException,
            "One or more parameter values were invalid: Neither ReadCapacityUnits nor \
             WriteCapacityUnits can be specified when BillingMode is PAY_PER_REQUEST"
        )),
        _ => Ok(()),
    }
}

fn reject_system_keys<'a>(mut keys: impl Iterator<Item = &'a str>) -> DynamoDBResult<()> {
    match keys.find(|k| k.starts_with("aws:")) {
        Some(key) => Err(dynamodb_error!(
            ValidationException,
            "User-defined tag keys cannot start with aws:, got {key}"
        )),
        None => Ok(()),
    }
}

fn stream_arn(table_arn: &str) -> String {
    format!(
        "{table_arn}/stream/{}",
        Utc::now().format("%Y-%m-%dT%H:%M:%S%.3f")
    )
}

#[async_trait]
impl TableApi for MemoryTableApi {
    async fn describe_table(&self, table: &str) -> DynamoDBResult<TableDescription> {
        self.enter("DescribeTable", table)?;
        let mut entry = self
            .tables
            .get_mut(table)
            .ok_or_else(|| DynamoDBError::resource_not_found(table))?;
        let status = entry.description.table_status;
        if matches!(
            status,
            TableStatus::Creating | TableStatus::Updating | TableStatus::Deleting
        ) {
            if entry.remaining > 0 {
                entry.remaining -= 1;
            } else if status == TableStatus::Deleting {
                drop(entry);
                self.tables.remove(table);
                return Err(DynamoDBError::resource_not_found(table));
            } else {
                entry.description.table_status = settled(status);
            }
        }
        Ok(entry.description.clone())
    }

    async fn create_table(&self, input: &CreateTableInput) -> DynamoDBResult<TableDescription> {
        self.enter("CreateTable", &input.table_name)?;
        if input.key_schema.is_empty() {
            return Err(dynamodb_error!(
                ValidationException,
                "1 validation error detected: Value null at 'keySchema' failed to satisfy \
                 constraint: Member must not be null"
            ));
        }
        let billing_mode = input.billing_mode.unwrap_or(BillingMode::Provisioned);
        check_billing(billing_mode, input.provisioned_throughput.as_ref())?;
        reject_system_keys(input.tags.iter().map(|t| t.key.as_str()))?;

        let Entry::Vacant(slot) = self.tables.entry(input.table_name.clone()) else {
            return Err(DynamoDBError::resource_in_use(format!(
                "Table already exists: {}",
                input.table_name
            )));
        };

        let table_arn = self.table_arn(&input.table_name);
        let stream = input.stream_specification.filter(|s| s.stream_enabled);
        let description = TableDescription {
            table_name: input.table_name.clone(),
            table_status: self.transition(TableStatus::Creating),
            key_schema: input.key_schema.clone(),
            attribute_definitions: input.attribute_definitions.clone(),
            billing_mode: input.billing_mode,
            provisioned_throughput: input.provisioned_throughput,
            stream_specification: stream,
            latest_stream_arn: stream.map(|_| stream_arn(&table_arn)),
            sse_description: input
                .sse_specification
                .as_ref()
                .and_then(|sse| self.sse_description(sse)),
            deletion_protection_enabled: input.deletion_protection_enabled.unwrap_or(false),
            creation_date_time: Some(Utc::now()),
            table_arn,
        };
        let mut tags = self.options.system_tags.clone();
        tags.extend(input.tags.iter().cloned());

        info!(table = %input.table_name, "memory table created");
        slot.insert(MemoryTable {
            description: description.clone(),
            tags,
            remaining: self.options.settle_after,
        });
        Ok(description)
    }

    async fn update_table(&self, input: &UpdateTableInput) -> DynamoDBResult<TableDescription> {
        self.enter("UpdateTable", &input.table_name)?;
        if input.is_empty() {
            return Err(dynamodb_error!(
                ValidationException,
                "At least one of ProvisionedThroughput, BillingMode, UpdateStreamEnabled, \
                 GlobalSecondaryIndexUpdates, SSESpecification or DeletionProtectionEnabled \
                 must be specified"
            ));
        }
        let mut entry = self
            .tables
            .get_mut(&input.table_name)
            .ok_or_else(|| DynamoDBError::resource_not_found(&input.table_name))?;
        if entry.description.table_status != TableStatus::Active {
            return Err(DynamoDBError::resource_in_use(format!(
                "Attempt to change a resource which is still in use: Table is being {}: {}",
                entry.description.table_status, input.table_name
            )));
        }

        let description = &mut entry.description;
        let mut changes_capacity = false;

        if input.billing_mode.is_some() || input.provisioned_throughput.is_some() {
            let mode = input
                .billing_mode
                .unwrap_or_else(|| description.effective_billing_mode());
            let throughput = match mode {
                BillingMode::Provisioned => input
                    .provisioned_throughput
                    .or(description.provisioned_throughput),
                BillingMode::PayPerRequest => input.provisioned_throughput,
            };
            check_billing(mode, throughput.as_ref())?;
            if input.billing_mode.is_none()
                && throughput == description.provisioned_throughput
            {
                return Err(dynamodb_error!(
                    ValidationException,
                    "The provisioned throughput for the table will not change"
                ));
            }
            description.billing_mode = Some(mode);
            description.provisioned_throughput = throughput;
            changes_capacity = true;
        }

        if let Some(stream) = input.stream_specification {
            let current = description.effective_stream();
            match (current.stream_enabled, stream.stream_enabled) {
                (true, true) => {
                    return Err(dynamodb_error!(
                        ValidationException,
                        "Table already has an enabled stream: {}",
                        input.table_name
                    ));
                }
                (false, false) => {
                    return Err(dynamodb_error!(
                        ValidationException,
                        "Table already has streams disabled: {}",
                        input.table_name
                    ));
                }
                (false, true) => {
                    description.stream_specification = Some(stream);
                    description.latest_stream_arn = Some(stream_arn(&description.table_arn));
                }
                (true, false) => {
                    description.stream_specification = Some(StreamSpecification::default());
                }
            }
            changes_capacity = true;
        }

        if let Some(sse) = &input.sse_specification {
            description.sse_description = self.sse_description(sse);
            changes_capacity = true;
        }

        if let Some(protect) = input.deletion_protection_enabled {
            description.deletion_protection_enabled = protect;
        }

        if changes_capacity {
            description.table_status = self.transition(TableStatus::Updating);
            entry.remaining = self.options.settle_after;
        }
        Ok(entry.description.clone())
    }

    async fn delete_table(&self, table: &str) -> DynamoDBResult<()> {
        self.enter("DeleteTable", table)?;
        let mut entry = self
            .tables
            .get_mut(table)
            .ok_or_else(|| DynamoDBError::resource_not_found(table))?;
        if entry.description.deletion_protection_enabled {
            return Err(dynamodb_error!(
                ValidationException,
                "Resource cannot be deleted as it is currently protected against deletion. \
                 Disable deletion protection first."
            ));
        }
        if entry.description.table_status != TableStatus::Active {
            return Err(DynamoDBError::resource_in_use(format!(
                "Attempt to change a resource which is still in use: Table is being {}: {table}",
                entry.description.table_status
            )));
        }
        if self.options.settle_after == 0 {
            drop(entry);
            self.tables.remove(table);
        } else {
            entry.description.table_status = TableStatus::Deleting;
            entry.remaining = self.options.settle_after;
        }
        info!(table, "memory table deleted");
        Ok(())
    }

    async fn list_tags_of_resource(&self, arn: &str) -> DynamoDBResult<Vec<Tag>> {
        self.enter("ListTagsOfResource", arn)?;
        let name = self.name_for_arn(arn)?;
        Ok(self.tags(&name))
    }

    async fn tag_resource(&self, arn: &str, tags: &[Tag]) -> DynamoDBResult<()> {
        self.enter("TagResource", arn)?;
        reject_system_keys(tags.iter().map(|t| t.key.as_str()))?;
        let name = self.name_for_arn(arn)?;
        if let Some(mut table) = self.tables.get_mut(&name) {
            for tag in tags {
                match table.tags.iter_mut().find(|t| t.key == tag.key) {
                    Some(existing) => existing.value.clone_from(&tag.value),
                    None => table.tags.push(tag.clone()),
                }
            }
        }
        Ok(())
    }

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> DynamoDBResult<()> {
        self.enter("UntagResource", arn)?;
        reject_system_keys(keys.iter().map(String::as_str))?;
        let name = self.name_for_arn(arn)?;
        if let Some(mut table) = self.tables.get_mut(&name) {
            table.tags.retain(|t| !keys.contains(&t.key));
        }
        Ok(())
    }
}
