//! The table capability set.
//!
//! [`TableApi`] is the only surface the table reconcilers talk to: the four
//! table lifecycle calls plus the three tagging calls, which address the
//! table by ARN rather than by name.

use std::fmt::Debug;

use async_trait::async_trait;
use rustack_dynamodb_model::DynamoDBError;
use rustack_dynamodb_model::types::{CreateTableInput, TableDescription, Tag, UpdateTableInput};

/// Result of a table API call.
pub type DynamoDBResult<T> = Result<T, DynamoDBError>;

/// Every table call the reconcilers make.
#[async_trait]
pub trait TableApi: Send + Sync + Debug {
    /// DescribeTable. A missing table is `ResourceNotFoundException`.
    async fn describe_table(&self, table: &str) -> DynamoDBResult<TableDescription>;
    /// CreateTable.
    async fn create_table(&self, input: &CreateTableInput) -> DynamoDBResult<TableDescription>;
    /// UpdateTable. Only one kind of change is accepted at a time and only
    /// while the table is `ACTIVE`.
    async fn update_table(&self, input: &UpdateTableInput) -> DynamoDBResult<TableDescription>;
    /// DeleteTable.
    async fn delete_table(&self, table: &str) -> DynamoDBResult<()>;

    /// ListTagsOfResource, all pages.
    async fn list_tags_of_resource(&self, arn: &str) -> DynamoDBResult<Vec<Tag>>;
    /// TagResource. Existing keys are overwritten.
    async fn tag_resource(&self, arn: &str, tags: &[Tag]) -> DynamoDBResult<()>;
    /// UntagResource.
    async fn untag_resource(&self, arn: &str, keys: &[String]) -> DynamoDBResult<()>;
}
