//! [`TableApi`] backed by the AWS SDK for Rust.
//!
//! SDK failures become [`DynamoDBError`] values carrying the service error
//! code, so `ResourceNotFoundException` and `ResourceInUseException` mean the
//! same thing here as they do against the in-memory store.

mod convert;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use rustack_dynamodb_model::types::{CreateTableInput, TableDescription, Tag, UpdateTableInput};
use rustack_dynamodb_model::{DynamoDBError, DynamoDBErrorCode};
use rustack_provider_core::{ConnectSettings, ProviderResult, ResolvedCredentials};
use tracing::debug;

use crate::api::{DynamoDBResult, TableApi};
use crate::config::DynamoDBProviderConfig;
use crate::connector::TableApiFactory;

const CREDENTIALS_PROVIDER_NAME: &str = "provider-config";

/// Table API over a real (or DynamoDB-compatible) endpoint.
#[derive(Debug, Clone)]
pub struct AwsTableApi {
    client: Client,
}

impl AwsTableApi {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client for the given region, credentials and endpoint.
    pub async fn connect(settings: &ConnectSettings, config: &DynamoDBProviderConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));
        if let ResolvedCredentials::Static(creds) = &settings.credentials {
            loader = loader.credentials_provider(Credentials::new(
                creds.access_key_id.clone(),
                creds.secret_access_key.clone(),
                creds.session_token.clone(),
                None,
                CREDENTIALS_PROVIDER_NAME,
            ));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
        if let Some(endpoint) = settings.endpoint.as_ref().or(config.endpoint_url.as_ref()) {
            builder = builder.endpoint_url(endpoint);
        }
        debug!(region = %settings.region, endpoint = ?settings.endpoint, "built DynamoDB client");

        Self::new(Client::from_conf(builder.build()))
    }
}

/// Builds an [`AwsTableApi`] per connect.
#[derive(Debug, Clone, Default)]
pub struct AwsTableApiFactory {
    config: DynamoDBProviderConfig,
}

impl AwsTableApiFactory {
    /// Create a factory with shared adapter settings.
    #[must_use]
    pub fn new(config: DynamoDBProviderConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TableApiFactory for AwsTableApiFactory {
    async fn build(&self, settings: &ConnectSettings) -> ProviderResult<Arc<dyn TableApi>> {
        Ok(Arc::new(AwsTableApi::connect(settings, &self.config).await))
    }
}

/// Turn an SDK failure into a [`DynamoDBError`] keeping code and status.
///
/// Codes the model does not know are reported as internal errors with the
/// code in the message.
fn map_sdk_error<E>(err: SdkError<E, HttpResponse>) -> DynamoDBError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status = err
        .raw_response()
        .and_then(|r| http::StatusCode::from_u16(r.status().as_u16()).ok());
    let message = err
        .message()
        .map_or_else(|| DisplayErrorContext(&err).to_string(), str::to_owned);
    let error = match (err.code(), status) {
        (Some(code), _) => match DynamoDBErrorCode::from_code(code) {
            Some(known) => DynamoDBError::with_message(known, message),
            None => DynamoDBError::internal_error(format!("{code}: {message}")),
        },
        (None, Some(http::StatusCode::NOT_FOUND)) => {
            DynamoDBError::with_message(DynamoDBErrorCode::ResourceNotFoundException, message)
        }
        (None, _) => DynamoDBError::internal_error(message),
    };
    match status {
        Some(status) => error.with_status(status),
        None => error,
    }
}

fn missing_description(operation: &str, table: &str) -> DynamoDBError {
    DynamoDBError::internal_error(format!("{operation} returned no description for {table}"))
}

#[async_trait]
impl TableApi for AwsTableApi {
    async fn describe_table(&self, table: &str) -> DynamoDBResult<TableDescription> {
        let out = self
            .client
            .describe_table()
            .table_name(table)
            .send()
            .await
            .map_err(map_sdk_error)?;
        out.table()
            .map(convert::from_table)
            .ok_or_else(|| missing_description("DescribeTable", table))?
    }

    async fn create_table(&self, input: &CreateTableInput) -> DynamoDBResult<TableDescription> {
        let tags = convert::to_tags(&input.tags)?;
        let out = self
            .client
            .create_table()
            .table_name(&input.table_name)
            .set_attribute_definitions(Some(convert::to_attribute_definitions(
                &input.attribute_definitions,
            )?))
            .set_key_schema(Some(convert::to_key_schema(&input.key_schema)?))
            .set_billing_mode(convert::to_billing_mode(input.billing_mode))
            .set_provisioned_throughput(convert::to_throughput(
                input.provisioned_throughput.as_ref(),
            )?)
            .set_stream_specification(convert::to_stream(input.stream_specification.as_ref())?)
            .set_sse_specification(convert::to_sse(input.sse_specification.as_ref()))
            .set_tags((!tags.is_empty()).then_some(tags))
            .set_deletion_protection_enabled(input.deletion_protection_enabled)
            .send()
            .await
            .map_err(map_sdk_error)?;
        out.table_description()
            .map(convert::from_table)
            .ok_or_else(|| missing_description("CreateTable", &input.table_name))?
    }

    async fn update_table(&self, input: &UpdateTableInput) -> DynamoDBResult<TableDescription> {
        let out = self
            .client
            .update_table()
            .table_name(&input.table_name)
            .set_billing_mode(convert::to_billing_mode(input.billing_mode))
            .set_provisioned_throughput(convert::to_throughput(
                input.provisioned_throughput.as_ref(),
            )?)
            .set_stream_specification(convert::to_stream(input.stream_specification.as_ref())?)
            .set_sse_specification(convert::to_sse(input.sse_specification.as_ref()))
            .set_deletion_protection_enabled(input.deletion_protection_enabled)
            .send()
            .await
            .map_err(map_sdk_error)?;
        out.table_description()
            .map(convert::from_table)
            .ok_or_else(|| missing_description("UpdateTable", &input.table_name))?
    }

    async fn delete_table(&self, table: &str) -> DynamoDBResult<()> {
        self.client
            .delete_table()
            .table_name(table)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn list_tags_of_resource(&self, arn: &str) -> DynamoDBResult<Vec<Tag>> {
        let mut tags = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let out = self
                .client
                .list_tags_of_resource()
                .resource_arn(arn)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(map_sdk_error)?;
            tags.extend(convert::from_tags(out.tags()));
            match out.next_token() {
                Some(token) => next_token = Some(token.to_owned()),
                None => return Ok(tags),
            }
        }
    }

    async fn tag_resource(&self, arn: &str, tags: &[Tag]) -> DynamoDBResult<()> {
        self.client
            .tag_resource()
            .resource_arn(arn)
            .set_tags(Some(convert::to_tags(tags)?))
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> DynamoDBResult<()> {
        self.client
            .untag_resource()
            .resource_arn(arn)
            .set_tag_keys(Some(keys.to_vec()))
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
    use rustack_provider_core::AwsCredentials;

    use super::*;

    fn settings() -> ConnectSettings {
        ConnectSettings {
            region: "eu-west-1".into(),
            credentials: ResolvedCredentials::Static(AwsCredentials {
                access_key_id: "test".into(),
                secret_access_key: "test".into(),
                session_token: None,
            }),
            endpoint: Some("http://localhost:4566".into()),
        }
    }

    #[test]
    fn test_should_map_construction_failure_to_internal_error() {
        let err: SdkError<DescribeTableError, HttpResponse> =
            SdkError::construction_failure("missing table name");
        let mapped = map_sdk_error(err);
        assert_eq!(mapped.code, DynamoDBErrorCode::InternalServerError);
        assert!(!mapped.is_not_found());
    }

    #[tokio::test]
    async fn test_should_build_client_for_region() {
        let api = AwsTableApi::connect(&settings(), &DynamoDBProviderConfig::default()).await;
        assert_eq!(
            api.client.config().region().map(ToString::to_string).as_deref(),
            Some("eu-west-1")
        );
    }

    #[tokio::test]
    #[ignore = "requires a DynamoDB-compatible endpoint at localhost:4566"]
    async fn test_should_report_missing_table_as_not_found() {
        let api = AwsTableApi::connect(&settings(), &DynamoDBProviderConfig::default()).await;
        let err = api.describe_table("acme-missing-table").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
