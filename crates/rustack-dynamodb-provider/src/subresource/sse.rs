//! Server-side encryption.
//!
//! DynamoDB reports the key as an ARN while the manifest may name it by id,
//! ARN or alias, so a key matches when it equals the ARN or is its last path
//! segment.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_dynamodb_model::Table;
use rustack_dynamodb_model::table::SseSpecificationSpec;
use rustack_dynamodb_model::types::{SseDescription, SseType, UpdateTableInput};
use rustack_provider_core::late_init::late_init_string;
use rustack_provider_core::{ProviderResult, ResourceStatus, Subresource};

use super::{describe, params, params_mut, table_name, update};
use crate::api::TableApi;

/// Reconciles `sseSpecification`.
#[derive(Debug)]
pub struct SseClient {
    api: Arc<dyn TableApi>,
}

impl SseClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn TableApi>) -> Self {
        Self { api }
    }
}

fn key_matches(desired: &str, observed_arn: &str) -> bool {
    desired == observed_arn
        || observed_arn
            .rsplit_once('/')
            .is_some_and(|(_, id)| id == desired.rsplit('/').next().unwrap_or(desired))
}

fn sse_equal(desired: &SseSpecificationSpec, observed: Option<&SseDescription>) -> bool {
    let observed_kms = observed.is_some_and(SseDescription::is_kms);
    if desired.enabled != observed_kms {
        return false;
    }
    match (
        desired.kms_master_key_id.as_deref(),
        observed.and_then(|o| o.kms_master_key_arn.as_deref()),
    ) {
        (Some(want), Some(have)) if desired.enabled => key_matches(want, have),
        _ => true,
    }
}

#[async_trait]
impl Subresource<Table> for SseClient {
    fn name(&self) -> &'static str {
        "sse"
    }

    async fn observe(&self, table: &Table) -> ProviderResult<ResourceStatus> {
        let Some(desired) = &params(table).sse_specification else {
            return Ok(ResourceStatus::Updated);
        };
        let observed = describe(self.api.as_ref(), table).await?;
        Ok(if sse_equal(desired, observed.sse_description.as_ref()) {
            ResourceStatus::Updated
        } else {
            ResourceStatus::NeedsUpdate
        })
    }

    async fn create_or_update(&self, table: &Table) -> ProviderResult<()> {
        let Some(desired) = &params(table).sse_specification else {
            return Ok(());
        };
        let input = UpdateTableInput {
            sse_specification: Some(desired.to_specification()),
            ..UpdateTableInput::new(table_name(table))
        };
        update(self.api.as_ref(), &input).await
    }

    async fn late_initialize(&self, table: &mut Table) -> ProviderResult<()> {
        let observed = describe(self.api.as_ref(), table).await?.sse_description;
        let kms = observed.as_ref().filter(|o| o.is_kms());
        let desired = params_mut(table)
            .sse_specification
            .get_or_insert_with(|| SseSpecificationSpec {
                enabled: kms.is_some(),
                ..SseSpecificationSpec::default()
            });
        if desired.enabled {
            if let Some(kms) = kms {
                if desired.sse_type.is_none() {
                    desired.sse_type = Some(SseType::Kms);
                }
                late_init_string(
                    &mut desired.kms_master_key_id,
                    kms.kms_master_key_arn.as_deref(),
                );
            }
        }
        Ok(())
    }

    fn subresource_exists(&self, table: &Table) -> bool {
        params(table).sse_specification.is_some()
    }
}
