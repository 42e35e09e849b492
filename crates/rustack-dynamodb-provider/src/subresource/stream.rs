//! DynamoDB Streams.
//!
//! A stream's view type cannot be changed in place: the stream has to be
//! disabled and enabled again, and each step is its own UpdateTable. The
//! first tick disables; the next one sees a disabled stream and enables it
//! with the new view type.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_dynamodb_model::Table;
use rustack_dynamodb_model::types::{StreamSpecification, UpdateTableInput};
use rustack_provider_core::late_init::late_init;
use rustack_provider_core::{ProviderError, ProviderResult, ResourceStatus, Subresource};
use tracing::debug;

use super::{describe, params, params_mut, table_name, update};
use crate::api::TableApi;

/// Reconciles `streamSpecification`.
#[derive(Debug)]
pub struct StreamClient {
    api: Arc<dyn TableApi>,
}

impl StreamClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn TableApi>) -> Self {
        Self { api }
    }
}

fn stream_equal(desired: &StreamSpecification, observed: &StreamSpecification) -> bool {
    match (desired.stream_enabled, observed.stream_enabled) {
        (false, false) => true,
        (true, true) => desired.stream_view_type == observed.stream_view_type,
        _ => false,
    }
}

#[async_trait]
impl Subresource<Table> for StreamClient {
    fn name(&self) -> &'static str {
        "stream"
    }

    async fn observe(&self, table: &Table) -> ProviderResult<ResourceStatus> {
        let Some(desired) = &params(table).stream_specification else {
            return Ok(ResourceStatus::Updated);
        };
        let observed = describe(self.api.as_ref(), table).await?.effective_stream();
        Ok(if stream_equal(desired, &observed) {
            ResourceStatus::Updated
        } else {
            ResourceStatus::NeedsUpdate
        })
    }

    async fn create_or_update(&self, table: &Table) -> ProviderResult<()> {
        let Some(desired) = params(table).stream_specification else {
            return Ok(());
        };
        if desired.stream_enabled && desired.stream_view_type.is_none() {
            return Err(ProviderError::configuration(
                "streamViewType is required when the stream is enabled",
            ));
        }
        let observed = describe(self.api.as_ref(), table).await?.effective_stream();
        if stream_equal(&desired, &observed) {
            return Ok(());
        }

        let next = if desired.stream_enabled && observed.stream_enabled {
            debug!(table = table_name(table), "disabling stream to change its view type");
            StreamSpecification::default()
        } else {
            desired
        };
        let input = UpdateTableInput {
            stream_specification: Some(next),
            ..UpdateTableInput::new(table_name(table))
        };
        update(self.api.as_ref(), &input).await
    }

    async fn late_initialize(&self, table: &mut Table) -> ProviderResult<()> {
        let observed = describe(self.api.as_ref(), table).await?.effective_stream();
        late_init(&mut params_mut(table).stream_specification, Some(&observed));
        Ok(())
    }

    fn subresource_exists(&self, table: &Table) -> bool {
        params(table).stream_specification.is_some()
    }
}
