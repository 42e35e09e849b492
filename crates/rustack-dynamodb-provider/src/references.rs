//! Reference resolution for tables.
//!
//! The only referencing field is the KMS key of the encryption block,
//! resolved to the key's ARN.

use async_trait::async_trait;
use rustack_dynamodb_model::Table;
use rustack_dynamodb_model::table::KIND_KEY;
use rustack_provider_core::reference;
use rustack_provider_core::{ProviderResult, ReferenceResolver, ReferenceSource, ResolutionRequest};

/// Resolves every referencing field of a [`Table`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TableReferenceResolver;

#[async_trait]
impl ReferenceResolver<Table> for TableReferenceResolver {
    async fn resolve_references(
        &self,
        source: &dyn ReferenceSource,
        table: &mut Table,
    ) -> ProviderResult<()> {
        let Some(sse) = table.spec.for_provider.sse_specification.as_mut() else {
            return Ok(());
        };
        let resp = reference::resolve(
            source,
            ResolutionRequest {
                field: "spec.forProvider.sseSpecification.kmsMasterKeyId",
                kind: KIND_KEY,
                current_value: sse.kms_master_key_id.as_deref(),
                reference: sse.kms_master_key_id_ref.as_ref(),
                selector: sse.kms_master_key_id_selector.as_ref(),
                extract: reference::arn,
            },
        )
        .await?;
        if resp.resolved_value.is_some() {
            sse.kms_master_key_id = resp.resolved_value;
        }
        if resp.resolved_reference.is_some() {
            sse.kms_master_key_id_ref = resp.resolved_reference;
        }
        Ok(())
    }
}
