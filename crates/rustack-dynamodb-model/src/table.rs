//! The `Table` managed resource.
//!
//! `TableParameters` is the user-authored `spec.forProvider` record. The
//! encryption block is the only one with a cross-resource reference, so it
//! gets a `*Spec` wrapper carrying the KMS key next to its `Ref` and
//! `Selector`.

use rustack_provider_core::reference::{Reference, Selector};
use rustack_provider_core::{AtProvider, ForProvider, ManagedResource};
use serde::{Deserialize, Serialize};

use crate::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, ProvisionedThroughput, SseSpecification,
    SseType, StreamSpecification, TableStatus, Tag,
};

/// Kind name of tables.
pub const KIND_TABLE: &str = "Table";
/// Kind name of KMS keys that encryption may reference.
pub const KIND_KEY: &str = "Key";

/// A table managed resource.
pub type Table = ManagedResource<TableParameters, TableObservation>;

/// Desired table state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableParameters {
    /// Region the table lives in.
    pub region: String,
    /// Key attribute definitions. Immutable after creation.
    #[serde(default)]
    pub attribute_definitions: Vec<AttributeDefinition>,
    /// Key schema. Immutable after creation.
    #[serde(default)]
    pub key_schema: Vec<KeySchemaElement>,
    /// Billing mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_mode: Option<BillingMode>,
    /// Capacity of a provisioned table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_throughput: Option<ProvisionedThroughput>,
    /// Stream settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_specification: Option<StreamSpecification>,
    /// Encryption settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sse_specification: Option<SseSpecificationSpec>,
    /// User tags. Unset means "no user tags".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    /// Deletion protection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_protection_enabled: Option<bool>,
}

impl ForProvider for TableParameters {
    const KIND: &'static str = KIND_TABLE;
}

/// Encryption block with a resolvable KMS key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SseSpecificationSpec {
    /// `true` selects a KMS key; `false` the AWS owned key.
    pub enabled: bool,
    /// Encryption type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sse_type: Option<SseType>,
    /// KMS key ARN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_master_key_id: Option<String>,
    /// Key to resolve `kmsMasterKeyId` from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_master_key_id_ref: Option<Reference>,
    /// Selector to resolve `kmsMasterKeyId` from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_master_key_id_selector: Option<Selector>,
}

impl SseSpecificationSpec {
    /// The provider shape, without the reference fields.
    #[must_use]
    pub fn to_specification(&self) -> SseSpecification {
        SseSpecification {
            enabled: self.enabled,
            sse_type: self.enabled.then_some(self.sse_type.unwrap_or(SseType::Kms)),
            kms_master_key_id: self.kms_master_key_id.clone(),
        }
    }
}

/// Last observation of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableObservation {
    /// Table ARN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    /// Lifecycle status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_status: Option<TableStatus>,
    /// ARN of the current stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_arn: Option<String>,
}

impl AtProvider for TableObservation {
    fn arn(&self) -> Option<&str> {
        self.arn.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use rustack_provider_core::{Managed, ObjectMeta};

    use super::*;
    use crate::types::{KeyType, ScalarAttributeType};

    #[test]
    fn test_should_parse_table_manifest() {
        let json = r#"{
            "metadata": {"name": "orders"},
            "spec": {
                "forProvider": {
                    "region": "eu-west-1",
                    "attributeDefinitions": [{"attributeName": "pk", "attributeType": "S"}],
                    "keySchema": [{"attributeName": "pk", "keyType": "HASH"}],
                    "billingMode": "PAY_PER_REQUEST",
                    "sseSpecification": {"enabled": true, "kmsMasterKeyIdRef": {"name": "table-key"}},
                    "tags": [{"key": "team", "value": "orders"}]
                }
            }
        }"#;
        let table: Table = serde_json::from_str(json).unwrap();
        let params = &table.spec.for_provider;
        assert_eq!(table.kind(), KIND_TABLE);
        assert_eq!(params.region, "eu-west-1");
        assert_eq!(params.key_schema[0].key_type, KeyType::Hash);
        assert_eq!(
            params.attribute_definitions[0].attribute_type,
            ScalarAttributeType::S
        );
        assert_eq!(params.billing_mode, Some(BillingMode::PayPerRequest));
        assert_eq!(
            params.sse_specification.as_ref().unwrap().kms_master_key_id_ref,
            Some(Reference::new("table-key"))
        );
        assert!(table.status.at_provider.arn.is_none());
    }

    #[test]
    fn test_should_default_enabled_sse_to_kms() {
        let spec = SseSpecificationSpec {
            enabled: true,
            ..SseSpecificationSpec::default()
        };
        assert_eq!(spec.to_specification().sse_type, Some(SseType::Kms));
        assert_eq!(SseSpecificationSpec::default().to_specification().sse_type, None);
    }

    #[test]
    fn test_should_expose_arn_to_references() {
        let mut table = Table::new(ObjectMeta::named("orders"), TableParameters::default());
        table.status.at_provider.arn =
            Some("arn:aws:dynamodb:us-east-1:000000000000:table/orders".into());
        let referenced = table.to_referenced();
        assert_eq!(referenced.kind, KIND_TABLE);
        assert_eq!(
            referenced.arn.as_deref(),
            Some("arn:aws:dynamodb:us-east-1:000000000000:table/orders")
        );
    }
}
