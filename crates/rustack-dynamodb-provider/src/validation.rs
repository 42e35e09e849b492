//! Parameter checks that DynamoDB would otherwise reject on CreateTable or
//! UpdateTable. Failures are configuration errors and never retried.

use rustack_dynamodb_model::TableParameters;
use rustack_dynamodb_model::types::{BillingMode, KeyType, ProvisionedThroughput, Tag};
use rustack_provider_core::{ProviderError, ProviderResult};

const MAX_TAG_KEY_LEN: usize = 128;
const MAX_TAG_VALUE_LEN: usize = 256;

/// Table names are 3-255 characters of `[a-zA-Z0-9_.-]`.
pub fn validate_table_name(name: &str) -> ProviderResult<()> {
    if !(3..=255).contains(&name.len()) {
        return Err(ProviderError::configuration(format!(
            "table name {name:?} must be between 3 and 255 characters"
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(ProviderError::configuration(format!(
            "table name {name:?} contains invalid character {c:?}"
        )));
    }
    Ok(())
}

/// One `HASH` key first, at most one `RANGE` key, every key attribute
/// defined and no unused definitions.
pub fn validate_key_schema(params: &TableParameters) -> ProviderResult<()> {
    let schema = &params.key_schema;
    match schema.as_slice() {
        [hash] | [hash, _] if hash.key_type == KeyType::Hash => {}
        [] => return Err(ProviderError::configuration("key schema must not be empty")),
        _ => {
            return Err(ProviderError::configuration(
                "key schema must be one HASH key optionally followed by one RANGE key",
            ));
        }
    }
    if let [_, range] = schema.as_slice() {
        if range.key_type != KeyType::Range {
            return Err(ProviderError::configuration(
                "second key schema element must be a RANGE key",
            ));
        }
    }

    for key in schema {
        if !params
            .attribute_definitions
            .iter()
            .any(|d| d.attribute_name == key.attribute_name)
        {
            return Err(ProviderError::configuration(format!(
                "key attribute {} has no attribute definition",
                key.attribute_name
            )));
        }
    }
    if let Some(unused) = params
        .attribute_definitions
        .iter()
        .find(|d| !schema.iter().any(|k| k.attribute_name == d.attribute_name))
    {
        return Err(ProviderError::configuration(format!(
            "attribute definition {} is not used by the key schema",
            unused.attribute_name
        )));
    }
    Ok(())
}

/// Provisioned tables need capacity; on-demand tables must not have any.
pub fn validate_billing(
    mode: Option<BillingMode>,
    throughput: Option<&ProvisionedThroughput>,
) -> ProviderResult<()> {
    match (mode.unwrap_or(BillingMode::Provisioned), throughput) {
        (BillingMode::Provisioned, None) => Err(ProviderError::configuration(
            "provisionedThroughput is required when billingMode is PROVISIONED",
        )),
        (BillingMode::Provisioned, Some(t))
            if t.read_capacity_units < 1 || t.write_capacity_units < 1 =>
        {
            Err(ProviderError::configuration(
                "read and write capacity units must be at least 1",
            ))
        }
        (BillingMode::PayPerRequest, Some(_)) => Err(ProviderError::configuration(
            "provisionedThroughput must not be set when billingMode is PAY_PER_REQUEST",
        )),
        _ => Ok(()),
    }
}

/// User tags: no `aws:` keys and within the provider's length limits.
pub fn validate_tags(tags: &[Tag]) -> ProviderResult<()> {
    for tag in tags {
        if tag.is_system() {
            return Err(ProviderError::configuration(format!(
                "tag key {} uses the reserved aws: prefix",
                tag.key
            )));
        }
        if tag.key.is_empty() || tag.key.len() > MAX_TAG_KEY_LEN {
            return Err(ProviderError::configuration(format!(
                "tag key {:?} must be between 1 and {MAX_TAG_KEY_LEN} characters",
                tag.key
            )));
        }
        if tag.value.len() > MAX_TAG_VALUE_LEN {
            return Err(ProviderError::configuration(format!(
                "tag {} value exceeds {MAX_TAG_VALUE_LEN} characters",
                tag.key
            )));
        }
    }
    Ok(())
}

/// Everything CreateTable needs.
pub fn validate_table(name: &str, params: &TableParameters) -> ProviderResult<()> {
    validate_table_name(name)?;
    validate_key_schema(params)?;
    validate_billing(params.billing_mode, params.provisioned_throughput.as_ref())?;
    if let Some(stream) = &params.stream_specification {
        if stream.stream_enabled && stream.stream_view_type.is_none() {
            return Err(ProviderError::configuration(
                "streamViewType is required when the stream is enabled",
            ));
        }
    }
    validate_tags(params.tags.as_deref().unwrap_or_default())
}
