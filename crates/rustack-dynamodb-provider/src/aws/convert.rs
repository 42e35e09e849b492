//! Conversions between the table model and `aws-sdk-dynamodb` shapes.
//!
//! Enums cross the boundary through their wire strings, and a wire string
//! the model does not know is an error.

use std::str::FromStr;

use aws_sdk_dynamodb::error::BuildError;
use aws_sdk_dynamodb::primitives::DateTime as SdkDateTime;
use aws_sdk_dynamodb::types as sdk;
use chrono::{DateTime, Utc};
use rustack_dynamodb_model::DynamoDBError;
use rustack_dynamodb_model::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, ProvisionedThroughput, SseDescription,
    SseSpecification, StreamSpecification, TableDescription, Tag, UnknownVariant,
};

use crate::api::DynamoDBResult;

pub(super) fn build_error(err: BuildError) -> DynamoDBError {
    DynamoDBError::validation(err.to_string())
}

fn parse<T>(value: &str) -> DynamoDBResult<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    value
        .parse()
        .map_err(|e: UnknownVariant| DynamoDBError::internal_error(e.to_string()))
}

fn parse_opt<T>(value: Option<&str>) -> DynamoDBResult<Option<T>>
where
    T: FromStr<Err = UnknownVariant>,
{
    value.map(parse).transpose()
}

fn from_sdk_date(date: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(date.secs(), date.subsec_nanos())
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

pub(super) fn to_key_schema(
    keys: &[KeySchemaElement],
) -> DynamoDBResult<Vec<sdk::KeySchemaElement>> {
    keys.iter()
        .map(|k| {
            sdk::KeySchemaElement::builder()
                .attribute_name(&k.attribute_name)
                .key_type(sdk::KeyType::from(k.key_type.as_str()))
                .build()
                .map_err(build_error)
        })
        .collect()
}

pub(super) fn to_attribute_definitions(
    attributes: &[AttributeDefinition],
) -> DynamoDBResult<Vec<sdk::AttributeDefinition>> {
    attributes
        .iter()
        .map(|a| {
            sdk::AttributeDefinition::builder()
                .attribute_name(&a.attribute_name)
                .attribute_type(sdk::ScalarAttributeType::from(a.attribute_type.as_str()))
                .build()
                .map_err(build_error)
        })
        .collect()
}

pub(super) fn to_billing_mode(mode: Option<BillingMode>) -> Option<sdk::BillingMode> {
    mode.map(|m| sdk::BillingMode::from(m.as_str()))
}

pub(super) fn to_throughput(
    throughput: Option<&ProvisionedThroughput>,
) -> DynamoDBResult<Option<sdk::ProvisionedThroughput>> {
    throughput
        .map(|t| {
            sdk::ProvisionedThroughput::builder()
                .read_capacity_units(t.read_capacity_units)
                .write_capacity_units(t.write_capacity_units)
                .build()
                .map_err(build_error)
        })
        .transpose()
}

pub(super) fn to_stream(
    stream: Option<&StreamSpecification>,
) -> DynamoDBResult<Option<sdk::StreamSpecification>> {
    stream
        .map(|s| {
            sdk::StreamSpecification::builder()
                .stream_enabled(s.stream_enabled)
                .set_stream_view_type(
                    s.stream_view_type.map(|v| sdk::StreamViewType::from(v.as_str())),
                )
                .build()
                .map_err(build_error)
        })
        .transpose()
}

pub(super) fn to_sse(sse: Option<&SseSpecification>) -> Option<sdk::SseSpecification> {
    sse.map(|s| {
        sdk::SseSpecification::builder()
            .enabled(s.enabled)
            .set_sse_type(s.sse_type.map(|t| sdk::SseType::from(t.as_str())))
            .set_kms_master_key_id(s.kms_master_key_id.clone())
            .build()
    })
}

pub(super) fn to_tags(tags: &[Tag]) -> DynamoDBResult<Vec<sdk::Tag>> {
    tags.iter()
        .map(|t| {
            sdk::Tag::builder()
                .key(&t.key)
                .value(&t.value)
                .build()
                .map_err(build_error)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

pub(super) fn from_tags(tags: &[sdk::Tag]) -> Vec<Tag> {
    tags.iter().map(|t| Tag::new(t.key(), t.value())).collect()
}

fn from_sse(sse: &sdk::SseDescription) -> DynamoDBResult<SseDescription> {
    Ok(SseDescription {
        status: parse_opt(sse.status().map(sdk::SseStatus::as_str))?,
        sse_type: parse_opt(sse.sse_type().map(sdk::SseType::as_str))?,
        kms_master_key_arn: sse.kms_master_key_arn().map(str::to_owned),
    })
}

/// Read a table description.
///
/// On-demand tables report a zero throughput, which is dropped so it
/// compares equal to an unset one.
pub(super) fn from_table(table: &sdk::TableDescription) -> DynamoDBResult<TableDescription> {
    let billing_mode: Option<BillingMode> = parse_opt(
        table
            .billing_mode_summary()
            .and_then(|s| s.billing_mode())
            .map(sdk::BillingMode::as_str),
    )?;
    let provisioned_throughput = table
        .provisioned_throughput()
        .map(|t| ProvisionedThroughput {
            read_capacity_units: t.read_capacity_units().unwrap_or_default(),
            write_capacity_units: t.write_capacity_units().unwrap_or_default(),
        })
        .filter(|t| {
            billing_mode != Some(BillingMode::PayPerRequest) || t.read_capacity_units > 0
        });
    let stream_specification = table
        .stream_specification()
        .map(|s| {
            Ok::<_, DynamoDBError>(StreamSpecification {
                stream_enabled: s.stream_enabled(),
                stream_view_type: parse_opt(
                    s.stream_view_type().map(sdk::StreamViewType::as_str),
                )?,
            })
        })
        .transpose()?;

    Ok(TableDescription {
        table_name: table.table_name().unwrap_or_default().to_owned(),
        table_arn: table.table_arn().unwrap_or_default().to_owned(),
        table_status: parse(
            table
                .table_status()
                .map_or("ACTIVE", sdk::TableStatus::as_str),
        )?,
        key_schema: table
            .key_schema()
            .iter()
            .map(|k| {
                Ok(KeySchemaElement {
                    attribute_name: k.attribute_name().to_owned(),
                    key_type: parse(k.key_type().as_str())?,
                })
            })
            .collect::<DynamoDBResult<_>>()?,
        attribute_definitions: table
            .attribute_definitions()
            .iter()
            .map(|a| {
                Ok(AttributeDefinition {
                    attribute_name: a.attribute_name().to_owned(),
                    attribute_type: parse(a.attribute_type().as_str())?,
                })
            })
            .collect::<DynamoDBResult<_>>()?,
        billing_mode,
        provisioned_throughput,
        stream_specification,
        latest_stream_arn: table.latest_stream_arn().map(str::to_owned),
        sse_description: table.sse_description().map(from_sse).transpose()?,
        deletion_protection_enabled: table.deletion_protection_enabled().unwrap_or_default(),
        creation_date_time: table.creation_date_time().and_then(from_sdk_date),
    })
}

#[cfg(test)]
mod tests {
    use rustack_dynamodb_model::types::{KeyType, StreamViewType, TableStatus};

    use super::*;

    fn sdk_table(billing: sdk::BillingMode, read: i64) -> sdk::TableDescription {
        sdk::TableDescription::builder()
            .table_name("orders")
            .table_arn("arn:aws:dynamodb:us-east-1:000000000000:table/orders")
            .table_status(sdk::TableStatus::Active)
            .key_schema(
                sdk::KeySchemaElement::builder()
                    .attribute_name("pk")
                    .key_type(sdk::KeyType::Hash)
                    .build()
                    .unwrap(),
            )
            .billing_mode_summary(
                sdk::BillingModeSummary::builder()
                    .billing_mode(billing)
                    .build(),
            )
            .provisioned_throughput(
                sdk::ProvisionedThroughputDescription::builder()
                    .read_capacity_units(read)
                    .write_capacity_units(read)
                    .build(),
            )
            .stream_specification(
                sdk::StreamSpecification::builder()
                    .stream_enabled(true)
                    .stream_view_type(sdk::StreamViewType::NewImage)
                    .build()
                    .unwrap(),
            )
            .build()
    }

    #[test]
    fn test_should_read_table_description() {
        let table = from_table(&sdk_table(sdk::BillingMode::Provisioned, 5)).unwrap();
        assert_eq!(table.table_name, "orders");
        assert_eq!(table.table_status, TableStatus::Active);
        assert_eq!(table.key_schema[0].key_type, KeyType::Hash);
        assert_eq!(
            table.provisioned_throughput,
            Some(ProvisionedThroughput {
                read_capacity_units: 5,
                write_capacity_units: 5,
            })
        );
        assert_eq!(
            table.effective_stream().stream_view_type,
            Some(StreamViewType::NewImage)
        );
        assert!(!table.deletion_protection_enabled);
    }

    #[test]
    fn test_should_drop_zero_throughput_of_on_demand_table() {
        let table = from_table(&sdk_table(sdk::BillingMode::PayPerRequest, 0)).unwrap();
        assert_eq!(table.billing_mode, Some(BillingMode::PayPerRequest));
        assert!(table.provisioned_throughput.is_none());
    }

    #[test]
    fn test_should_reject_unknown_wire_value() {
        let table = sdk::TableDescription::builder()
            .table_name("orders")
            .table_status(sdk::TableStatus::from("MELTING"))
            .build();
        assert!(from_table(&table).is_err());
    }

    #[test]
    fn test_should_build_stream_input() {
        let stream = to_stream(Some(&StreamSpecification {
            stream_enabled: true,
            stream_view_type: Some(StreamViewType::KeysOnly),
        }))
        .unwrap()
        .unwrap();
        assert!(stream.stream_enabled());
        assert_eq!(stream.stream_view_type(), Some(&sdk::StreamViewType::KeysOnly));
    }
}
