//! Provider shapes for the DynamoDB table-management APIs.
//!
//! Enum variants use idiomatic Rust naming with `#[serde(rename)]` to map to
//! the `SCREAMING_SNAKE_CASE` wire strings DynamoDB uses. Structs serialize
//! in camelCase because they are embedded directly in `Table` manifests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Returned when a wire string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    /// Enum name.
    pub kind: &'static str,
    /// Offending value.
    pub value: String,
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            /// Returns the DynamoDB wire-format string.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

wire_enum! {
    /// Key type within a key schema element.
    KeyType {
        /// Partition key.
        Hash => "HASH",
        /// Sort key.
        Range => "RANGE",
    }
}

wire_enum! {
    /// Scalar attribute types allowed for key attributes.
    ScalarAttributeType {
        /// String.
        S => "S",
        /// Number.
        N => "N",
        /// Binary.
        B => "B",
    }
}

wire_enum! {
    /// Table lifecycle status.
    TableStatus {
        /// Being created.
        Creating => "CREATING",
        /// Ready for use.
        Active => "ACTIVE",
        /// Being deleted.
        Deleting => "DELETING",
        /// Being updated.
        Updating => "UPDATING",
        /// Being archived.
        Archiving => "ARCHIVING",
        /// Archived.
        Archived => "ARCHIVED",
        /// KMS key is inaccessible.
        InaccessibleEncryptionCredentials => "INACCESSIBLE_ENCRYPTION_CREDENTIALS",
    }
}

wire_enum! {
    /// Billing mode.
    BillingMode {
        /// Fixed read and write capacity.
        Provisioned => "PROVISIONED",
        /// On-demand.
        PayPerRequest => "PAY_PER_REQUEST",
    }
}

wire_enum! {
    /// What a stream record carries.
    StreamViewType {
        /// Key attributes only.
        KeysOnly => "KEYS_ONLY",
        /// Item after the change.
        NewImage => "NEW_IMAGE",
        /// Item before the change.
        OldImage => "OLD_IMAGE",
        /// Both images.
        NewAndOldImages => "NEW_AND_OLD_IMAGES",
    }
}

wire_enum! {
    /// Server-side encryption type.
    SseType {
        /// AWS owned key.
        Aes256 => "AES256",
        /// KMS key.
        Kms => "KMS",
    }
}

wire_enum! {
    /// Server-side encryption status.
    SseStatus {
        /// Turning on.
        Enabling => "ENABLING",
        /// On.
        Enabled => "ENABLED",
        /// Turning off.
        Disabling => "DISABLING",
        /// Off.
        Disabled => "DISABLED",
        /// Key change in progress.
        Updating => "UPDATING",
    }
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// One element of a key schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySchemaElement {
    /// Attribute name.
    pub attribute_name: String,
    /// Partition or sort key.
    pub key_type: KeyType,
}

/// Type of one key attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    /// Attribute name.
    pub attribute_name: String,
    /// Scalar type.
    pub attribute_type: ScalarAttributeType,
}

/// Read and write capacity of a provisioned table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedThroughput {
    /// Read capacity units.
    pub read_capacity_units: i64,
    /// Write capacity units.
    pub write_capacity_units: i64,
}

/// Stream settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSpecification {
    /// Whether the stream is on.
    pub stream_enabled: bool,
    /// Record contents; required when the stream is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_view_type: Option<StreamViewType>,
}

/// Requested server-side encryption.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SseSpecification {
    /// `true` selects a KMS key; `false` the AWS owned key.
    pub enabled: bool,
    /// Encryption type; only `KMS` is accepted when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sse_type: Option<SseType>,
    /// KMS key id, ARN or alias. Unset means the AWS managed key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_master_key_id: Option<String>,
}

/// Server-side encryption as reported by DescribeTable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SseDescription {
    /// Current status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SseStatus>,
    /// Encryption type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sse_type: Option<SseType>,
    /// ARN of the KMS key in use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_master_key_arn: Option<String>,
}

impl SseDescription {
    /// Whether a KMS key encrypts the table.
    #[must_use]
    pub fn is_kms(&self) -> bool {
        self.sse_type == Some(SseType::Kms)
            && matches!(
                self.status,
                Some(SseStatus::Enabled | SseStatus::Enabling | SseStatus::Updating)
            )
    }
}

/// A resource tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

impl Tag {
    /// Create a tag.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether the provider owns this tag (`aws:` prefix).
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.key.starts_with("aws:")
    }
}

/// Output of DescribeTable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDescription {
    /// Table name.
    pub table_name: String,
    /// Table ARN.
    pub table_arn: String,
    /// Lifecycle status.
    pub table_status: TableStatus,
    /// Key schema.
    pub key_schema: Vec<KeySchemaElement>,
    /// Key attribute definitions.
    pub attribute_definitions: Vec<AttributeDefinition>,
    /// Billing mode. DynamoDB omits the summary for tables that were always
    /// provisioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_mode: Option<BillingMode>,
    /// Capacity; zero for on-demand tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_throughput: Option<ProvisionedThroughput>,
    /// Stream settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_specification: Option<StreamSpecification>,
    /// ARN of the current stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_stream_arn: Option<String>,
    /// Encryption; absent means the AWS owned key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sse_description: Option<SseDescription>,
    /// Whether deletion protection is on.
    #[serde(default)]
    pub deletion_protection_enabled: bool,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date_time: Option<DateTime<Utc>>,
}

impl TableDescription {
    /// Effective billing mode.
    #[must_use]
    pub fn effective_billing_mode(&self) -> BillingMode {
        self.billing_mode.unwrap_or(BillingMode::Provisioned)
    }

    /// Effective stream settings; absent means off.
    #[must_use]
    pub fn effective_stream(&self) -> StreamSpecification {
        self.stream_specification.unwrap_or_default()
    }
}

/// Input of CreateTable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTableInput {
    /// Table name.
    pub table_name: String,
    /// Key attribute definitions.
    pub attribute_definitions: Vec<AttributeDefinition>,
    /// Key schema.
    pub key_schema: Vec<KeySchemaElement>,
    /// Billing mode; DynamoDB defaults to provisioned.
    pub billing_mode: Option<BillingMode>,
    /// Capacity; required for provisioned tables.
    pub provisioned_throughput: Option<ProvisionedThroughput>,
    /// Stream settings.
    pub stream_specification: Option<StreamSpecification>,
    /// Encryption.
    pub sse_specification: Option<SseSpecification>,
    /// Initial tags.
    pub tags: Vec<Tag>,
    /// Deletion protection.
    pub deletion_protection_enabled: Option<bool>,
}

/// Input of UpdateTable. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTableInput {
    /// Table name.
    pub table_name: String,
    /// New billing mode.
    pub billing_mode: Option<BillingMode>,
    /// New capacity.
    pub provisioned_throughput: Option<ProvisionedThroughput>,
    /// New stream settings.
    pub stream_specification: Option<StreamSpecification>,
    /// New encryption.
    pub sse_specification: Option<SseSpecification>,
    /// New deletion protection.
    pub deletion_protection_enabled: Option<bool>,
}

impl UpdateTableInput {
    /// An update of `table` that changes nothing yet.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table_name: table.into(),
            ..Self::default()
        }
    }

    /// Whether the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.billing_mode.is_none()
            && self.provisioned_throughput.is_none()
            && self.stream_specification.is_none()
            && self.sse_specification.is_none()
            && self.deletion_protection_enabled.is_none()
    }
}
