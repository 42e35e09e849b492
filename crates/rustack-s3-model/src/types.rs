//! Provider request and response shapes for the bucket configuration APIs.
//!
//! These mirror the S3 API closely. Lists that the API treats as optional are
//! plain `Vec`s (absent and empty mean the same thing), and every enum carries
//! its wire spelling.

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

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the string value of this enum variant.
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

string_enum! {
    /// Canned ACL applied at creation and on every ready tick.
    BucketCannedAcl {
        /// Owner gets full control.
        Private => "private",
        /// Everyone may read.
        PublicRead => "public-read",
        /// Everyone may read and write.
        PublicReadWrite => "public-read-write",
        /// Authenticated users may read.
        AuthenticatedRead => "authenticated-read",
    }
}

string_enum! {
    /// Object ownership setting.
    ObjectOwnership {
        /// Bucket owner owns objects written with `bucket-owner-full-control`.
        BucketOwnerPreferred => "BucketOwnerPreferred",
        /// The writer owns the object.
        ObjectWriter => "ObjectWriter",
        /// ACLs are disabled; the bucket owner owns everything.
        BucketOwnerEnforced => "BucketOwnerEnforced",
    }
}

string_enum! {
    /// Versioning state.
    BucketVersioningStatus {
        /// Versioning on.
        Enabled => "Enabled",
        /// Versioning suspended.
        Suspended => "Suspended",
    }
}

string_enum! {
    /// MFA delete state.
    MfaDeleteStatus {
        /// MFA delete on.
        Enabled => "Enabled",
        /// MFA delete off.
        Disabled => "Disabled",
    }
}

string_enum! {
    /// Transfer acceleration state.
    BucketAccelerateStatus {
        /// Acceleration on.
        Enabled => "Enabled",
        /// Acceleration suspended.
        Suspended => "Suspended",
    }
}

string_enum! {
    /// Who pays for requests.
    Payer {
        /// The requester pays.
        Requester => "Requester",
        /// The bucket owner pays.
        BucketOwner => "BucketOwner",
    }
}

string_enum! {
    /// Default server-side encryption algorithm.
    ServerSideEncryption {
        /// SSE-S3.
        Aes256 => "AES256",
        /// SSE-KMS.
        AwsKms => "aws:kms",
        /// Dual-layer SSE-KMS.
        AwsKmsDsse => "aws:kms:dsse",
    }
}

impl ServerSideEncryption {
    /// Whether the algorithm needs a KMS key.
    #[must_use]
    pub fn uses_kms(&self) -> bool {
        matches!(self, Self::AwsKms | Self::AwsKmsDsse)
    }
}

string_enum! {
    /// Enabled/disabled switch used by lifecycle and replication rules.
    RuleStatus {
        /// Rule on.
        Enabled => "Enabled",
        /// Rule off.
        Disabled => "Disabled",
    }
}

string_enum! {
    /// Object lock switch reported by the provider.
    ObjectLockEnabled {
        /// Object lock on.
        Enabled => "Enabled",
    }
}

string_enum! {
    /// Default retention mode.
    ObjectLockRetentionMode {
        /// Users with special permissions may override.
        Governance => "GOVERNANCE",
        /// Nobody may override.
        Compliance => "COMPLIANCE",
    }
}

string_enum! {
    /// Redirect protocol.
    Protocol {
        /// HTTP.
        Http => "http",
        /// HTTPS.
        Https => "https",
    }
}

string_enum! {
    /// Notification key filter rule name.
    FilterRuleName {
        /// Key prefix.
        Prefix => "prefix",
        /// Key suffix.
        Suffix => "suffix",
    }
}

impl FilterRuleName {
    /// Parse a rule name ignoring case; the API accepts `Prefix` and `prefix`.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
    }
}

string_enum! {
    /// Grantee type for logging target grants.
    GranteeType {
        /// Canonical user ID.
        CanonicalUser => "CanonicalUser",
        /// Email address.
        AmazonCustomerByEmail => "AmazonCustomerByEmail",
        /// Predefined group URI.
        Group => "Group",
    }
}

string_enum! {
    /// Permission on a logging target grant.
    BucketLogsPermission {
        /// Full control.
        FullControl => "FULL_CONTROL",
        /// Read.
        Read => "READ",
        /// Write.
        Write => "WRITE",
    }
}

// ---------------------------------------------------------------------------
// Bucket-level
// ---------------------------------------------------------------------------

/// CreateBucket request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketInput {
    /// Bucket name.
    pub bucket: String,
    /// Location constraint; omitted for `us-east-1`.
    pub location_constraint: Option<String>,
    /// Canned ACL.
    pub acl: Option<BucketCannedAcl>,
    /// Explicit grants.
    pub grants: AclGrants,
    /// Create with object lock enabled.
    pub object_lock_enabled_for_bucket: bool,
    /// Object ownership.
    pub object_ownership: Option<ObjectOwnership>,
}

/// Grant headers shared by CreateBucket and PutBucketAcl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclGrants {
    /// `x-amz-grant-full-control`.
    pub grant_full_control: Option<String>,
    /// `x-amz-grant-read`.
    pub grant_read: Option<String>,
    /// `x-amz-grant-read-acp`.
    pub grant_read_acp: Option<String>,
    /// `x-amz-grant-write`.
    pub grant_write: Option<String>,
    /// `x-amz-grant-write-acp`.
    pub grant_write_acp: Option<String>,
}

impl AclGrants {
    /// Whether any grant header is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grant_full_control.is_none()
            && self.grant_read.is_none()
            && self.grant_read_acp.is_none()
            && self.grant_write.is_none()
            && self.grant_write_acp.is_none()
    }
}

/// PutBucketAcl request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutBucketAclInput {
    /// Bucket name.
    pub bucket: String,
    /// Canned ACL.
    pub acl: Option<BucketCannedAcl>,
    /// Explicit grants.
    pub grants: AclGrants,
}

// ---------------------------------------------------------------------------
// Simple configurations
// ---------------------------------------------------------------------------

/// Versioning configuration as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersioningConfiguration {
    /// Versioning state; absent on buckets that never had versioning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BucketVersioningStatus>,
    /// MFA delete state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mfa_delete: Option<MfaDeleteStatus>,
}

/// Transfer acceleration configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccelerateConfiguration {
    /// Acceleration state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BucketAccelerateStatus>,
}

/// Request payment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPaymentConfiguration {
    /// Who pays.
    pub payer: Payer,
}

/// Public access block configuration. Unset fields mean `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_field_names)]
pub struct PublicAccessBlockConfiguration {
    /// Reject PUTs with public ACLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_public_acls: Option<bool>,
    /// Ignore public ACLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_public_acls: Option<bool>,
    /// Reject public bucket policies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_public_policy: Option<bool>,
    /// Restrict access to buckets with public policies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrict_public_buckets: Option<bool>,
}

/// A key/value tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
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
}

/// Bucket tagging block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tagging {
    /// Tags.
    #[serde(default)]
    pub tag_set: Vec<Tag>,
}

// ---------------------------------------------------------------------------
// CORS
// ---------------------------------------------------------------------------

/// One CORS rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsRule {
    /// Rule identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Headers allowed in preflight requests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_headers: Vec<String>,
    /// Allowed HTTP methods.
    pub allowed_methods: Vec<String>,
    /// Allowed origins.
    pub allowed_origins: Vec<String>,
    /// Headers exposed to the browser.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expose_headers: Vec<String>,
    /// Preflight cache time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_seconds: Option<i32>,
}

/// CORS configuration block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsConfiguration {
    /// Rules, in order.
    #[serde(default)]
    pub cors_rules: Vec<CorsRule>,
}

// ---------------------------------------------------------------------------
// Server-side encryption
// ---------------------------------------------------------------------------

/// Default encryption applied to new objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSideEncryptionByDefault {
    /// Algorithm.
    pub sse_algorithm: ServerSideEncryption,
    /// KMS key for `aws:kms` algorithms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_master_key_id: Option<String>,
}

/// One encryption rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSideEncryptionRule {
    /// Default encryption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_server_side_encryption_by_default: Option<ServerSideEncryptionByDefault>,
    /// Use an S3 Bucket Key for SSE-KMS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_key_enabled: Option<bool>,
}

/// Encryption configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSideEncryptionConfiguration {
    /// Rules.
    pub rules: Vec<ServerSideEncryptionRule>,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// `And` combinator of a lifecycle filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleRuleAndOperator {
    /// Key prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Tags that must all match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Minimum object size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_size_greater_than: Option<i64>,
    /// Maximum object size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_size_less_than: Option<i64>,
}

/// Which objects a lifecycle rule applies to. At most one of `prefix`, `tag`
/// and `and` may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleRuleFilter {
    /// Key prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Single tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
    /// Combination of predicates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and: Option<LifecycleRuleAndOperator>,
    /// Minimum object size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_size_greater_than: Option<i64>,
    /// Maximum object size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_size_less_than: Option<i64>,
}

/// Current-version expiration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleExpiration {
    /// Expire on this date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// Expire after this many days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<i32>,
    /// Remove expired delete markers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_object_delete_marker: Option<bool>,
}

/// Storage-class transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    /// Transition on this date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// Transition after this many days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<i32>,
    /// Target storage class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

/// Noncurrent-version expiration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoncurrentVersionExpiration {
    /// Days after becoming noncurrent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noncurrent_days: Option<i32>,
    /// Noncurrent versions to retain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newer_noncurrent_versions: Option<i32>,
}

/// Noncurrent-version transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoncurrentVersionTransition {
    /// Days after becoming noncurrent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noncurrent_days: Option<i32>,
    /// Noncurrent versions to retain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newer_noncurrent_versions: Option<i32>,
    /// Target storage class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

/// Cleanup of incomplete multipart uploads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbortIncompleteMultipartUpload {
    /// Days after initiation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_after_initiation: Option<i32>,
}

/// One lifecycle rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleRule {
    /// Rule identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Rule state.
    pub status: RuleStatus,
    /// Object filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<LifecycleRuleFilter>,
    /// Current-version expiration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<LifecycleExpiration>,
    /// Transitions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,
    /// Noncurrent-version expiration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noncurrent_version_expiration: Option<NoncurrentVersionExpiration>,
    /// Noncurrent-version transitions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub noncurrent_version_transitions: Vec<NoncurrentVersionTransition>,
    /// Multipart upload cleanup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_incomplete_multipart_upload: Option<AbortIncompleteMultipartUpload>,
}

/// Lifecycle configuration block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleConfiguration {
    /// Rules, in order.
    #[serde(default)]
    pub rules: Vec<LifecycleRule>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Grantee of a logging target grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grantee {
    /// Grantee type.
    #[serde(rename = "type")]
    pub kind: GranteeType,
    /// Canonical user ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Group URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    /// Display name, filled in by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Grant on delivered log objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetGrant {
    /// Who.
    pub grantee: Grantee,
    /// What.
    pub permission: BucketLogsPermission,
}

/// Server access logging destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingEnabled {
    /// Bucket receiving log objects.
    pub target_bucket: String,
    /// Key prefix of log objects.
    #[serde(default)]
    pub target_prefix: String,
    /// Grants on log objects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_grants: Vec<TargetGrant>,
}

/// Logging status; `None` means logging is off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketLoggingStatus {
    /// Logging destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging_enabled: Option<LoggingEnabled>,
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// Key name filter rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRule {
    /// Prefix or suffix.
    pub name: FilterRuleName,
    /// Value to match.
    pub value: String,
}

/// One notification target (topic, queue or function).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTarget {
    /// Configuration ID; assigned by the provider when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Destination ARN.
    pub arn: String,
    /// Event types, e.g. `s3:ObjectCreated:*`.
    pub events: Vec<String>,
    /// Key filter rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter_rules: Vec<FilterRule>,
}

/// Notification configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationConfiguration {
    /// SNS topics.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topic_configurations: Vec<NotificationTarget>,
    /// SQS queues.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queue_configurations: Vec<NotificationTarget>,
    /// Lambda functions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lambda_function_configurations: Vec<NotificationTarget>,
}

impl NotificationConfiguration {
    /// Whether no target is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topic_configurations.is_empty()
            && self.queue_configurations.is_empty()
            && self.lambda_function_configurations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Replication
// ---------------------------------------------------------------------------

/// `And` combinator of a replication filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationRuleAndOperator {
    /// Key prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Tags that must all match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// Which objects a replication rule applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationRuleFilter {
    /// Key prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Single tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
    /// Combination of predicates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and: Option<ReplicationRuleAndOperator>,
}

/// Owner override for replicas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlTranslation {
    /// Always `Destination`.
    pub owner: String,
}

/// KMS key for replicas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionConfiguration {
    /// KMS key ID in the destination region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replica_kms_key_id: Option<String>,
}

/// Replication Time Control or metrics setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationTimeSetting {
    /// On or off.
    pub status: RuleStatus,
    /// Threshold in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<i32>,
}

/// Where replicas go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    /// Destination bucket ARN.
    pub bucket: String,
    /// Destination account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// Replica storage class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    /// Owner override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_control_translation: Option<AccessControlTranslation>,
    /// Replica encryption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_configuration: Option<EncryptionConfiguration>,
    /// Replication Time Control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_time: Option<ReplicationTimeSetting>,
    /// Replication metrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ReplicationTimeSetting>,
}

/// Which source objects are selected beyond the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSelectionCriteria {
    /// Replicate SSE-KMS encrypted objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sse_kms_encrypted_objects: Option<RuleStatus>,
    /// Replicate replica metadata changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replica_modifications: Option<RuleStatus>,
}

/// One replication rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationRule {
    /// Rule identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Priority; required when filters are used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// Rule state.
    pub status: RuleStatus,
    /// Object filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ReplicationRuleFilter>,
    /// Destination.
    pub destination: Destination,
    /// Delete marker replication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_marker_replication: Option<RuleStatus>,
    /// Extra source selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_selection_criteria: Option<SourceSelectionCriteria>,
    /// Replicate objects that existed before the rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_object_replication: Option<RuleStatus>,
}

/// Replication configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationConfiguration {
    /// IAM role ARN S3 assumes.
    pub role: String,
    /// Rules.
    pub rules: Vec<ReplicationRule>,
}

// ---------------------------------------------------------------------------
// Website
// ---------------------------------------------------------------------------

/// Index document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDocument {
    /// Suffix appended to directory requests.
    pub suffix: String,
}

/// Error document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDocument {
    /// Object key served on 4XX errors.
    pub key: String,
}

/// Redirect every request to another host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectAllRequestsTo {
    /// Target host.
    pub host_name: String,
    /// Target protocol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
}

/// When a routing rule applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingRuleCondition {
    /// HTTP error code to match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_error_code_returned_equals: Option<String>,
    /// Key prefix to match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_prefix_equals: Option<String>,
}

/// Where a routing rule sends the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redirect {
    /// Target host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    /// Redirect status code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_redirect_code: Option<String>,
    /// Target protocol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
    /// Replacement key prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_key_prefix_with: Option<String>,
    /// Replacement key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_key_with: Option<String>,
}

/// One routing rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingRule {
    /// Match condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<RoutingRuleCondition>,
    /// Redirect target.
    pub redirect: Redirect,
}

/// Static website hosting configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteConfiguration {
    /// Index document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_document: Option<IndexDocument>,
    /// Error document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_document: Option<ErrorDocument>,
    /// Redirect-all setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_all_requests_to: Option<RedirectAllRequestsTo>,
    /// Routing rules, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routing_rules: Vec<RoutingRule>,
}

// ---------------------------------------------------------------------------
// Object lock
// ---------------------------------------------------------------------------

/// Default retention for new objects. Exactly one of `days`/`years`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultRetention {
    /// Retention mode.
    pub mode: ObjectLockRetentionMode,
    /// Retention in days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<i32>,
    /// Retention in years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<i32>,
}

/// Object lock rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectLockRule {
    /// Default retention.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_retention: Option<DefaultRetention>,
}

/// Object lock configuration as the provider reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectLockConfiguration {
    /// Whether object lock is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_lock_enabled: Option<ObjectLockEnabled>,
    /// Default retention rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<ObjectLockRule>,
}
