//! The `Bucket` managed resource.
//!
//! `BucketParameters` is the user-authored `spec.forProvider` record. Most
//! sub-resource blocks reuse the provider shapes from [`crate::types`]
//! directly; blocks with cross-resource references get a `*Spec` wrapper that
//! carries the literal value next to its `*Ref` and `*Selector`.

use rustack_provider_core::{
    AtProvider, ForProvider, ManagedResource, reference::Reference, reference::Selector,
};
use serde::{Deserialize, Serialize};

use crate::policy::BucketPolicyBody;
use crate::types::{
    AccelerateConfiguration, AccessControlTranslation, BucketCannedAcl, CorsConfiguration,
    EncryptionConfiguration, FilterRule, LifecycleConfiguration, ObjectLockRule, ObjectOwnership,
    PublicAccessBlockConfiguration, ReplicationRuleFilter, ReplicationTimeSetting, RequestPaymentConfiguration, RuleStatus,
    ServerSideEncryption, SourceSelectionCriteria, Tagging, TargetGrant, VersioningConfiguration,
    WebsiteConfiguration,
};

/// Kind name of buckets.
pub const KIND_BUCKET: &str = "Bucket";
/// Kind name of IAM roles that replication may reference.
pub const KIND_ROLE: &str = "Role";
/// Kind name of SNS topics that notifications may reference.
pub const KIND_TOPIC: &str = "Topic";
/// Kind name of SQS queues that notifications may reference.
pub const KIND_QUEUE: &str = "Queue";
/// Kind name of Lambda functions that notifications may reference.
pub const KIND_FUNCTION: &str = "Function";
/// Kind name of KMS keys that encryption may reference.
pub const KIND_KEY: &str = "Key";

/// A bucket managed resource.
pub type Bucket = ManagedResource<BucketParameters, BucketObservation>;

/// Desired bucket state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketParameters {
    /// Region the bucket lives in.
    pub location_constraint: String,

    /// Canned ACL applied at creation and kept in place afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<BucketCannedAcl>,
    /// Full control grant header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_full_control: Option<String>,
    /// Read grant header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_read: Option<String>,
    /// Read-ACP grant header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_read_acp: Option<String>,
    /// Write grant header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_write: Option<String>,
    /// Write-ACP grant header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_write_acp: Option<String>,
    /// Create the bucket with object lock enabled. Creation-time only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_lock_enabled_for_bucket: Option<bool>,
    /// Object ownership controls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_ownership: Option<ObjectOwnership>,

    /// Transfer acceleration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerate_configuration: Option<AccelerateConfiguration>,
    /// CORS rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors_configuration: Option<CorsConfiguration>,
    /// Lifecycle rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_configuration: Option<LifecycleConfiguration>,
    /// Server access logging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging_configuration: Option<LoggingConfigurationSpec>,
    /// Event notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_configuration: Option<NotificationConfigurationSpec>,
    /// Replication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_configuration: Option<ReplicationConfigurationSpec>,
    /// Request payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_configuration: Option<RequestPaymentConfiguration>,
    /// Default encryption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_side_encryption_configuration: Option<ServerSideEncryptionConfigurationSpec>,
    /// Tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagging: Option<Tagging>,
    /// Versioning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versioning_configuration: Option<VersioningConfiguration>,
    /// Static website hosting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_configuration: Option<WebsiteConfiguration>,
    /// Public access block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_access_block_configuration: Option<PublicAccessBlockConfiguration>,
    /// Bucket policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<BucketPolicyBody>,
    /// What happens to an existing policy when `policy` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_update_policy: Option<PolicyUpdatePolicy>,
    /// Object lock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_lock_configuration: Option<ObjectLockConfigurationSpec>,
}

impl ForProvider for BucketParameters {
    const KIND: &'static str = KIND_BUCKET;
}

/// Observed bucket state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketObservation {
    /// Bucket ARN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
}

impl AtProvider for BucketObservation {
    fn arn(&self) -> Option<&str> {
        self.arn.as_deref()
    }
}

/// Policy deletion behavior when the desired policy is unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyDeletionPolicy {
    /// Keep whatever policy exists.
    #[default]
    Never,
    /// Delete an existing policy.
    IfNull,
}

/// Wrapper around [`PolicyDeletionPolicy`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyUpdatePolicy {
    /// Deletion behavior.
    #[serde(default)]
    pub deletion_policy: PolicyDeletionPolicy,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Desired server access logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfigurationSpec {
    /// Name of the bucket receiving log objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_bucket: Option<String>,
    /// Bucket managed resource receiving log objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_bucket_ref: Option<Reference>,
    /// Label selector for the target bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_bucket_selector: Option<Selector>,
    /// Key prefix of log objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_prefix: Option<String>,
    /// Grants on log objects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_grants: Vec<TargetGrant>,
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// Desired notification target; the ARN may come from a reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTargetSpec {
    /// Configuration ID; filled in from the provider when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Destination ARN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    /// Destination managed resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn_ref: Option<Reference>,
    /// Label selector for the destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn_selector: Option<Selector>,
    /// Event types.
    #[serde(default)]
    pub events: Vec<String>,
    /// Key filter rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter_rules: Vec<FilterRule>,
}

/// Desired event notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationConfigurationSpec {
    /// SNS topics.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topic_configurations: Vec<NotificationTargetSpec>,
    /// SQS queues.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queue_configurations: Vec<NotificationTargetSpec>,
    /// Lambda functions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lambda_function_configurations: Vec<NotificationTargetSpec>,
}

// ---------------------------------------------------------------------------
// Replication
// ---------------------------------------------------------------------------

/// Desired replication destination; the bucket ARN may come from a reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationSpec {
    /// Destination bucket ARN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// Destination bucket managed resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_ref: Option<Reference>,
    /// Label selector for the destination bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_selector: Option<Selector>,
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

/// Desired replication rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationRuleSpec {
    /// Rule identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// Rule state.
    pub status: RuleStatus,
    /// Object filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ReplicationRuleFilter>,
    /// Destination.
    pub destination: DestinationSpec,
    /// Delete marker replication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_marker_replication: Option<RuleStatus>,
    /// Extra source selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_selection_criteria: Option<SourceSelectionCriteria>,
    /// Replicate existing objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_object_replication: Option<RuleStatus>,
}

/// Desired replication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationConfigurationSpec {
    /// IAM role ARN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// IAM role managed resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_ref: Option<Reference>,
    /// Label selector for the role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_selector: Option<Selector>,
    /// Rules.
    #[serde(default)]
    pub rules: Vec<ReplicationRuleSpec>,
}

// ---------------------------------------------------------------------------
// Server-side encryption
// ---------------------------------------------------------------------------

/// Desired default encryption; the KMS key may come from a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSideEncryptionByDefaultSpec {
    /// Algorithm.
    pub sse_algorithm: ServerSideEncryption,
    /// KMS key ID or ARN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_master_key_id: Option<String>,
    /// KMS key managed resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_master_key_id_ref: Option<Reference>,
    /// Label selector for the KMS key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_master_key_id_selector: Option<Selector>,
}

/// Desired encryption rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSideEncryptionRuleSpec {
    /// Default encryption.
    pub apply_server_side_encryption_by_default: ServerSideEncryptionByDefaultSpec,
    /// Use an S3 Bucket Key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_key_enabled: Option<bool>,
}

/// Desired encryption.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSideEncryptionConfigurationSpec {
    /// Rules.
    #[serde(default)]
    pub rules: Vec<ServerSideEncryptionRuleSpec>,
}

// ---------------------------------------------------------------------------
// Object lock
// ---------------------------------------------------------------------------

/// Desired object lock state. Unlike the provider shape this can say
/// `Disabled`, which is rejected once the bucket has object lock on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectLockState {
    /// Object lock on.
    Enabled,
    /// Object lock off.
    Disabled,
}

/// Desired object lock configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectLockConfigurationSpec {
    /// Whether object lock is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_lock_enabled: Option<ObjectLockState>,
    /// Default retention.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<ObjectLockRule>,
}

#[cfg(test)]
mod tests {
    use rustack_provider_core::Managed;

    use super::*;
    use crate::types::{BucketVersioningStatus, Tag};

    #[test]
    fn test_should_deserialize_bucket_manifest() {
        let bucket: Bucket = serde_json::from_value(serde_json::json!({
            "metadata": {
                "name": "acme-logs",
                "annotations": { "crossplane.io/external-name": "acme-logs" }
            },
            "spec": {
                "forProvider": {
                    "locationConstraint": "us-east-1",
                    "acl": "private",
                    "versioningConfiguration": { "status": "Enabled" },
                    "serverSideEncryptionConfiguration": {
                        "rules": [{ "applyServerSideEncryptionByDefault": { "sseAlgorithm": "AES256" } }]
                    },
                    "tagging": { "tagSet": [{ "key": "user", "value": "alice" }] },
                    "loggingConfiguration": { "targetBucketRef": { "name": "central-logs" } },
                    "policyUpdatePolicy": { "deletionPolicy": "IfNull" }
                },
                "deletionPolicy": "Orphan"
            }
        }))
        .unwrap();

        let params = &bucket.spec.for_provider;
        assert_eq!(bucket.kind(), "Bucket");
        assert_eq!(bucket.meta().external_name(), "acme-logs");
        assert_eq!(
            params.versioning_configuration.as_ref().unwrap().status,
            Some(BucketVersioningStatus::Enabled)
        );
        assert_eq!(
            params.tagging.as_ref().unwrap().tag_set,
            vec![Tag::new("user", "alice")]
        );
        assert_eq!(
            params.logging_configuration.as_ref().unwrap().target_bucket_ref,
            Some(Reference::new("central-logs"))
        );
        assert_eq!(
            params.policy_update_policy.as_ref().unwrap().deletion_policy,
            PolicyDeletionPolicy::IfNull
        );
    }

    #[test]
    fn test_should_omit_unset_blocks_when_serializing() {
        let params = BucketParameters {
            location_constraint: "eu-west-1".into(),
            ..BucketParameters::default()
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({ "locationConstraint": "eu-west-1" }));
    }
}
