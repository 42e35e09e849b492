//! In-memory [`BucketApi`] used by tests and by local runs without AWS.
//!
//! The store answers with the same error codes as S3 for the cases the
//! engine cares about: missing configuration, already-owned buckets, ACLs on
//! owner-enforced buckets, replication without versioning, and object lock on
//! buckets that cannot carry it. Every call is recorded so tests can assert
//! which provider calls a tick made, and a one-shot fault can be injected per
//! operation.

mod state;

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use rustack_s3_model::types::{
    AccelerateConfiguration, BucketCannedAcl, BucketLoggingStatus, BucketVersioningStatus,
    CorsConfiguration, CreateBucketInput, LifecycleConfiguration, NotificationConfiguration,
    NotificationTarget, ObjectLockConfiguration, ObjectLockEnabled, ObjectOwnership,
    PublicAccessBlockConfiguration, PutBucketAclInput, ReplicationConfiguration,
    RequestPaymentConfiguration, ServerSideEncryptionConfiguration, Tag, Tagging,
    VersioningConfiguration, WebsiteConfiguration,
};
use rustack_s3_model::{S3Error, S3ErrorCode};
use tracing::{debug, info};
use typed_builder::TypedBuilder;

pub use self::state::{MemoryBucket, default_encryption};
use crate::api::{BucketApi, S3Result};
use crate::compare::is_system_tag;
use crate::validation::validate_bucket_name;

/// Region buckets land in when no location constraint is sent.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Behavior switches of the in-memory store.
#[derive(Debug, Clone, TypedBuilder)]
pub struct MemoryOptions {
    /// Region reported by this store.
    #[builder(default = DEFAULT_REGION.to_owned(), setter(into))]
    pub region: String,
    /// Give new buckets SSE-S3 default encryption, as S3 does today.
    #[builder(default)]
    pub default_encryption: bool,
    /// Tags the provider attaches to every new bucket.
    #[builder(default)]
    pub system_tags: Vec<Tag>,
    /// Regions where transfer acceleration is unavailable.
    #[builder(default)]
    pub unsupported_acceleration_regions: Vec<String>,
}

impl Default for MemoryOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// One recorded provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    /// S3 operation name, e.g. `PutBucketCors`.
    pub operation: &'static str,
    /// Target bucket.
    pub bucket: String,
}

/// Bucket store backed by a `DashMap`.
#[derive(Debug, Default)]
pub struct MemoryBucketApi {
    buckets: DashMap<String, Arc<MemoryBucket>>,
    options: MemoryOptions,
    calls: Mutex<Vec<ApiCall>>,
    faults: DashMap<&'static str, S3Error>,
}

impl MemoryBucketApi {
    /// Create an empty store.
    #[must_use]
    pub fn new(options: MemoryOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Region this store reports.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.options.region
    }

    /// All calls made so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    /// Operation names of all calls made so far.
    #[must_use]
    pub fn operations(&self) -> Vec<&'static str> {
        self.calls.lock().iter().map(|c| c.operation).collect()
    }

    /// How many times `operation` was called.
    #[must_use]
    pub fn count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Forget the call log.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Fail the next call of `operation` with `err`.
    pub fn fail_next(&self, operation: &'static str, err: S3Error) {
        self.faults.insert(operation, err);
    }

    /// Whether a bucket exists.
    #[must_use]
    pub fn bucket_exists(&self, name: &str) -> bool {
        self.buckets.contains_key(name)
    }

    /// Region a bucket was created in.
    #[must_use]
    pub fn bucket_region(&self, name: &str) -> Option<String> {
        self.buckets.get(name).map(|b| b.region.clone())
    }

    /// Current canned ACL of a bucket.
    #[must_use]
    pub fn acl(&self, name: &str) -> Option<BucketCannedAcl> {
        self.buckets.get(name).and_then(|b| *b.acl.read())
    }

    /// Current ownership controls of a bucket.
    #[must_use]
    pub fn ownership(&self, name: &str) -> Option<ObjectOwnership> {
        self.buckets.get(name).and_then(|b| *b.ownership.read())
    }

    /// Number of buckets in the store.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn enter(&self, operation: &'static str, bucket: &str) -> S3Result<()> {
        debug!(operation, bucket, "memory bucket api call");
        self.calls.lock().push(ApiCall {
            operation,
            bucket: bucket.to_owned(),
        });
        match self.faults.remove(operation) {
            Some((_, err)) => Err(err),
            None => Ok(()),
        }
    }

    fn bucket(&self, name: &str) -> S3Result<Arc<MemoryBucket>> {
        self.buckets
            .get(name)
            .map(|b| Arc::clone(b.value()))
            .ok_or_else(|| S3Error::no_such_bucket(name))
    }

    fn call(&self, operation: &'static str, bucket: &str) -> S3Result<Arc<MemoryBucket>> {
        self.enter(operation, bucket)?;
        self.bucket(bucket)
    }

    fn acceleration_supported(&self, bucket: &MemoryBucket) -> S3Result<()> {
        if self
            .options
            .unsupported_acceleration_regions
            .iter()
            .any(|r| r == &bucket.region)
        {
            return Err(S3Error::with_message(
                S3ErrorCode::UnsupportedArgument,
                format!("transfer acceleration is not available in {}", bucket.region),
            )
            .with_resource(&bucket.name));
        }
        Ok(())
    }
}

fn missing(code: S3ErrorCode, bucket: &str) -> S3Error {
    S3Error::new(code).with_resource(bucket)
}

fn malformed(message: &str) -> S3Error {
    S3Error::with_message(S3ErrorCode::MalformedXML, message)
}

fn assign_ids(targets: &[NotificationTarget]) -> Vec<NotificationTarget> {
    targets
        .iter()
        .cloned()
        .map(|mut t| {
            if t.id.as_deref().is_none_or(str::is_empty) {
                t.id = Some(uuid::Uuid::new_v4().to_string());
            }
            t
        })
        .collect()
}

#[async_trait]
impl BucketApi for MemoryBucketApi {
    async fn head_bucket(&self, bucket: &str) -> S3Result<()> {
        self.enter("HeadBucket", bucket)?;
        if self.buckets.contains_key(bucket) {
            Ok(())
        } else {
            // HEAD responses carry no body, so only the status is known.
            Err(missing(S3ErrorCode::NotFound, bucket))
        }
    }

    async fn create_bucket(&self, input: &CreateBucketInput) -> S3Result<()> {
        self.enter("CreateBucket", &input.bucket)?;
        validate_bucket_name(&input.bucket).map_err(|e| {
            S3Error::with_message(S3ErrorCode::InvalidBucketName, e.reason)
                .with_resource(&input.bucket)
        })?;

        let region = match input.location_constraint.as_deref() {
            Some(DEFAULT_REGION) => {
                return Err(S3Error::new(S3ErrorCode::InvalidLocationConstraint)
                    .with_resource(&input.bucket));
            }
            Some(region) if !region.is_empty() => region.to_owned(),
            _ => DEFAULT_REGION.to_owned(),
        };

        let Entry::Vacant(slot) = self.buckets.entry(input.bucket.clone()) else {
            return Err(S3Error::bucket_already_owned_by_you(&input.bucket));
        };

        let bucket = MemoryBucket::new(input.bucket.clone(), region);
        if input.object_lock_enabled_for_bucket {
            *bucket.object_lock_enabled.write() = true;
            *bucket.object_lock.write() = Some(ObjectLockConfiguration {
                object_lock_enabled: Some(ObjectLockEnabled::Enabled),
                rule: None,
            });
            bucket.versioning.write().status = Some(BucketVersioningStatus::Enabled);
        }
        *bucket.acl.write() = input.acl;
        *bucket.grants.write() = input.grants.clone();
        *bucket.ownership.write() = input.object_ownership;
        *bucket.tags.write() = self.options.system_tags.clone();
        if self.options.default_encryption {
            *bucket.encryption.write() = Some(default_encryption());
        }

        info!(bucket = %input.bucket, region = %bucket.region, "created bucket");
        slot.insert(Arc::new(bucket));
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> S3Result<()> {
        self.enter("DeleteBucket", bucket)?;
        self.buckets
            .remove(bucket)
            .ok_or_else(|| S3Error::no_such_bucket(bucket))?;
        info!(bucket, "deleted bucket");
        Ok(())
    }

    async fn put_bucket_acl(&self, input: &PutBucketAclInput) -> S3Result<()> {
        let b = self.call("PutBucketAcl", &input.bucket)?;
        let private = matches!(input.acl, None | Some(BucketCannedAcl::Private));
        if b.acls_disabled() && !(private && input.grants.is_empty()) {
            return Err(S3Error::new(S3ErrorCode::AccessControlListNotSupported)
                .with_resource(&input.bucket));
        }
        *b.acl.write() = input.acl;
        *b.grants.write() = input.grants.clone();
        Ok(())
    }

    async fn put_bucket_ownership_controls(
        &self,
        bucket: &str,
        ownership: ObjectOwnership,
    ) -> S3Result<()> {
        let b = self.call("PutBucketOwnershipControls", bucket)?;
        *b.ownership.write() = Some(ownership);
        Ok(())
    }

    async fn get_bucket_versioning(&self, bucket: &str) -> S3Result<VersioningConfiguration> {
        let b = self.call("GetBucketVersioning", bucket)?;
        Ok(b.versioning.read().clone())
    }

    async fn put_bucket_versioning(
        &self,
        bucket: &str,
        config: &VersioningConfiguration,
    ) -> S3Result<()> {
        let b = self.call("PutBucketVersioning", bucket)?;
        if *b.object_lock_enabled.read()
            && config.status == Some(BucketVersioningStatus::Suspended)
        {
            return Err(S3Error::with_message(
                S3ErrorCode::InvalidBucketState,
                "versioning cannot be suspended on a bucket with object lock",
            )
            .with_resource(bucket));
        }
        let mut current = b.versioning.write();
        if config.status.is_some() {
            current.status = config.status;
        }
        if config.mfa_delete.is_some() {
            current.mfa_delete = config.mfa_delete;
        }
        Ok(())
    }

    async fn get_bucket_accelerate_configuration(
        &self,
        bucket: &str,
    ) -> S3Result<AccelerateConfiguration> {
        let b = self.call("GetBucketAccelerateConfiguration", bucket)?;
        self.acceleration_supported(&b)?;
        Ok(b.accelerate.read().clone())
    }

    async fn put_bucket_accelerate_configuration(
        &self,
        bucket: &str,
        config: &AccelerateConfiguration,
    ) -> S3Result<()> {
        let b = self.call("PutBucketAccelerateConfiguration", bucket)?;
        self.acceleration_supported(&b)?;
        *b.accelerate.write() = config.clone();
        Ok(())
    }

    async fn get_bucket_logging(&self, bucket: &str) -> S3Result<BucketLoggingStatus> {
        let b = self.call("GetBucketLogging", bucket)?;
        Ok(b.logging.read().clone())
    }

    async fn put_bucket_logging(
        &self,
        bucket: &str,
        status: &BucketLoggingStatus,
    ) -> S3Result<()> {
        let b = self.call("PutBucketLogging", bucket)?;
        if let Some(enabled) = &status.logging_enabled {
            if !self.buckets.contains_key(&enabled.target_bucket) {
                return Err(S3Error::new(S3ErrorCode::InvalidTargetBucketForLogging)
                    .with_resource(&enabled.target_bucket));
            }
        }
        *b.logging.write() = status.clone();
        Ok(())
    }

    async fn get_bucket_notification_configuration(
        &self,
        bucket: &str,
    ) -> S3Result<NotificationConfiguration> {
        let b = self.call("GetBucketNotificationConfiguration", bucket)?;
        Ok(b.notification.read().clone())
    }

    async fn put_bucket_notification_configuration(
        &self,
        bucket: &str,
        config: &NotificationConfiguration,
    ) -> S3Result<()> {
        let b = self.call("PutBucketNotificationConfiguration", bucket)?;
        *b.notification.write() = NotificationConfiguration {
            topic_configurations: assign_ids(&config.topic_configurations),
            queue_configurations: assign_ids(&config.queue_configurations),
            lambda_function_configurations: assign_ids(&config.lambda_function_configurations),
        };
        Ok(())
    }

    async fn get_bucket_request_payment(
        &self,
        bucket: &str,
    ) -> S3Result<RequestPaymentConfiguration> {
        let b = self.call("GetBucketRequestPayment", bucket)?;
        Ok(RequestPaymentConfiguration {
            payer: *b.payer.read(),
        })
    }

    async fn put_bucket_request_payment(
        &self,
        bucket: &str,
        config: &RequestPaymentConfiguration,
    ) -> S3Result<()> {
        let b = self.call("PutBucketRequestPayment", bucket)?;
        *b.payer.write() = config.payer;
        Ok(())
    }

    async fn get_object_lock_configuration(
        &self,
        bucket: &str,
    ) -> S3Result<ObjectLockConfiguration> {
        let b = self.call("GetObjectLockConfiguration", bucket)?;
        b.object_lock
            .read()
            .clone()
            .ok_or_else(|| missing(S3ErrorCode::ObjectLockConfigurationNotFoundError, bucket))
    }

    async fn put_object_lock_configuration(
        &self,
        bucket: &str,
        config: &ObjectLockConfiguration,
    ) -> S3Result<()> {
        let b = self.call("PutObjectLockConfiguration", bucket)?;
        let enabling = config.object_lock_enabled == Some(ObjectLockEnabled::Enabled);
        let enabled = *b.object_lock_enabled.read();
        if !enabled && !(enabling && b.is_versioning_enabled()) {
            return Err(S3Error::with_message(
                S3ErrorCode::InvalidBucketState,
                "object lock requires a versioned bucket",
            )
            .with_resource(bucket));
        }
        *b.object_lock_enabled.write() = true;
        *b.object_lock.write() = Some(ObjectLockConfiguration {
            object_lock_enabled: Some(ObjectLockEnabled::Enabled),
            rule: config.rule.clone(),
        });
        Ok(())
    }

    async fn get_bucket_cors(&self, bucket: &str) -> S3Result<CorsConfiguration> {
        let b = self.call("GetBucketCors", bucket)?;
        b.cors
            .read()
            .clone()
            .ok_or_else(|| missing(S3ErrorCode::NoSuchCORSConfiguration, bucket))
    }

    async fn put_bucket_cors(&self, bucket: &str, config: &CorsConfiguration) -> S3Result<()> {
        let b = self.call("PutBucketCors", bucket)?;
        if config.cors_rules.is_empty() {
            return Err(malformed("CORS configuration must contain at least one rule"));
        }
        *b.cors.write() = Some(config.clone());
        Ok(())
    }

    async fn delete_bucket_cors(&self, bucket: &str) -> S3Result<()> {
        let b = self.call("DeleteBucketCors", bucket)?;
        *b.cors.write() = None;
        Ok(())
    }

    async fn get_bucket_lifecycle_configuration(
        &self,
        bucket: &str,
    ) -> S3Result<LifecycleConfiguration> {
        let b = self.call("GetBucketLifecycleConfiguration", bucket)?;
        b.lifecycle
            .read()
            .clone()
            .ok_or_else(|| missing(S3ErrorCode::NoSuchLifecycleConfiguration, bucket))
    }

    async fn put_bucket_lifecycle_configuration(
        &self,
        bucket: &str,
        config: &LifecycleConfiguration,
    ) -> S3Result<()> {
        let b = self.call("PutBucketLifecycleConfiguration", bucket)?;
        if config.rules.is_empty() {
            return Err(malformed("lifecycle configuration must contain at least one rule"));
        }
        *b.lifecycle.write() = Some(config.clone());
        Ok(())
    }

    async fn delete_bucket_lifecycle(&self, bucket: &str) -> S3Result<()> {
        let b = self.call("DeleteBucketLifecycle", bucket)?;
        *b.lifecycle.write() = None;
        Ok(())
    }

    async fn get_bucket_replication(&self, bucket: &str) -> S3Result<ReplicationConfiguration> {
        let b = self.call("GetBucketReplication", bucket)?;
        b.replication
            .read()
            .clone()
            .ok_or_else(|| missing(S3ErrorCode::ReplicationConfigurationNotFoundError, bucket))
    }

    async fn put_bucket_replication(
        &self,
        bucket: &str,
        config: &ReplicationConfiguration,
    ) -> S3Result<()> {
        let b = self.call("PutBucketReplication", bucket)?;
        if !b.is_versioning_enabled() {
            return Err(S3Error::invalid_request(
                "Versioning must be 'Enabled' on the bucket to apply a replication configuration",
            )
            .with_resource(bucket));
        }
        if config.rules.is_empty() {
            return Err(malformed("replication configuration must contain at least one rule"));
        }
        *b.replication.write() = Some(config.clone());
        Ok(())
    }

    async fn delete_bucket_replication(&self, bucket: &str) -> S3Result<()> {
        let b = self.call("DeleteBucketReplication", bucket)?;
        *b.replication.write() = None;
        Ok(())
    }

    async fn get_bucket_encryption(
        &self,
        bucket: &str,
    ) -> S3Result<ServerSideEncryptionConfiguration> {
        let b = self.call("GetBucketEncryption", bucket)?;
        b.encryption.read().clone().ok_or_else(|| {
            missing(
                S3ErrorCode::ServerSideEncryptionConfigurationNotFoundError,
                bucket,
            )
        })
    }

    async fn put_bucket_encryption(
        &self,
        bucket: &str,
        config: &ServerSideEncryptionConfiguration,
    ) -> S3Result<()> {
        let b = self.call("PutBucketEncryption", bucket)?;
        if config.rules.is_empty() {
            return Err(malformed("encryption configuration must contain at least one rule"));
        }
        *b.encryption.write() = Some(config.clone());
        Ok(())
    }

    async fn delete_bucket_encryption(&self, bucket: &str) -> S3Result<()> {
        let b = self.call("DeleteBucketEncryption", bucket)?;
        *b.encryption.write() = self.options.default_encryption.then(default_encryption);
        Ok(())
    }

    async fn get_bucket_tagging(&self, bucket: &str) -> S3Result<Tagging> {
        let b = self.call("GetBucketTagging", bucket)?;
        let tags = b.tags.read();
        if tags.is_empty() {
            return Err(missing(S3ErrorCode::NoSuchTagSet, bucket));
        }
        Ok(Tagging {
            tag_set: tags.clone(),
        })
    }

    async fn put_bucket_tagging(&self, bucket: &str, tagging: &Tagging) -> S3Result<()> {
        let b = self.call("PutBucketTagging", bucket)?;
        let mut tags = b.tags.write();
        let current_system: Vec<&Tag> = tags.iter().filter(|t| is_system_tag(&t.key)).collect();

        // System tags may be re-sent unchanged but never added, changed or dropped.
        let tampered = tagging
            .tag_set
            .iter()
            .filter(|t| is_system_tag(&t.key))
            .any(|t| !current_system.contains(&t))
            || current_system.iter().any(|t| !tagging.tag_set.contains(t));
        if tampered {
            return Err(S3Error::with_message(
                S3ErrorCode::InvalidTag,
                "System tags cannot be added, updated or removed by requester",
            )
            .with_resource(bucket));
        }
        *tags = tagging.tag_set.clone();
        Ok(())
    }

    async fn delete_bucket_tagging(&self, bucket: &str) -> S3Result<()> {
        let b = self.call("DeleteBucketTagging", bucket)?;
        let mut tags = b.tags.write();
        if tags.iter().any(|t| is_system_tag(&t.key)) {
            return Err(S3Error::with_message(
                S3ErrorCode::InvalidTag,
                "System tags cannot be removed by requester",
            )
            .with_resource(bucket));
        }
        tags.clear();
        Ok(())
    }

    async fn get_bucket_website(&self, bucket: &str) -> S3Result<WebsiteConfiguration> {
        let b = self.call("GetBucketWebsite", bucket)?;
        b.website
            .read()
            .clone()
            .ok_or_else(|| missing(S3ErrorCode::NoSuchWebsiteConfiguration, bucket))
    }

    async fn put_bucket_website(
        &self,
        bucket: &str,
        config: &WebsiteConfiguration,
    ) -> S3Result<()> {
        let b = self.call("PutBucketWebsite", bucket)?;
        if config.index_document.is_none() && config.redirect_all_requests_to.is_none() {
            return Err(S3Error::with_message(
                S3ErrorCode::InvalidArgument,
                "A value for IndexDocument Suffix must be provided if RedirectAllRequestsTo is \
                 empty",
            ));
        }
        *b.website.write() = Some(config.clone());
        Ok(())
    }

    async fn delete_bucket_website(&self, bucket: &str) -> S3Result<()> {
        let b = self.call("DeleteBucketWebsite", bucket)?;
        *b.website.write() = None;
        Ok(())
    }

    async fn get_public_access_block(
        &self,
        bucket: &str,
    ) -> S3Result<PublicAccessBlockConfiguration> {
        let b = self.call("GetPublicAccessBlock", bucket)?;
        b.public_access_block
            .read()
            .clone()
            .ok_or_else(|| missing(S3ErrorCode::NoSuchPublicAccessBlockConfiguration, bucket))
    }

    async fn put_public_access_block(
        &self,
        bucket: &str,
        config: &PublicAccessBlockConfiguration,
    ) -> S3Result<()> {
        let b = self.call("PutPublicAccessBlock", bucket)?;
        *b.public_access_block.write() = Some(config.clone());
        Ok(())
    }

    async fn delete_public_access_block(&self, bucket: &str) -> S3Result<()> {
        let b = self.call("DeletePublicAccessBlock", bucket)?;
        *b.public_access_block.write() = None;
        Ok(())
    }

    async fn get_bucket_policy(&self, bucket: &str) -> S3Result<String> {
        let b = self.call("GetBucketPolicy", bucket)?;
        b.policy
            .read()
            .clone()
            .ok_or_else(|| missing(S3ErrorCode::NoSuchBucketPolicy, bucket))
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> S3Result<()> {
        let b = self.call("PutBucketPolicy", bucket)?;
        let parsed: serde_json::Value = serde_json::from_str(policy)
            .map_err(|e| S3Error::with_message(S3ErrorCode::MalformedPolicy, e.to_string()))?;
        if !parsed.is_object() {
            return Err(S3Error::with_message(
                S3ErrorCode::MalformedPolicy,
                "policy must be a JSON object",
            ));
        }
        *b.policy.write() = Some(policy.to_owned());
        Ok(())
    }

    async fn delete_bucket_policy(&self, bucket: &str) -> S3Result<()> {
        let b = self.call("DeleteBucketPolicy", bucket)?;
        *b.policy.write() = None;
        Ok(())
    }
}
