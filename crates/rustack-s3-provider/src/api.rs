//! The bucket capability set.
//!
//! [`BucketApi`] is the only surface the reconcilers talk to. It has one
//! method per provider call the engine needs and nothing else: bucket head,
//! create, delete, ACL and ownership controls, plus the get/put(/delete) set
//! of every sub-resource. Sub-resources without a provider delete API have no
//! delete method here.

use std::fmt::Debug;

use async_trait::async_trait;
use rustack_s3_model::S3Error;
use rustack_s3_model::types::{
    AccelerateConfiguration, BucketLoggingStatus, CorsConfiguration, CreateBucketInput,
    LifecycleConfiguration, NotificationConfiguration, ObjectLockConfiguration, ObjectOwnership,
    PublicAccessBlockConfiguration, PutBucketAclInput, ReplicationConfiguration,
    RequestPaymentConfiguration, ServerSideEncryptionConfiguration, Tagging,
    VersioningConfiguration, WebsiteConfiguration,
};

/// Result of a bucket API call.
pub type S3Result<T> = Result<T, S3Error>;

/// Every bucket call the reconcilers make.
#[async_trait]
pub trait BucketApi: Send + Sync + Debug {
    // -- bucket level --

    /// HeadBucket. A missing bucket is a 404 error.
    async fn head_bucket(&self, bucket: &str) -> S3Result<()>;
    /// CreateBucket.
    async fn create_bucket(&self, input: &CreateBucketInput) -> S3Result<()>;
    /// DeleteBucket.
    async fn delete_bucket(&self, bucket: &str) -> S3Result<()>;
    /// PutBucketAcl.
    async fn put_bucket_acl(&self, input: &PutBucketAclInput) -> S3Result<()>;
    /// PutBucketOwnershipControls.
    async fn put_bucket_ownership_controls(
        &self,
        bucket: &str,
        ownership: ObjectOwnership,
    ) -> S3Result<()>;

    // -- no delete API --

    /// GetBucketVersioning.
    async fn get_bucket_versioning(&self, bucket: &str) -> S3Result<VersioningConfiguration>;
    /// PutBucketVersioning.
    async fn put_bucket_versioning(
        &self,
        bucket: &str,
        config: &VersioningConfiguration,
    ) -> S3Result<()>;

    /// GetBucketAccelerateConfiguration.
    async fn get_bucket_accelerate_configuration(
        &self,
        bucket: &str,
    ) -> S3Result<AccelerateConfiguration>;
    /// PutBucketAccelerateConfiguration.
    async fn put_bucket_accelerate_configuration(
        &self,
        bucket: &str,
        config: &AccelerateConfiguration,
    ) -> S3Result<()>;

    /// GetBucketLogging.
    async fn get_bucket_logging(&self, bucket: &str) -> S3Result<BucketLoggingStatus>;
    /// PutBucketLogging. An empty status turns logging off.
    async fn put_bucket_logging(&self, bucket: &str, status: &BucketLoggingStatus)
    -> S3Result<()>;

    /// GetBucketNotificationConfiguration.
    async fn get_bucket_notification_configuration(
        &self,
        bucket: &str,
    ) -> S3Result<NotificationConfiguration>;
    /// PutBucketNotificationConfiguration.
    async fn put_bucket_notification_configuration(
        &self,
        bucket: &str,
        config: &NotificationConfiguration,
    ) -> S3Result<()>;

    /// GetBucketRequestPayment.
    async fn get_bucket_request_payment(
        &self,
        bucket: &str,
    ) -> S3Result<RequestPaymentConfiguration>;
    /// PutBucketRequestPayment.
    async fn put_bucket_request_payment(
        &self,
        bucket: &str,
        config: &RequestPaymentConfiguration,
    ) -> S3Result<()>;

    /// GetObjectLockConfiguration.
    async fn get_object_lock_configuration(
        &self,
        bucket: &str,
    ) -> S3Result<ObjectLockConfiguration>;
    /// PutObjectLockConfiguration.
    async fn put_object_lock_configuration(
        &self,
        bucket: &str,
        config: &ObjectLockConfiguration,
    ) -> S3Result<()>;

    // -- with delete API --

    /// GetBucketCors.
    async fn get_bucket_cors(&self, bucket: &str) -> S3Result<CorsConfiguration>;
    /// PutBucketCors.
    async fn put_bucket_cors(&self, bucket: &str, config: &CorsConfiguration) -> S3Result<()>;
    /// DeleteBucketCors.
    async fn delete_bucket_cors(&self, bucket: &str) -> S3Result<()>;

    /// GetBucketLifecycleConfiguration.
    async fn get_bucket_lifecycle_configuration(
        &self,
        bucket: &str,
    ) -> S3Result<LifecycleConfiguration>;
    /// PutBucketLifecycleConfiguration.
    async fn put_bucket_lifecycle_configuration(
        &self,
        bucket: &str,
        config: &LifecycleConfiguration,
    ) -> S3Result<()>;
    /// DeleteBucketLifecycle.
    async fn delete_bucket_lifecycle(&self, bucket: &str) -> S3Result<()>;

    /// GetBucketReplication.
    async fn get_bucket_replication(&self, bucket: &str) -> S3Result<ReplicationConfiguration>;
    /// PutBucketReplication.
    async fn put_bucket_replication(
        &self,
        bucket: &str,
        config: &ReplicationConfiguration,
    ) -> S3Result<()>;
    /// DeleteBucketReplication.
    async fn delete_bucket_replication(&self, bucket: &str) -> S3Result<()>;

    /// GetBucketEncryption.
    async fn get_bucket_encryption(
        &self,
        bucket: &str,
    ) -> S3Result<ServerSideEncryptionConfiguration>;
    /// PutBucketEncryption.
    async fn put_bucket_encryption(
        &self,
        bucket: &str,
        config: &ServerSideEncryptionConfiguration,
    ) -> S3Result<()>;
    /// DeleteBucketEncryption.
    async fn delete_bucket_encryption(&self, bucket: &str) -> S3Result<()>;

    /// GetBucketTagging.
    async fn get_bucket_tagging(&self, bucket: &str) -> S3Result<Tagging>;
    /// PutBucketTagging. Replaces the whole tag set.
    async fn put_bucket_tagging(&self, bucket: &str, tagging: &Tagging) -> S3Result<()>;
    /// DeleteBucketTagging.
    async fn delete_bucket_tagging(&self, bucket: &str) -> S3Result<()>;

    /// GetBucketWebsite.
    async fn get_bucket_website(&self, bucket: &str) -> S3Result<WebsiteConfiguration>;
    /// PutBucketWebsite.
    async fn put_bucket_website(&self, bucket: &str, config: &WebsiteConfiguration)
    -> S3Result<()>;
    /// DeleteBucketWebsite.
    async fn delete_bucket_website(&self, bucket: &str) -> S3Result<()>;

    /// GetPublicAccessBlock.
    async fn get_public_access_block(
        &self,
        bucket: &str,
    ) -> S3Result<PublicAccessBlockConfiguration>;
    /// PutPublicAccessBlock.
    async fn put_public_access_block(
        &self,
        bucket: &str,
        config: &PublicAccessBlockConfiguration,
    ) -> S3Result<()>;
    /// DeletePublicAccessBlock.
    async fn delete_public_access_block(&self, bucket: &str) -> S3Result<()>;

    /// GetBucketPolicy. Returns the policy JSON document.
    async fn get_bucket_policy(&self, bucket: &str) -> S3Result<String>;
    /// PutBucketPolicy.
    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> S3Result<()>;
    /// DeleteBucketPolicy.
    async fn delete_bucket_policy(&self, bucket: &str) -> S3Result<()>;
}
