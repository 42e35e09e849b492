//! Per-bucket state held by the in-memory adapter.
//!
//! Every configuration sits behind its own `parking_lot::RwLock` so a shared
//! `DashMap` reference is enough to read or replace it. Configurations the
//! provider reports as "not configured" are `Option`s; the ones that always
//! have a value (versioning, acceleration, logging, notification, payer)
//! start from their provider defaults.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rustack_s3_model::types::{
    AccelerateConfiguration, AclGrants, BucketCannedAcl, BucketLoggingStatus,
    BucketVersioningStatus, CorsConfiguration, LifecycleConfiguration, NotificationConfiguration, ObjectLockConfiguration,
    ObjectOwnership, Payer, PublicAccessBlockConfiguration, ReplicationConfiguration,
    ServerSideEncryption, ServerSideEncryptionByDefault, ServerSideEncryptionConfiguration,
    ServerSideEncryptionRule, Tag, VersioningConfiguration, WebsiteConfiguration,
};

/// One bucket and all its configuration.
pub struct MemoryBucket {
    /// Bucket name.
    pub name: String,
    /// Region the bucket was created in.
    pub region: String,
    /// Creation time.
    pub creation_date: DateTime<Utc>,

    /// Whether object lock is on.
    pub object_lock_enabled: RwLock<bool>,
    /// Canned ACL.
    pub acl: RwLock<Option<BucketCannedAcl>>,
    /// Explicit grants.
    pub grants: RwLock<AclGrants>,
    /// Ownership controls.
    pub ownership: RwLock<Option<ObjectOwnership>>,

    /// Versioning.
    pub versioning: RwLock<VersioningConfiguration>,
    /// Transfer acceleration.
    pub accelerate: RwLock<AccelerateConfiguration>,
    /// Server access logging.
    pub logging: RwLock<BucketLoggingStatus>,
    /// Event notifications.
    pub notification: RwLock<NotificationConfiguration>,
    /// Request payer.
    pub payer: RwLock<Payer>,
    /// Object lock configuration beyond the on/off switch.
    pub object_lock: RwLock<Option<ObjectLockConfiguration>>,

    /// CORS rules.
    pub cors: RwLock<Option<CorsConfiguration>>,
    /// Lifecycle rules.
    pub lifecycle: RwLock<Option<LifecycleConfiguration>>,
    /// Replication.
    pub replication: RwLock<Option<ReplicationConfiguration>>,
    /// Default encryption.
    pub encryption: RwLock<Option<ServerSideEncryptionConfiguration>>,
    /// Tags, including system tags.
    pub tags: RwLock<Vec<Tag>>,
    /// Static website hosting.
    pub website: RwLock<Option<WebsiteConfiguration>>,
    /// Public access block.
    pub public_access_block: RwLock<Option<PublicAccessBlockConfiguration>>,
    /// Policy document.
    pub policy: RwLock<Option<String>>,
}

impl std::fmt::Debug for MemoryBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBucket")
            .field("name", &self.name)
            .field("region", &self.region)
            .field("versioning", &self.versioning.read().status)
            .finish_non_exhaustive()
    }
}

impl MemoryBucket {
    /// Create a bucket with provider defaults.
    #[must_use]
    pub fn new(name: String, region: String) -> Self {
        Self {
            name,
            region,
            creation_date: Utc::now(),
            object_lock_enabled: RwLock::new(false),
            acl: RwLock::new(None),
            grants: RwLock::new(AclGrants::default()),
            ownership: RwLock::new(None),
            versioning: RwLock::new(VersioningConfiguration::default()),
            accelerate: RwLock::new(AccelerateConfiguration::default()),
            logging: RwLock::new(BucketLoggingStatus::default()),
            notification: RwLock::new(NotificationConfiguration::default()),
            payer: RwLock::new(Payer::BucketOwner),
            object_lock: RwLock::new(None),
            cors: RwLock::new(None),
            lifecycle: RwLock::new(None),
            replication: RwLock::new(None),
            encryption: RwLock::new(None),
            tags: RwLock::new(Vec::new()),
            website: RwLock::new(None),
            public_access_block: RwLock::new(None),
            policy: RwLock::new(None),
        }
    }

    /// Whether versioning is currently enabled.
    #[must_use]
    pub fn is_versioning_enabled(&self) -> bool {
        self.versioning.read().status == Some(BucketVersioningStatus::Enabled)
    }

    /// Whether ACLs are disabled by ownership controls.
    #[must_use]
    pub fn acls_disabled(&self) -> bool {
        *self.ownership.read() == Some(ObjectOwnership::BucketOwnerEnforced)
    }
}

/// The SSE-S3 configuration new buckets get when default encryption is on.
#[must_use]
pub fn default_encryption() -> ServerSideEncryptionConfiguration {
    ServerSideEncryptionConfiguration {
        rules: vec![ServerSideEncryptionRule {
            apply_server_side_encryption_by_default: Some(ServerSideEncryptionByDefault {
                sse_algorithm: ServerSideEncryption::Aes256,
                kms_master_key_id: None,
            }),
            bucket_key_enabled: Some(false),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_bucket_with_provider_defaults() {
        let bucket = MemoryBucket::new("acme-logs".into(), "us-east-1".into());
        assert!(!bucket.is_versioning_enabled());
        assert!(!bucket.acls_disabled());
        assert_eq!(*bucket.payer.read(), Payer::BucketOwner);
        assert!(bucket.cors.read().is_none());
        assert!(bucket.tags.read().is_empty());
    }

    #[test]
    fn test_should_debug_format_bucket() {
        let bucket = MemoryBucket::new("debug-bucket".into(), "eu-west-1".into());
        let debug_str = format!("{bucket:?}");
        assert!(debug_str.contains("debug-bucket"));
        assert!(debug_str.contains("MemoryBucket"));
    }
}
