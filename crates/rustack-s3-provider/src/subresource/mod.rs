//! The fourteen bucket sub-resources.
//!
//! Each client owns one aspect of a bucket and talks to the provider only
//! through [`BucketApi`]. [`bucket_subresources`] returns them in reconcile
//! order; versioning must come before replication because S3 rejects a
//! replication configuration on an unversioned bucket.

mod acceleration;
mod cors;
mod encryption;
mod lifecycle;
mod logging;
mod notification;
mod object_lock;
mod policy;
mod public_access_block;
mod replication;
mod request_payment;
mod tagging;
mod versioning;
mod website;

use std::sync::Arc;

use rustack_provider_core::{ProviderError, ProviderResult, Subresource, SubresourceSet};
use rustack_s3_model::{Bucket, BucketParameters, S3ErrorCode};

pub use self::acceleration::AccelerationClient;
pub use self::cors::CorsClient;
pub use self::encryption::EncryptionClient;
pub use self::lifecycle::LifecycleClient;
pub use self::logging::LoggingClient;
pub use self::notification::NotificationClient;
pub use self::object_lock::ObjectLockClient;
pub use self::policy::PolicyClient;
pub use self::public_access_block::PublicAccessBlockClient;
pub use self::replication::ReplicationClient;
pub use self::request_payment::RequestPaymentClient;
pub use self::tagging::TaggingClient;
pub use self::versioning::VersioningClient;
pub use self::website::WebsiteClient;
use crate::api::{BucketApi, S3Result};

/// Build the ordered sub-resource set of a bucket.
#[must_use]
pub fn bucket_subresources(api: &Arc<dyn BucketApi>) -> SubresourceSet<Bucket> {
    SubresourceSet::new(ordered(api))
}

fn ordered(api: &Arc<dyn BucketApi>) -> Vec<Box<dyn Subresource<Bucket>>> {
    vec![
        Box::new(VersioningClient::new(Arc::clone(api))),
        Box::new(AccelerationClient::new(Arc::clone(api))),
        Box::new(CorsClient::new(Arc::clone(api))),
        Box::new(LifecycleClient::new(Arc::clone(api))),
        Box::new(LoggingClient::new(Arc::clone(api))),
        Box::new(NotificationClient::new(Arc::clone(api))),
        Box::new(ReplicationClient::new(Arc::clone(api))),
        Box::new(RequestPaymentClient::new(Arc::clone(api))),
        Box::new(EncryptionClient::new(Arc::clone(api))),
        Box::new(TaggingClient::new(Arc::clone(api))),
        Box::new(WebsiteClient::new(Arc::clone(api))),
        Box::new(PublicAccessBlockClient::new(Arc::clone(api))),
        Box::new(PolicyClient::new(Arc::clone(api))),
        Box::new(ObjectLockClient::new(Arc::clone(api))),
    ]
}

/// Provider-side name of the bucket.
pub(crate) fn bucket_name(bucket: &Bucket) -> &str {
    bucket.metadata.external_name()
}

pub(crate) fn params(bucket: &Bucket) -> &BucketParameters {
    &bucket.spec.for_provider
}

pub(crate) fn params_mut(bucket: &mut Bucket) -> &mut BucketParameters {
    &mut bucket.spec.for_provider
}

/// Map the "not configured" answer of a GET to `None`.
pub(crate) fn optional<T>(
    result: S3Result<T>,
    not_configured: &S3ErrorCode,
    context: &'static str,
) -> ProviderResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_code(not_configured) => Ok(None),
        Err(err) => Err(ProviderError::api(context, err)),
    }
}

/// Treat the "not configured" answer of a DELETE as success.
pub(crate) fn ignore_missing(
    result: S3Result<()>,
    not_configured: &S3ErrorCode,
    context: &'static str,
) -> ProviderResult<()> {
    optional(result, not_configured, context).map(|_| ())
}
