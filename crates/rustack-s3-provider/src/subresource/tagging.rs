//! Bucket tags.
//!
//! The provider may attach `aws:` system tags that the caller can neither
//! change nor remove, and PutBucketTagging replaces the whole set. Drift is
//! therefore computed on user tags only, and every write re-sends the system
//! tags seen by the last observe.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustack_provider_core::{
    ProviderError, ProviderResult, ResourceStatus, Subresource, SubresourceDeleter,
};
use rustack_s3_model::types::{Tag, Tagging};
use rustack_s3_model::{Bucket, S3ErrorCode};

use super::{bucket_name, ignore_missing, optional, params};
use crate::api::BucketApi;
use crate::compare::{sort_tags, system_tags, user_tags, user_tags_equal};
use crate::validation::validate_tags;

const ERR_GET: &str = "cannot get bucket tagging";
const ERR_PUT: &str = "cannot put bucket tagging";
const ERR_DELETE: &str = "cannot delete bucket tagging";

/// Reconciles `tagging`.
#[derive(Debug)]
pub struct TaggingClient {
    api: Arc<dyn BucketApi>,
    /// Tag set seen by the last observe.
    observed: Mutex<Option<Vec<Tag>>>,
}

impl TaggingClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn BucketApi>) -> Self {
        Self {
            api,
            observed: Mutex::new(None),
        }
    }

    async fn fetch(&self, bucket: &Bucket) -> ProviderResult<Vec<Tag>> {
        let tags = optional(
            self.api.get_bucket_tagging(bucket_name(bucket)).await,
            &S3ErrorCode::NoSuchTagSet,
            ERR_GET,
        )?
        .map(|t| t.tag_set)
        .unwrap_or_default();
        *self.observed.lock() = Some(tags.clone());
        Ok(tags)
    }

    /// System tags from the last observe, fetching when nothing was observed.
    async fn current_system_tags(&self, bucket: &Bucket) -> ProviderResult<Vec<Tag>> {
        let memo = self.observed.lock().clone();
        let tags = match memo {
            Some(tags) => tags,
            None => self.fetch(bucket).await?,
        };
        Ok(system_tags(&tags))
    }

    async fn put(&self, bucket: &Bucket, mut tag_set: Vec<Tag>) -> ProviderResult<()> {
        sort_tags(&mut tag_set);
        let tagging = Tagging {
            tag_set: tag_set.clone(),
        };
        self.api
            .put_bucket_tagging(bucket_name(bucket), &tagging)
            .await
            .map_err(|e| ProviderError::api(ERR_PUT, e))?;
        *self.observed.lock() = Some(tag_set);
        Ok(())
    }
}

#[async_trait]
impl Subresource<Bucket> for TaggingClient {
    fn name(&self) -> &'static str {
        "tagging"
    }

    async fn observe(&self, bucket: &Bucket) -> ProviderResult<ResourceStatus> {
        let observed = self.fetch(bucket).await?;
        Ok(match &params(bucket).tagging {
            None if user_tags(&observed).is_empty() => ResourceStatus::Updated,
            None => ResourceStatus::NeedsDeletion,
            Some(desired) if user_tags_equal(&desired.tag_set, &observed) => {
                ResourceStatus::Updated
            }
            Some(_) => ResourceStatus::NeedsUpdate,
        })
    }

    async fn create_or_update(&self, bucket: &Bucket) -> ProviderResult<()> {
        let Some(desired) = &params(bucket).tagging else {
            return Ok(());
        };
        validate_tags(&desired.tag_set)?;
        let mut tag_set = user_tags(&desired.tag_set);
        tag_set.extend(self.current_system_tags(bucket).await?);
        if tag_set.is_empty() {
            return self.delete(bucket).await;
        }
        self.put(bucket, tag_set).await
    }

    // Unset tagging means "no user tags", never "adopt whatever is there".
    async fn late_initialize(&self, _bucket: &mut Bucket) -> ProviderResult<()> {
        Ok(())
    }

    fn subresource_exists(&self, bucket: &Bucket) -> bool {
        params(bucket).tagging.is_some()
    }

    fn late_initializes(&self) -> bool {
        false
    }

    fn deleter(&self) -> Option<&dyn SubresourceDeleter<Bucket>> {
        Some(self)
    }
}

#[async_trait]
impl SubresourceDeleter<Bucket> for TaggingClient {
    /// Removes user tags. System tags stay, so with any present this is a
    /// put of the system tags alone.
    async fn delete(&self, bucket: &Bucket) -> ProviderResult<()> {
        let system = self.current_system_tags(bucket).await?;
        if !system.is_empty() {
            return self.put(bucket, system).await;
        }
        ignore_missing(
            self.api.delete_bucket_tagging(bucket_name(bucket)).await,
            &S3ErrorCode::NoSuchTagSet,
            ERR_DELETE,
        )?;
        *self.observed.lock() = Some(Vec::new());
        Ok(())
    }
}
