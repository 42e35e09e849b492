//! Table tags.
//!
//! Tagging is keyed by ARN and is incremental: new or changed user tags go
//! out in one TagResource, stale keys in one UntagResource. `aws:` tags are
//! owned by the provider and never touched.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use rustack_dynamodb_model::Table;
use rustack_dynamodb_model::types::Tag;
use rustack_provider_core::{
    ProviderError, ProviderResult, ResourceStatus, Subresource, SubresourceDeleter,
};

use super::{describe, params};
use crate::api::TableApi;
use crate::validation::validate_tags;

const ERR_LIST: &str = "cannot list table tags";
const ERR_TAG: &str = "cannot tag table";
const ERR_UNTAG: &str = "cannot untag table";

/// Reconciles `tags`.
#[derive(Debug)]
pub struct TagsClient {
    api: Arc<dyn TableApi>,
}

/// Tag changes that bring the observed user tags to the desired ones.
#[derive(Debug, Default, PartialEq, Eq)]
struct TagDiff {
    add: Vec<Tag>,
    remove: Vec<String>,
}

impl TagDiff {
    fn new(desired: &[Tag], observed: &[Tag]) -> Self {
        let current: BTreeMap<&str, &str> = observed
            .iter()
            .filter(|t| !t.is_system())
            .map(|t| (t.key.as_str(), t.value.as_str()))
            .collect();
        let wanted: BTreeMap<&str, &str> = desired
            .iter()
            .map(|t| (t.key.as_str(), t.value.as_str()))
            .collect();

        let add = wanted
            .iter()
            .filter(|(k, v)| current.get(*k) != Some(*v))
            .map(|(k, v)| Tag::new(*k, *v))
            .collect();
        let remove = current
            .keys()
            .filter(|k| !wanted.contains_key(*k))
            .map(|k| (*k).to_owned())
            .collect();
        Self { add, remove }
    }

    fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

impl TagsClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn TableApi>) -> Self {
        Self { api }
    }

    /// The observed ARN, describing the table when it is not known yet.
    async fn arn(&self, table: &Table) -> ProviderResult<String> {
        match &table.status.at_provider.arn {
            Some(arn) => Ok(arn.clone()),
            None => Ok(describe(self.api.as_ref(), table).await?.table_arn),
        }
    }

    async fn fetch(&self, arn: &str) -> ProviderResult<Vec<Tag>> {
        self.api
            .list_tags_of_resource(arn)
            .await
            .map_err(|e| ProviderError::api(ERR_LIST, e))
    }

    async fn converge(&self, arn: &str, diff: &TagDiff) -> ProviderResult<()> {
        if !diff.remove.is_empty() {
            self.api
                .untag_resource(arn, &diff.remove)
                .await
                .map_err(|e| ProviderError::api(ERR_UNTAG, e))?;
        }
        if !diff.add.is_empty() {
            self.api
                .tag_resource(arn, &diff.add)
                .await
                .map_err(|e| ProviderError::api(ERR_TAG, e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl Subresource<Table> for TagsClient {
    fn name(&self) -> &'static str {
        "tags"
    }

    async fn observe(&self, table: &Table) -> ProviderResult<ResourceStatus> {
        let arn = self.arn(table).await?;
        let observed = self.fetch(&arn).await?;
        let desired = params(table).tags.as_deref().unwrap_or_default();
        let diff = TagDiff::new(desired, &observed);
        Ok(match &params(table).tags {
            _ if diff.is_empty() => ResourceStatus::Updated,
            None => ResourceStatus::NeedsDeletion,
            Some(_) => ResourceStatus::NeedsUpdate,
        })
    }

    async fn create_or_update(&self, table: &Table) -> ProviderResult<()> {
        let Some(desired) = &params(table).tags else {
            return Ok(());
        };
        validate_tags(desired)?;
        let arn = self.arn(table).await?;
        let observed = self.fetch(&arn).await?;
        self.converge(&arn, &TagDiff::new(desired, &observed)).await
    }

    // Unset tags mean "no user tags", never "adopt whatever is there".
    async fn late_initialize(&self, _table: &mut Table) -> ProviderResult<()> {
        Ok(())
    }

    fn subresource_exists(&self, table: &Table) -> bool {
        params(table).tags.is_some()
    }

    fn late_initializes(&self) -> bool {
        false
    }

    fn deleter(&self) -> Option<&dyn SubresourceDeleter<Table>> {
        Some(self)
    }
}

#[async_trait]
impl SubresourceDeleter<Table> for TagsClient {
    /// Removes every user tag.
    async fn delete(&self, table: &Table) -> ProviderResult<()> {
        let arn = self.arn(table).await?;
        let observed = self.fetch(&arn).await?;
        self.converge(&arn, &TagDiff::new(&[], &observed)).await
    }
}
