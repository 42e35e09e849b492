//! Event notifications to SNS topics, SQS queues and Lambda functions.

use std::sync::Arc;

use async_trait::async_trait;
use rustack_provider_core::{ProviderError, ProviderResult, ResourceStatus, Subresource};
use rustack_s3_model::Bucket;
use rustack_s3_model::bucket::{NotificationConfigurationSpec, NotificationTargetSpec};
use rustack_s3_model::types::{NotificationConfiguration, NotificationTarget};

use super::{bucket_name, params, params_mut};
use crate::api::BucketApi;
use crate::compare::notification_targets_match;

const ERR_GET: &str = "cannot get bucket notification";
const ERR_PUT: &str = "cannot put bucket notification";

/// Reconciles `notificationConfiguration`.
#[derive(Debug)]
pub struct NotificationClient {
    api: Arc<dyn BucketApi>,
}

impl NotificationClient {
    /// Create a client.
    #[must_use]
    pub fn new(api: Arc<dyn BucketApi>) -> Self {
        Self { api }
    }

    async fn fetch(&self, bucket: &Bucket) -> ProviderResult<NotificationConfiguration> {
        self.api
            .get_bucket_notification_configuration(bucket_name(bucket))
            .await
            .map_err(|e| ProviderError::api(ERR_GET, e))
    }
}

fn target(spec: &NotificationTargetSpec) -> NotificationTarget {
    NotificationTarget {
        id: spec.id.clone(),
        arn: spec.arn.clone().unwrap_or_default(),
        events: spec.events.clone(),
        filter_rules: spec.filter_rules.clone(),
    }
}

fn targets(specs: &[NotificationTargetSpec]) -> Vec<NotificationTarget> {
    specs.iter().map(target).collect()
}

fn generate(spec: &NotificationConfigurationSpec) -> NotificationConfiguration {
    NotificationConfiguration {
        topic_configurations: targets(&spec.topic_configurations),
        queue_configurations: targets(&spec.queue_configurations),
        lambda_function_configurations: targets(&spec.lambda_function_configurations),
    }
}

fn matches(desired: &NotificationConfiguration, observed: &NotificationConfiguration) -> bool {
    notification_targets_match(&desired.topic_configurations, &observed.topic_configurations)
        && notification_targets_match(&desired.queue_configurations, &observed.queue_configurations)
        && notification_targets_match(
            &desired.lambda_function_configurations,
            &observed.lambda_function_configurations,
        )
}

/// Copy provider-assigned IDs into desired targets that have none.
fn adopt_ids(desired: &mut [NotificationTargetSpec], observed: &[NotificationTarget]) {
    for (spec, seen) in desired.iter_mut().zip(observed) {
        if spec.id.is_none() {
            spec.id.clone_from(&seen.id);
        }
    }
}

#[async_trait]
impl Subresource<Bucket> for NotificationClient {
    fn name(&self) -> &'static str {
        "notification"
    }

    async fn observe(&self, bucket: &Bucket) -> ProviderResult<ResourceStatus> {
        let observed = self.fetch(bucket).await?;
        Ok(match &params(bucket).notification_configuration {
            Some(desired) if !matches(&generate(desired), &observed) => {
                ResourceStatus::NeedsUpdate
            }
            _ => ResourceStatus::Updated,
        })
    }

    async fn create_or_update(&self, bucket: &Bucket) -> ProviderResult<()> {
        let Some(desired) = &params(bucket).notification_configuration else {
            return Ok(());
        };
        let unresolved = desired
            .topic_configurations
            .iter()
            .chain(&desired.queue_configurations)
            .chain(&desired.lambda_function_configurations)
            .any(|t| t.arn.as_deref().is_none_or(str::is_empty));
        if unresolved {
            return Err(ProviderError::configuration(
                "every notification target needs an arn",
            ));
        }
        self.api
            .put_bucket_notification_configuration(bucket_name(bucket), &generate(desired))
            .await
            .map_err(|e| ProviderError::api(ERR_PUT, e))
    }

    async fn late_initialize(&self, bucket: &mut Bucket) -> ProviderResult<()> {
        let observed = self.fetch(bucket).await?;
        let Some(desired) = params_mut(bucket).notification_configuration.as_mut() else {
            return Ok(());
        };
        adopt_ids(&mut desired.topic_configurations, &observed.topic_configurations);
        adopt_ids(&mut desired.queue_configurations, &observed.queue_configurations);
        adopt_ids(
            &mut desired.lambda_function_configurations,
            &observed.lambda_function_configurations,
        );
        Ok(())
    }

    fn subresource_exists(&self, bucket: &Bucket) -> bool {
        params(bucket).notification_configuration.is_some()
    }
}

#[cfg(test)]
mod tests {
    use rustack_s3_model::BucketParameters;
    use rustack_s3_model::types::{FilterRule, FilterRuleName};

    use super::*;
    use crate::subresource::testing::{bucket, store};

    const QUEUE: &str = "arn:aws:sqs:us-east-1:123456789012:uploads";

    fn queue(events: &[&str]) -> BucketParameters {
        BucketParameters {
            notification_configuration: Some(NotificationConfigurationSpec {
                queue_configurations: vec![NotificationTargetSpec {
                    arn: Some(QUEUE.into()),
                    events: events.iter().map(|e| (*e).to_owned()).collect(),
                    filter_rules: vec![FilterRule {
                        name: FilterRuleName::Suffix,
                        value: ".jpg".into(),
                    }],
                    ..NotificationTargetSpec::default()
                }],
                ..NotificationConfigurationSpec::default()
            }),
            ..BucketParameters::default()
        }
    }

    #[tokio::test]
    async fn test_should_converge_and_adopt_assigned_id() {
        let (_, api) = store().await;
        let client = NotificationClient::new(api);
        let mut b = bucket(queue(&["s3:ObjectCreated:*", "s3:ObjectRemoved:*"]));

        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::NeedsUpdate);
        client.create_or_update(&b).await.unwrap();
        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::Updated);

        client.late_initialize(&mut b).await.unwrap();
        let spec = b.spec.for_provider.notification_configuration.as_ref().unwrap();
        assert!(spec.queue_configurations[0].id.is_some());
        assert_eq!(client.observe(&b).await.unwrap(), ResourceStatus::Updated);
    }

    #[tokio::test]
    async fn test_should_ignore_event_order() {
        let (_, api) = store().await;
        let client = NotificationClient::new(api);
        client
            .create_or_update(&bucket(queue(&["s3:ObjectCreated:*", "s3:ObjectRemoved:*"])))
            .await
            .unwrap();
        let reordered = bucket(queue(&["s3:ObjectRemoved:*", "s3:ObjectCreated:*"]));
        assert_eq!(client.observe(&reordered).await.unwrap(), ResourceStatus::Updated);
    }

    #[tokio::test]
    async fn test_should_reject_unresolved_arn() {
        let (store, api) = store().await;
        let mut params = queue(&["s3:ObjectCreated:*"]);
        params
            .notification_configuration
            .as_mut()
            .unwrap()
            .queue_configurations[0]
            .arn = None;

        let err = NotificationClient::new(api)
            .create_or_update(&bucket(params))
            .await
            .unwrap_err();
        assert!(err.is_terminal());
        assert_eq!(store.count("PutBucketNotificationConfiguration"), 0);
    }
}
