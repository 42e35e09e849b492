//! Reference resolution for buckets.
//!
//! | Field | Target kind | Extracted |
//! |-------|-------------|-----------|
//! | `loggingConfiguration.targetBucket` | Bucket | external name |
//! | `notificationConfiguration.*[].arn` | Topic, Queue, Function | ARN |
//! | `replicationConfiguration.role` | Role | ARN |
//! | `replicationConfiguration.rules[].destination.bucket` | Bucket | ARN |
//! | `serverSideEncryptionConfiguration.rules[]...kmsMasterKeyId` | Key | ARN |

use async_trait::async_trait;
use rustack_provider_core::reference::{self, Extractor};
use rustack_provider_core::{
    ProviderResult, Reference, ReferenceResolver, ReferenceSource, ResolutionRequest, Selector,
};
use rustack_s3_model::bucket::{
    KIND_BUCKET, KIND_FUNCTION, KIND_KEY, KIND_QUEUE, KIND_ROLE, KIND_TOPIC,
    NotificationTargetSpec,
};
use rustack_s3_model::Bucket;

/// Resolves every referencing field of a [`Bucket`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BucketReferenceResolver;

/// Resolve one field in place, recording the object it resolved to.
async fn resolve_into(
    source: &dyn ReferenceSource,
    field: &str,
    kind: &str,
    value: &mut Option<String>,
    reference: &mut Option<Reference>,
    selector: Option<&Selector>,
    extract: Extractor,
) -> ProviderResult<()> {
    let resp = reference::resolve(
        source,
        ResolutionRequest {
            field,
            kind,
            current_value: value.as_deref(),
            reference: reference.as_ref(),
            selector,
            extract,
        },
    )
    .await?;
    if resp.resolved_value.is_some() {
        *value = resp.resolved_value;
    }
    if resp.resolved_reference.is_some() {
        *reference = resp.resolved_reference;
    }
    Ok(())
}

async fn resolve_targets(
    source: &dyn ReferenceSource,
    path: &str,
    kind: &str,
    targets: &mut [NotificationTargetSpec],
) -> ProviderResult<()> {
    for (i, target) in targets.iter_mut().enumerate() {
        let selector = target.arn_selector.clone();
        resolve_into(
            source,
            &format!("{path}[{i}].arn"),
            kind,
            &mut target.arn,
            &mut target.arn_ref,
            selector.as_ref(),
            reference::arn,
        )
        .await?;
    }
    Ok(())
}

#[async_trait]
impl ReferenceResolver<Bucket> for BucketReferenceResolver {
    async fn resolve_references(
        &self,
        source: &dyn ReferenceSource,
        bucket: &mut Bucket,
    ) -> ProviderResult<()> {
        let params = &mut bucket.spec.for_provider;

        if let Some(logging) = params.logging_configuration.as_mut() {
            let selector = logging.target_bucket_selector.clone();
            resolve_into(
                source,
                "spec.forProvider.loggingConfiguration.targetBucket",
                KIND_BUCKET,
                &mut logging.target_bucket,
                &mut logging.target_bucket_ref,
                selector.as_ref(),
                reference::external_name,
            )
            .await?;
        }

        if let Some(notification) = params.notification_configuration.as_mut() {
            resolve_targets(
                source,
                "spec.forProvider.notificationConfiguration.topicConfigurations",
                KIND_TOPIC,
                &mut notification.topic_configurations,
            )
            .await?;
            resolve_targets(
                source,
                "spec.forProvider.notificationConfiguration.queueConfigurations",
                KIND_QUEUE,
                &mut notification.queue_configurations,
            )
            .await?;
            resolve_targets(
                source,
                "spec.forProvider.notificationConfiguration.lambdaFunctionConfigurations",
                KIND_FUNCTION,
                &mut notification.lambda_function_configurations,
            )
            .await?;
        }

        if let Some(replication) = params.replication_configuration.as_mut() {
            let selector = replication.role_selector.clone();
            resolve_into(
                source,
                "spec.forProvider.replicationConfiguration.role",
                KIND_ROLE,
                &mut replication.role,
                &mut replication.role_ref,
                selector.as_ref(),
                reference::arn,
            )
            .await?;
            for (i, rule) in replication.rules.iter_mut().enumerate() {
                let destination = &mut rule.destination;
                let selector = destination.bucket_selector.clone();
                resolve_into(
                    source,
                    &format!(
                        "spec.forProvider.replicationConfiguration.rules[{i}].destination.bucket"
                    ),
                    KIND_BUCKET,
                    &mut destination.bucket,
                    &mut destination.bucket_ref,
                    selector.as_ref(),
                    reference::arn,
                )
                .await?;
            }
        }

        if let Some(encryption) = params.server_side_encryption_configuration.as_mut() {
            for (i, rule) in encryption.rules.iter_mut().enumerate() {
                let by_default = &mut rule.apply_server_side_encryption_by_default;
                let selector = by_default.kms_master_key_id_selector.clone();
                resolve_into(
                    source,
                    &format!(
                        "spec.forProvider.serverSideEncryptionConfiguration.rules[{i}]\
                         .applyServerSideEncryptionByDefault.kmsMasterKeyId"
                    ),
                    KIND_KEY,
                    &mut by_default.kms_master_key_id,
                    &mut by_default.kms_master_key_id_ref,
                    selector.as_ref(),
                    reference::arn,
                )
                .await?;
            }
        }

        Ok(())
    }
}
