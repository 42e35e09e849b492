//! Conversions between the bucket model and `aws-sdk-s3` shapes.
//!
//! `to_*` builds SDK input shapes, `from_*` reads SDK output shapes. Enums
//! cross the boundary through their wire strings; a wire string the model
//! does not know is reported as an error instead of being dropped.

use std::str::FromStr;

use aws_sdk_s3::error::BuildError;
use aws_sdk_s3::primitives::DateTime as SdkDateTime;
use aws_sdk_s3::types as sdk;
use chrono::{DateTime, Utc};
use rustack_s3_model::types::{
    AbortIncompleteMultipartUpload, AccessControlTranslation, CorsConfiguration, CorsRule,
    DefaultRetention, Destination, EncryptionConfiguration, ErrorDocument, FilterRule,
    FilterRuleName, Grantee, IndexDocument, LifecycleConfiguration, LifecycleExpiration,
    LifecycleRule, LifecycleRuleAndOperator, LifecycleRuleFilter, LoggingEnabled,
    NoncurrentVersionExpiration, NoncurrentVersionTransition, NotificationConfiguration,
    NotificationTarget, ObjectLockConfiguration, ObjectLockRule, PublicAccessBlockConfiguration,
    Redirect, RedirectAllRequestsTo, ReplicationConfiguration, ReplicationRule,
    ReplicationRuleAndOperator, ReplicationRuleFilter, ReplicationTimeSetting, RoutingRule,
    RoutingRuleCondition, ServerSideEncryptionByDefault, ServerSideEncryptionConfiguration,
    ServerSideEncryptionRule, SourceSelectionCriteria, Tag, TargetGrant, Transition,
    UnknownVariant, WebsiteConfiguration,
};
use rustack_s3_model::{S3Error, S3ErrorCode};

use crate::api::S3Result;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(super) fn build_error(err: BuildError) -> S3Error {
    S3Error::invalid_request(err.to_string())
}

/// Parse an SDK enum's wire string into the model enum.
pub(super) fn parse<T>(value: &str) -> S3Result<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    value
        .parse()
        .map_err(|e: UnknownVariant| {
            S3Error::with_message(S3ErrorCode::InternalError, e.to_string())
        })
}

fn parse_opt<T>(value: Option<&str>) -> S3Result<Option<T>>
where
    T: FromStr<Err = UnknownVariant>,
{
    value.map(parse).transpose()
}

fn to_sdk_date(date: &DateTime<Utc>) -> SdkDateTime {
    SdkDateTime::from_secs(date.timestamp())
}

fn from_sdk_date(date: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(date.secs(), date.subsec_nanos())
}

fn strings(values: &[String]) -> Vec<String> {
    values.to_vec()
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

pub(super) fn to_tag(tag: &Tag) -> S3Result<sdk::Tag> {
    sdk::Tag::builder()
        .key(&tag.key)
        .value(&tag.value)
        .build()
        .map_err(build_error)
}

pub(super) fn to_tags(tags: &[Tag]) -> S3Result<Vec<sdk::Tag>> {
    tags.iter().map(to_tag).collect()
}

pub(super) fn from_tag(tag: &sdk::Tag) -> Tag {
    Tag::new(tag.key(), tag.value())
}

pub(super) fn from_tags(tags: &[sdk::Tag]) -> Vec<Tag> {
    tags.iter().map(from_tag).collect()
}

// ---------------------------------------------------------------------------
// CORS
// ---------------------------------------------------------------------------

pub(super) fn to_cors(config: &CorsConfiguration) -> S3Result<sdk::CorsConfiguration> {
    let rules = config
        .cors_rules
        .iter()
        .map(|r| {
            sdk::CorsRule::builder()
                .set_id(r.id.clone())
                .set_allowed_headers(Some(strings(&r.allowed_headers)))
                .set_allowed_methods(Some(strings(&r.allowed_methods)))
                .set_allowed_origins(Some(strings(&r.allowed_origins)))
                .set_expose_headers(Some(strings(&r.expose_headers)))
                .set_max_age_seconds(r.max_age_seconds)
                .build()
                .map_err(build_error)
        })
        .collect::<S3Result<Vec<_>>>()?;
    sdk::CorsConfiguration::builder()
        .set_cors_rules(Some(rules))
        .build()
        .map_err(build_error)
}

pub(super) fn from_cors(rules: &[sdk::CorsRule]) -> CorsConfiguration {
    CorsConfiguration {
        cors_rules: rules
            .iter()
            .map(|r| CorsRule {
                id: r.id().map(str::to_owned),
                allowed_headers: r.allowed_headers().to_vec(),
                allowed_methods: r.allowed_methods().to_vec(),
                allowed_origins: r.allowed_origins().to_vec(),
                expose_headers: r.expose_headers().to_vec(),
                max_age_seconds: r.max_age_seconds(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Server-side encryption
// ---------------------------------------------------------------------------

pub(super) fn to_encryption(
    config: &ServerSideEncryptionConfiguration,
) -> S3Result<sdk::ServerSideEncryptionConfiguration> {
    let rules = config
        .rules
        .iter()
        .map(|r| {
            let by_default = r
                .apply_server_side_encryption_by_default
                .as_ref()
                .map(|d| {
                    sdk::ServerSideEncryptionByDefault::builder()
                        .sse_algorithm(sdk::ServerSideEncryption::from(d.sse_algorithm.as_str()))
                        .set_kms_master_key_id(d.kms_master_key_id.clone())
                        .build()
                        .map_err(build_error)
                })
                .transpose()?;
            Ok(sdk::ServerSideEncryptionRule::builder()
                .set_apply_server_side_encryption_by_default(by_default)
                .set_bucket_key_enabled(r.bucket_key_enabled)
                .build())
        })
        .collect::<S3Result<Vec<_>>>()?;
    sdk::ServerSideEncryptionConfiguration::builder()
        .set_rules(Some(rules))
        .build()
        .map_err(build_error)
}

pub(super) fn from_encryption(
    config: &sdk::ServerSideEncryptionConfiguration,
) -> S3Result<ServerSideEncryptionConfiguration> {
    let rules = config
        .rules()
        .iter()
        .map(|r| {
            let by_default = r
                .apply_server_side_encryption_by_default()
                .map(|d| {
                    Ok::<_, S3Error>(ServerSideEncryptionByDefault {
                        sse_algorithm: parse(d.sse_algorithm().as_str())?,
                        kms_master_key_id: d.kms_master_key_id().map(str::to_owned),
                    })
                })
                .transpose()?;
            Ok(ServerSideEncryptionRule {
                apply_server_side_encryption_by_default: by_default,
                bucket_key_enabled: r.bucket_key_enabled(),
            })
        })
        .collect::<S3Result<Vec<_>>>()?;
    Ok(ServerSideEncryptionConfiguration { rules })
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

fn to_lifecycle_filter(filter: &LifecycleRuleFilter) -> S3Result<sdk::LifecycleRuleFilter> {
    let and = filter
        .and
        .as_ref()
        .map(|a| {
            Ok::<_, S3Error>(
                sdk::LifecycleRuleAndOperator::builder()
                    .set_prefix(a.prefix.clone())
                    .set_tags(Some(to_tags(&a.tags)?))
                    .set_object_size_greater_than(a.object_size_greater_than)
                    .set_object_size_less_than(a.object_size_less_than)
                    .build(),
            )
        })
        .transpose()?;
    Ok(sdk::LifecycleRuleFilter::builder()
        .set_prefix(filter.prefix.clone())
        .set_tag(filter.tag.as_ref().map(to_tag).transpose()?)
        .set_and(and)
        .set_object_size_greater_than(filter.object_size_greater_than)
        .set_object_size_less_than(filter.object_size_less_than)
        .build())
}

fn to_lifecycle_rule(rule: &LifecycleRule) -> S3Result<sdk::LifecycleRule> {
    let expiration = rule.expiration.as_ref().map(|e| {
        sdk::LifecycleExpiration::builder()
            .set_date(e.date.as_ref().map(to_sdk_date))
            .set_days(e.days)
            .set_expired_object_delete_marker(e.expired_object_delete_marker)
            .build()
    });
    let transitions = rule
        .transitions
        .iter()
        .map(|t| {
            sdk::Transition::builder()
                .set_date(t.date.as_ref().map(to_sdk_date))
                .set_days(t.days)
                .set_storage_class(
                    t.storage_class
                        .as_deref()
                        .map(sdk::TransitionStorageClass::from),
                )
                .build()
        })
        .collect();
    let noncurrent_transitions = rule
        .noncurrent_version_transitions
        .iter()
        .map(|t| {
            sdk::NoncurrentVersionTransition::builder()
                .set_noncurrent_days(t.noncurrent_days)
                .set_newer_noncurrent_versions(t.newer_noncurrent_versions)
                .set_storage_class(
                    t.storage_class
                        .as_deref()
                        .map(sdk::TransitionStorageClass::from),
                )
                .build()
        })
        .collect();

    sdk::LifecycleRule::builder()
        .set_id(rule.id.clone())
        .status(sdk::ExpirationStatus::from(rule.status.as_str()))
        .set_filter(rule.filter.as_ref().map(to_lifecycle_filter).transpose()?)
        .set_expiration(expiration)
        .set_transitions(Some(transitions))
        .set_noncurrent_version_expiration(rule.noncurrent_version_expiration.as_ref().map(|n| {
            sdk::NoncurrentVersionExpiration::builder()
                .set_noncurrent_days(n.noncurrent_days)
                .set_newer_noncurrent_versions(n.newer_noncurrent_versions)
                .build()
        }))
        .set_noncurrent_version_transitions(Some(noncurrent_transitions))
        .set_abort_incomplete_multipart_upload(rule.abort_incomplete_multipart_upload.as_ref().map(
            |a| {
                sdk::AbortIncompleteMultipartUpload::builder()
                    .set_days_after_initiation(a.days_after_initiation)
                    .build()
            },
        ))
        .build()
        .map_err(build_error)
}

pub(super) fn to_lifecycle(
    config: &LifecycleConfiguration,
) -> S3Result<sdk::BucketLifecycleConfiguration> {
    let rules = config
        .rules
        .iter()
        .map(to_lifecycle_rule)
        .collect::<S3Result<Vec<_>>>()?;
    sdk::BucketLifecycleConfiguration::builder()
        .set_rules(Some(rules))
        .build()
        .map_err(build_error)
}

fn from_lifecycle_rule(rule: &sdk::LifecycleRule) -> S3Result<LifecycleRule> {
    let filter = rule.filter().map(|f| LifecycleRuleFilter {
        prefix: f.prefix().map(str::to_owned),
        tag: f.tag().map(from_tag),
        and: f.and().map(|a| LifecycleRuleAndOperator {
            prefix: a.prefix().map(str::to_owned),
            tags: from_tags(a.tags()),
            object_size_greater_than: a.object_size_greater_than(),
            object_size_less_than: a.object_size_less_than(),
        }),
        object_size_greater_than: f.object_size_greater_than(),
        object_size_less_than: f.object_size_less_than(),
    });
    Ok(LifecycleRule {
        id: rule.id().map(str::to_owned),
        status: parse(rule.status().as_str())?,
        filter,
        expiration: rule.expiration().map(|e| LifecycleExpiration {
            date: e.date().and_then(from_sdk_date),
            days: e.days(),
            expired_object_delete_marker: e.expired_object_delete_marker(),
        }),
        transitions: rule
            .transitions()
            .iter()
            .map(|t| Transition {
                date: t.date().and_then(from_sdk_date),
                days: t.days(),
                storage_class: t.storage_class().map(|s| s.as_str().to_owned()),
            })
            .collect(),
        noncurrent_version_expiration: rule.noncurrent_version_expiration().map(|n| {
            NoncurrentVersionExpiration {
                noncurrent_days: n.noncurrent_days(),
                newer_noncurrent_versions: n.newer_noncurrent_versions(),
            }
        }),
        noncurrent_version_transitions: rule
            .noncurrent_version_transitions()
            .iter()
            .map(|t| NoncurrentVersionTransition {
                noncurrent_days: t.noncurrent_days(),
                newer_noncurrent_versions: t.newer_noncurrent_versions(),
                storage_class: t.storage_class().map(|s| s.as_str().to_owned()),
            })
            .collect(),
        abort_incomplete_multipart_upload: rule.abort_incomplete_multipart_upload().map(|a| {
            AbortIncompleteMultipartUpload {
                days_after_initiation: a.days_after_initiation(),
            }
        }),
    })
}

pub(super) fn from_lifecycle(rules: &[sdk::LifecycleRule]) -> S3Result<LifecycleConfiguration> {
    Ok(LifecycleConfiguration {
        rules: rules
            .iter()
            .map(from_lifecycle_rule)
            .collect::<S3Result<_>>()?,
    })
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

pub(super) fn to_logging(enabled: &LoggingEnabled) -> S3Result<sdk::LoggingEnabled> {
    let grants = enabled
        .target_grants
        .iter()
        .map(|g| {
            let grantee = sdk::Grantee::builder()
                .r#type(sdk::Type::from(g.grantee.kind.as_str()))
                .set_id(g.grantee.id.clone())
                .set_uri(g.grantee.uri.clone())
                .set_email_address(g.grantee.email_address.clone())
                .set_display_name(g.grantee.display_name.clone())
                .build()
                .map_err(build_error)?;
            Ok(sdk::TargetGrant::builder()
                .grantee(grantee)
                .permission(sdk::BucketLogsPermission::from(g.permission.as_str()))
                .build())
        })
        .collect::<S3Result<Vec<_>>>()?;
    sdk::LoggingEnabled::builder()
        .target_bucket(&enabled.target_bucket)
        .target_prefix(&enabled.target_prefix)
        .set_target_grants(Some(grants))
        .build()
        .map_err(build_error)
}

pub(super) fn from_logging(enabled: &sdk::LoggingEnabled) -> S3Result<LoggingEnabled> {
    let mut target_grants = Vec::with_capacity(enabled.target_grants().len());
    for grant in enabled.target_grants() {
        let (Some(grantee), Some(permission)) = (grant.grantee(), grant.permission()) else {
            continue;
        };
        target_grants.push(TargetGrant {
            grantee: Grantee {
                kind: parse(grantee.r#type().as_str())?,
                id: grantee.id().map(str::to_owned),
                uri: grantee.uri().map(str::to_owned),
                email_address: grantee.email_address().map(str::to_owned),
                display_name: grantee.display_name().map(str::to_owned),
            },
            permission: parse(permission.as_str())?,
        });
    }
    Ok(LoggingEnabled {
        target_bucket: enabled.target_bucket().to_owned(),
        target_prefix: enabled.target_prefix().to_owned(),
        target_grants,
    })
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

fn to_notification_filter(rules: &[FilterRule]) -> Option<sdk::NotificationConfigurationFilter> {
    if rules.is_empty() {
        return None;
    }
    let filter_rules = rules
        .iter()
        .map(|r| {
            sdk::FilterRule::builder()
                .name(sdk::FilterRuleName::from(r.name.as_str()))
                .value(&r.value)
                .build()
        })
        .collect();
    Some(
        sdk::NotificationConfigurationFilter::builder()
            .key(
                sdk::S3KeyFilter::builder()
                    .set_filter_rules(Some(filter_rules))
                    .build(),
            )
            .build(),
    )
}

fn from_notification_filter(
    filter: Option<&sdk::NotificationConfigurationFilter>,
) -> Vec<FilterRule> {
    filter
        .and_then(sdk::NotificationConfigurationFilter::key)
        .map(sdk::S3KeyFilter::filter_rules)
        .unwrap_or_default()
        .iter()
        .filter_map(|r| {
            Some(FilterRule {
                name: FilterRuleName::parse_lenient(r.name()?.as_str())?,
                value: r.value()?.to_owned(),
            })
        })
        .collect()
}

fn events(target: &NotificationTarget) -> Vec<sdk::Event> {
    target
        .events
        .iter()
        .map(|e| sdk::Event::from(e.as_str()))
        .collect()
}

fn from_events(events: &[sdk::Event]) -> Vec<String> {
    events.iter().map(|e| e.as_str().to_owned()).collect()
}

pub(super) fn to_notification(
    config: &NotificationConfiguration,
) -> S3Result<sdk::NotificationConfiguration> {
    let topics = config
        .topic_configurations
        .iter()
        .map(|t| {
            sdk::TopicConfiguration::builder()
                .set_id(t.id.clone())
                .topic_arn(&t.arn)
                .set_events(Some(events(t)))
                .set_filter(to_notification_filter(&t.filter_rules))
                .build()
                .map_err(build_error)
        })
        .collect::<S3Result<Vec<_>>>()?;
    let queues = config
        .queue_configurations
        .iter()
        .map(|t| {
            sdk::QueueConfiguration::builder()
                .set_id(t.id.clone())
                .queue_arn(&t.arn)
                .set_events(Some(events(t)))
                .set_filter(to_notification_filter(&t.filter_rules))
                .build()
                .map_err(build_error)
        })
        .collect::<S3Result<Vec<_>>>()?;
    let functions = config
        .lambda_function_configurations
        .iter()
        .map(|t| {
            sdk::LambdaFunctionConfiguration::builder()
                .set_id(t.id.clone())
                .lambda_function_arn(&t.arn)
                .set_events(Some(events(t)))
                .set_filter(to_notification_filter(&t.filter_rules))
                .build()
                .map_err(build_error)
        })
        .collect::<S3Result<Vec<_>>>()?;

    Ok(sdk::NotificationConfiguration::builder()
        .set_topic_configurations(Some(topics))
        .set_queue_configurations(Some(queues))
        .set_lambda_function_configurations(Some(functions))
        .build())
}

pub(super) fn from_notification(
    topics: &[sdk::TopicConfiguration],
    queues: &[sdk::QueueConfiguration],
    functions: &[sdk::LambdaFunctionConfiguration],
) -> NotificationConfiguration {
    NotificationConfiguration {
        topic_configurations: topics
            .iter()
            .map(|t| NotificationTarget {
                id: t.id().map(str::to_owned),
                arn: t.topic_arn().to_owned(),
                events: from_events(t.events()),
                filter_rules: from_notification_filter(t.filter()),
            })
            .collect(),
        queue_configurations: queues
            .iter()
            .map(|t| NotificationTarget {
                id: t.id().map(str::to_owned),
                arn: t.queue_arn().to_owned(),
                events: from_events(t.events()),
                filter_rules: from_notification_filter(t.filter()),
            })
            .collect(),
        lambda_function_configurations: functions
            .iter()
            .map(|t| NotificationTarget {
                id: t.id().map(str::to_owned),
                arn: t.lambda_function_arn().to_owned(),
                events: from_events(t.events()),
                filter_rules: from_notification_filter(t.filter()),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Replication
// ---------------------------------------------------------------------------

fn to_replication_filter(filter: &ReplicationRuleFilter) -> S3Result<sdk::ReplicationRuleFilter> {
    let and = filter
        .and
        .as_ref()
        .map(|a| {
            Ok::<_, S3Error>(
                sdk::ReplicationRuleAndOperator::builder()
                    .set_prefix(a.prefix.clone())
                    .set_tags(Some(to_tags(&a.tags)?))
                    .build(),
            )
        })
        .transpose()?;
    Ok(sdk::ReplicationRuleFilter::builder()
        .set_prefix(filter.prefix.clone())
        .set_tag(filter.tag.as_ref().map(to_tag).transpose()?)
        .set_and(and)
        .build())
}

fn to_destination(destination: &Destination) -> S3Result<sdk::Destination> {
    let translation = destination
        .access_control_translation
        .as_ref()
        .map(|t| {
            sdk::AccessControlTranslation::builder()
                .owner(sdk::OwnerOverride::from(t.owner.as_str()))
                .build()
                .map_err(build_error)
        })
        .transpose()?;
    let replication_time = destination
        .replication_time
        .as_ref()
        .map(|t| {
            sdk::ReplicationTime::builder()
                .status(sdk::ReplicationTimeStatus::from(t.status.as_str()))
                .set_time(
                    t.minutes
                        .map(|m| sdk::ReplicationTimeValue::builder().minutes(m).build()),
                )
                .build()
                .map_err(build_error)
        })
        .transpose()?;
    let metrics = destination
        .metrics
        .as_ref()
        .map(|m| {
            sdk::Metrics::builder()
                .status(sdk::MetricsStatus::from(m.status.as_str()))
                .set_event_threshold(
                    m.minutes
                        .map(|v| sdk::ReplicationTimeValue::builder().minutes(v).build()),
                )
                .build()
                .map_err(build_error)
        })
        .transpose()?;

    sdk::Destination::builder()
        .bucket(&destination.bucket)
        .set_account(destination.account.clone())
        .set_storage_class(destination.storage_class.as_deref().map(sdk::StorageClass::from))
        .set_access_control_translation(translation)
        .set_encryption_configuration(destination.encryption_configuration.as_ref().map(|e| {
            sdk::EncryptionConfiguration::builder()
                .set_replica_kms_key_id(e.replica_kms_key_id.clone())
                .build()
        }))
        .set_replication_time(replication_time)
        .set_metrics(metrics)
        .build()
        .map_err(build_error)
}

fn to_source_selection(
    criteria: &SourceSelectionCriteria,
) -> S3Result<sdk::SourceSelectionCriteria> {
    let sse = criteria
        .sse_kms_encrypted_objects
        .map(|s| {
            sdk::SseKmsEncryptedObjects::builder()
                .status(sdk::SseKmsEncryptedObjectsStatus::from(s.as_str()))
                .build()
                .map_err(build_error)
        })
        .transpose()?;
    let replicas = criteria
        .replica_modifications
        .map(|s| {
            sdk::ReplicaModifications::builder()
                .status(sdk::ReplicaModificationsStatus::from(s.as_str()))
                .build()
                .map_err(build_error)
        })
        .transpose()?;
    Ok(sdk::SourceSelectionCriteria::builder()
        .set_sse_kms_encrypted_objects(sse)
        .set_replica_modifications(replicas)
        .build())
}

fn to_replication_rule(rule: &ReplicationRule) -> S3Result<sdk::ReplicationRule> {
    let existing = rule
        .existing_object_replication
        .map(|s| {
            sdk::ExistingObjectReplication::builder()
                .status(sdk::ExistingObjectReplicationStatus::from(s.as_str()))
                .build()
                .map_err(build_error)
        })
        .transpose()?;
    sdk::ReplicationRule::builder()
        .set_id(rule.id.clone())
        .set_priority(rule.priority)
        .status(sdk::ReplicationRuleStatus::from(rule.status.as_str()))
        .set_filter(rule.filter.as_ref().map(to_replication_filter).transpose()?)
        .destination(to_destination(&rule.destination)?)
        .set_delete_marker_replication(rule.delete_marker_replication.map(|s| {
            sdk::DeleteMarkerReplication::builder()
                .status(sdk::DeleteMarkerReplicationStatus::from(s.as_str()))
                .build()
        }))
        .set_source_selection_criteria(
            rule.source_selection_criteria
                .as_ref()
                .map(to_source_selection)
                .transpose()?,
        )
        .set_existing_object_replication(existing)
        .build()
        .map_err(build_error)
}

pub(super) fn to_replication(
    config: &ReplicationConfiguration,
) -> S3Result<sdk::ReplicationConfiguration> {
    let rules = config
        .rules
        .iter()
        .map(to_replication_rule)
        .collect::<S3Result<Vec<_>>>()?;
    sdk::ReplicationConfiguration::builder()
        .role(&config.role)
        .set_rules(Some(rules))
        .build()
        .map_err(build_error)
}

fn from_destination(destination: &sdk::Destination) -> S3Result<Destination> {
    Ok(Destination {
        bucket: destination.bucket().to_owned(),
        account: destination.account().map(str::to_owned),
        storage_class: destination.storage_class().map(|s| s.as_str().to_owned()),
        access_control_translation: destination.access_control_translation().map(|t| {
            AccessControlTranslation {
                owner: t.owner().as_str().to_owned(),
            }
        }),
        encryption_configuration: destination.encryption_configuration().map(|e| {
            EncryptionConfiguration {
                replica_kms_key_id: e.replica_kms_key_id().map(str::to_owned),
            }
        }),
        replication_time: destination
            .replication_time()
            .map(|t| {
                Ok::<_, S3Error>(ReplicationTimeSetting {
                    status: parse(t.status().as_str())?,
                    minutes: t.time().and_then(sdk::ReplicationTimeValue::minutes),
                })
            })
            .transpose()?,
        metrics: destination
            .metrics()
            .map(|m| {
                Ok::<_, S3Error>(ReplicationTimeSetting {
                    status: parse(m.status().as_str())?,
                    minutes: m.event_threshold().and_then(sdk::ReplicationTimeValue::minutes),
                })
            })
            .transpose()?,
    })
}

fn from_replication_rule(rule: &sdk::ReplicationRule) -> S3Result<ReplicationRule> {
    let destination = rule.destination().ok_or_else(|| {
        S3Error::with_message(S3ErrorCode::InternalError, "replication rule has no destination")
    })?;
    let criteria = rule
        .source_selection_criteria()
        .map(|c| {
            Ok::<_, S3Error>(SourceSelectionCriteria {
                sse_kms_encrypted_objects: parse_opt(
                    c.sse_kms_encrypted_objects().map(|s| s.status().as_str()),
                )?,
                replica_modifications: parse_opt(
                    c.replica_modifications().map(|s| s.status().as_str()),
                )?,
            })
        })
        .transpose()?;
    Ok(ReplicationRule {
        id: rule.id().map(str::to_owned),
        priority: rule.priority(),
        status: parse(rule.status().as_str())?,
        filter: rule.filter().map(|f| ReplicationRuleFilter {
            prefix: f.prefix().map(str::to_owned),
            tag: f.tag().map(from_tag),
            and: f.and().map(|a| ReplicationRuleAndOperator {
                prefix: a.prefix().map(str::to_owned),
                tags: from_tags(a.tags()),
            }),
        }),
        destination: from_destination(destination)?,
        delete_marker_replication: parse_opt(
            rule.delete_marker_replication()
                .and_then(|d| d.status())
                .map(sdk::DeleteMarkerReplicationStatus::as_str),
        )?,
        source_selection_criteria: criteria,
        existing_object_replication: parse_opt(
            rule.existing_object_replication()
                .map(|e| e.status().as_str()),
        )?,
    })
}

pub(super) fn from_replication(
    config: &sdk::ReplicationConfiguration,
) -> S3Result<ReplicationConfiguration> {
    Ok(ReplicationConfiguration {
        role: config.role().to_owned(),
        rules: config
            .rules()
            .iter()
            .map(from_replication_rule)
            .collect::<S3Result<_>>()?,
    })
}

// ---------------------------------------------------------------------------
// Website
// ---------------------------------------------------------------------------

fn to_redirect(redirect: &Redirect) -> sdk::Redirect {
    sdk::Redirect::builder()
        .set_host_name(redirect.host_name.clone())
        .set_http_redirect_code(redirect.http_redirect_code.clone())
        .set_protocol(redirect.protocol.map(|p| sdk::Protocol::from(p.as_str())))
        .set_replace_key_prefix_with(redirect.replace_key_prefix_with.clone())
        .set_replace_key_with(redirect.replace_key_with.clone())
        .build()
}

pub(super) fn to_website(config: &WebsiteConfiguration) -> S3Result<sdk::WebsiteConfiguration> {
    let index = config
        .index_document
        .as_ref()
        .map(|i| {
            sdk::IndexDocument::builder()
                .suffix(&i.suffix)
                .build()
                .map_err(build_error)
        })
        .transpose()?;
    let error = config
        .error_document
        .as_ref()
        .map(|e| {
            sdk::ErrorDocument::builder()
                .key(&e.key)
                .build()
                .map_err(build_error)
        })
        .transpose()?;
    let redirect_all = config
        .redirect_all_requests_to
        .as_ref()
        .map(|r| {
            sdk::RedirectAllRequestsTo::builder()
                .host_name(&r.host_name)
                .set_protocol(r.protocol.map(|p| sdk::Protocol::from(p.as_str())))
                .build()
                .map_err(build_error)
        })
        .transpose()?;
    let routing_rules = config
        .routing_rules
        .iter()
        .map(|r| {
            sdk::RoutingRule::builder()
                .set_condition(r.condition.as_ref().map(|c| {
                    sdk::Condition::builder()
                        .set_http_error_code_returned_equals(
                            c.http_error_code_returned_equals.clone(),
                        )
                        .set_key_prefix_equals(c.key_prefix_equals.clone())
                        .build()
                }))
                .redirect(to_redirect(&r.redirect))
                .build()
        })
        .collect();

    Ok(sdk::WebsiteConfiguration::builder()
        .set_index_document(index)
        .set_error_document(error)
        .set_redirect_all_requests_to(redirect_all)
        .set_routing_rules(Some(routing_rules))
        .build())
}

pub(super) fn from_website(
    output: &aws_sdk_s3::operation::get_bucket_website::GetBucketWebsiteOutput,
) -> S3Result<WebsiteConfiguration> {
    let redirect_all = output
        .redirect_all_requests_to()
        .map(|r| {
            Ok::<_, S3Error>(RedirectAllRequestsTo {
                host_name: r.host_name().to_owned(),
                protocol: parse_opt(r.protocol().map(sdk::Protocol::as_str))?,
            })
        })
        .transpose()?;
    let routing_rules = output
        .routing_rules()
        .iter()
        .map(|r| {
            let redirect = r.redirect().map_or_else(
                || Ok(Redirect::default()),
                |d| {
                    Ok::<_, S3Error>(Redirect {
                        host_name: d.host_name().map(str::to_owned),
                        http_redirect_code: d.http_redirect_code().map(str::to_owned),
                        protocol: parse_opt(d.protocol().map(sdk::Protocol::as_str))?,
                        replace_key_prefix_with: d.replace_key_prefix_with().map(str::to_owned),
                        replace_key_with: d.replace_key_with().map(str::to_owned),
                    })
                },
            )?;
            Ok(RoutingRule {
                condition: r.condition().map(|c| RoutingRuleCondition {
                    http_error_code_returned_equals: c
                        .http_error_code_returned_equals()
                        .map(str::to_owned),
                    key_prefix_equals: c.key_prefix_equals().map(str::to_owned),
                }),
                redirect,
            })
        })
        .collect::<S3Result<Vec<_>>>()?;

    Ok(WebsiteConfiguration {
        index_document: output.index_document().map(|i| IndexDocument {
            suffix: i.suffix().to_owned(),
        }),
        error_document: output.error_document().map(|e| ErrorDocument {
            key: e.key().to_owned(),
        }),
        redirect_all_requests_to: redirect_all,
        routing_rules,
    })
}

// ---------------------------------------------------------------------------
// Public access block and object lock
// ---------------------------------------------------------------------------

pub(super) fn to_public_access_block(
    config: &PublicAccessBlockConfiguration,
) -> sdk::PublicAccessBlockConfiguration {
    sdk::PublicAccessBlockConfiguration::builder()
        .set_block_public_acls(config.block_public_acls)
        .set_ignore_public_acls(config.ignore_public_acls)
        .set_block_public_policy(config.block_public_policy)
        .set_restrict_public_buckets(config.restrict_public_buckets)
        .build()
}

pub(super) fn from_public_access_block(
    config: &sdk::PublicAccessBlockConfiguration,
) -> PublicAccessBlockConfiguration {
    PublicAccessBlockConfiguration {
        block_public_acls: config.block_public_acls(),
        ignore_public_acls: config.ignore_public_acls(),
        block_public_policy: config.block_public_policy(),
        restrict_public_buckets: config.restrict_public_buckets(),
    }
}

pub(super) fn to_object_lock(config: &ObjectLockConfiguration) -> sdk::ObjectLockConfiguration {
    let rule = config.rule.as_ref().map(|r| {
        sdk::ObjectLockRule::builder()
            .set_default_retention(r.default_retention.as_ref().map(|d| {
                sdk::DefaultRetention::builder()
                    .mode(sdk::ObjectLockRetentionMode::from(d.mode.as_str()))
                    .set_days(d.days)
                    .set_years(d.years)
                    .build()
            }))
            .build()
    });
    sdk::ObjectLockConfiguration::builder()
        .set_object_lock_enabled(
            config
                .object_lock_enabled
                .map(|e| sdk::ObjectLockEnabled::from(e.as_str())),
        )
        .set_rule(rule)
        .build()
}

pub(super) fn from_object_lock(
    config: &sdk::ObjectLockConfiguration,
) -> S3Result<ObjectLockConfiguration> {
    let rule = config
        .rule()
        .map(|r| {
            let retention = r
                .default_retention()
                .and_then(|d| d.mode().map(|mode| (mode, d)))
                .map(|(mode, d)| {
                    Ok::<_, S3Error>(DefaultRetention {
                        mode: parse(mode.as_str())?,
                        days: d.days(),
                        years: d.years(),
                    })
                })
                .transpose()?;
            Ok::<_, S3Error>(ObjectLockRule {
                default_retention: retention,
            })
        })
        .transpose()?;
    Ok(ObjectLockConfiguration {
        object_lock_enabled: parse_opt(
            config
                .object_lock_enabled()
                .map(sdk::ObjectLockEnabled::as_str),
        )?,
        rule,
    })
}
