//! Validation of desired bucket configuration.
//!
//! Every check here runs before the matching PUT is issued, so a bad
//! manifest surfaces as a terminal configuration error instead of a provider
//! rejection that would be retried forever. Rules follow the
//! [Amazon S3 documentation](https://docs.aws.amazon.com/AmazonS3/latest/userguide/bucketnamingrules.html).

use std::collections::HashSet;
use std::net::Ipv4Addr;

use rustack_provider_core::ProviderError;
use rustack_s3_model::types::{
    LifecycleConfiguration, LifecycleRuleFilter, ObjectLockRule, ReplicationConfiguration,
    ServerSideEncryptionConfiguration, Tag,
};

use crate::compare::is_system_tag;

/// Maximum number of tags on a bucket.
pub const MAX_TAGS: usize = 50;

/// Maximum length of a tag key in characters.
const MAX_TAG_KEY_LEN: usize = 128;

/// Maximum length of a tag value in characters.
const MAX_TAG_VALUE_LEN: usize = 256;

/// Minimum bucket name length.
const MIN_BUCKET_NAME_LEN: usize = 3;

/// Maximum bucket name length.
const MAX_BUCKET_NAME_LEN: usize = 63;

/// A desired configuration the provider would reject.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct InvalidConfiguration {
    /// Offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub reason: String,
}

impl InvalidConfiguration {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl From<InvalidConfiguration> for ProviderError {
    fn from(err: InvalidConfiguration) -> Self {
        Self::configuration(err.to_string())
    }
}

type ValidationResult = Result<(), InvalidConfiguration>;

/// Validate a bucket name.
///
/// Rules:
/// - 3-63 characters long
/// - Only lowercase letters, numbers, hyphens, and dots
/// - Must start and end with a letter or number
/// - No consecutive dots (`..`)
/// - Not formatted as an IPv4 address
///
/// # Examples
///
/// ```
/// use rustack_s3_provider::validation::validate_bucket_name;
///
/// assert!(validate_bucket_name("acme-logs").is_ok());
/// assert!(validate_bucket_name("AB").is_err());
/// ```
pub fn validate_bucket_name(name: &str) -> ValidationResult {
    const FIELD: &str = "bucket name";
    let len = name.len();

    if !(MIN_BUCKET_NAME_LEN..=MAX_BUCKET_NAME_LEN).contains(&len) {
        return Err(InvalidConfiguration::new(
            FIELD,
            format!(
                "must be between {MIN_BUCKET_NAME_LEN} and {MAX_BUCKET_NAME_LEN} characters long"
            ),
        ));
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return Err(InvalidConfiguration::new(
            FIELD,
            "must only contain lowercase letters, numbers, hyphens, and dots",
        ));
    }

    let alnum = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    let bytes = name.as_bytes();
    if !alnum(bytes[0]) || !alnum(bytes[len - 1]) {
        return Err(InvalidConfiguration::new(
            FIELD,
            "must start and end with a letter or number",
        ));
    }

    if name.contains("..") {
        return Err(InvalidConfiguration::new(FIELD, "must not contain consecutive dots"));
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(InvalidConfiguration::new(
            FIELD,
            "must not be formatted as an IP address",
        ));
    }

    Ok(())
}

/// Validate a user-declared tag set.
pub fn validate_tags(tags: &[Tag]) -> ValidationResult {
    const FIELD: &str = "tagging";

    if tags.len() > MAX_TAGS {
        return Err(InvalidConfiguration::new(
            FIELD,
            format!("at most {MAX_TAGS} tags are allowed, got {}", tags.len()),
        ));
    }

    let mut seen = HashSet::with_capacity(tags.len());
    for tag in tags {
        let key_len = tag.key.chars().count();
        if key_len == 0 || key_len > MAX_TAG_KEY_LEN {
            return Err(InvalidConfiguration::new(
                FIELD,
                format!("tag key must be between 1 and {MAX_TAG_KEY_LEN} characters"),
            ));
        }
        if tag.value.chars().count() > MAX_TAG_VALUE_LEN {
            return Err(InvalidConfiguration::new(
                FIELD,
                format!("tag value for {} exceeds {MAX_TAG_VALUE_LEN} characters", tag.key),
            ));
        }
        if is_system_tag(&tag.key) {
            return Err(InvalidConfiguration::new(
                FIELD,
                format!("tag key {} uses the reserved aws: prefix", tag.key),
            ));
        }
        if !seen.insert(tag.key.as_str()) {
            return Err(InvalidConfiguration::new(
                FIELD,
                format!("duplicate tag key {}", tag.key),
            ));
        }
    }
    Ok(())
}

/// Validate a default encryption configuration.
pub fn validate_encryption(config: &ServerSideEncryptionConfiguration) -> ValidationResult {
    const FIELD: &str = "serverSideEncryptionConfiguration";

    if config.rules.is_empty() {
        return Err(InvalidConfiguration::new(FIELD, "at least one rule is required"));
    }
    for by_default in config
        .rules
        .iter()
        .filter_map(|r| r.apply_server_side_encryption_by_default.as_ref())
    {
        let has_key = by_default
            .kms_master_key_id
            .as_deref()
            .is_some_and(|k| !k.is_empty());
        match (by_default.sse_algorithm.uses_kms(), has_key) {
            (true, false) => {
                return Err(InvalidConfiguration::new(
                    FIELD,
                    format!("{} requires kmsMasterKeyId", by_default.sse_algorithm),
                ));
            }
            (false, true) => {
                return Err(InvalidConfiguration::new(
                    FIELD,
                    format!("kmsMasterKeyId is not allowed with {}", by_default.sse_algorithm),
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Validate a lifecycle configuration.
pub fn validate_lifecycle(config: &LifecycleConfiguration) -> ValidationResult {
    const FIELD: &str = "lifecycleConfiguration";

    if config.rules.is_empty() {
        return Err(InvalidConfiguration::new(FIELD, "at least one rule is required"));
    }
    for (i, rule) in config.rules.iter().enumerate() {
        if rule.filter.as_ref().map_or(0, filter_kinds) != 1 {
            return Err(InvalidConfiguration::new(
                FIELD,
                format!("rule {i}: filter must set exactly one of prefix, tag and and"),
            ));
        }
        if let Some(expiration) = &rule.expiration {
            if expiration.date.is_some() && expiration.days.is_some() {
                return Err(InvalidConfiguration::new(
                    FIELD,
                    format!("rule {i}: expiration date and days are mutually exclusive"),
                ));
            }
        }
        if rule
            .transitions
            .iter()
            .any(|t| t.date.is_some() && t.days.is_some())
        {
            return Err(InvalidConfiguration::new(
                FIELD,
                format!("rule {i}: transition date and days are mutually exclusive"),
            ));
        }
    }
    Ok(())
}

fn filter_kinds(filter: &LifecycleRuleFilter) -> usize {
    usize::from(filter.prefix.is_some())
        + usize::from(filter.tag.is_some())
        + usize::from(filter.and.is_some())
}

/// Validate an object lock default retention rule.
pub fn validate_object_lock_rule(rule: &ObjectLockRule) -> ValidationResult {
    const FIELD: &str = "objectLockConfiguration";

    if let Some(retention) = &rule.default_retention {
        if retention.days.is_some() == retention.years.is_some() {
            return Err(InvalidConfiguration::new(
                FIELD,
                "default retention needs exactly one of days and years",
            ));
        }
    }
    Ok(())
}

/// Validate a replication configuration after references are resolved.
pub fn validate_replication(config: &ReplicationConfiguration) -> ValidationResult {
    const FIELD: &str = "replicationConfiguration";

    if config.role.is_empty() {
        return Err(InvalidConfiguration::new(FIELD, "role is required"));
    }
    if config.rules.is_empty() {
        return Err(InvalidConfiguration::new(FIELD, "at least one rule is required"));
    }
    if let Some(i) = config.rules.iter().position(|r| r.destination.bucket.is_empty()) {
        return Err(InvalidConfiguration::new(
            FIELD,
            format!("rule {i}: destination bucket is required"),
        ));
    }

    let filtered: Vec<_> = config.rules.iter().filter(|r| r.filter.is_some()).collect();
    if filtered.len() > 1 {
        let mut priorities = HashSet::new();
        for rule in filtered {
            if let Some(priority) = rule.priority {
                if !priorities.insert(priority) {
                    return Err(InvalidConfiguration::new(
                        FIELD,
                        format!("priority {priority} is used by more than one rule"),
                    ));
                }
            }
        }
    }
    Ok(())
}
