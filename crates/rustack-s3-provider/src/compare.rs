//! Order-insensitive comparison helpers shared by the sub-resources.
//!
//! The provider is free to return lists in any order and to attach its own
//! `aws:` tags, so drift detection compares normalized copies.

use rustack_s3_model::types::{
    FilterRule, LifecycleRuleFilter, NotificationTarget, ReplicationRuleFilter, Tag,
};

/// Prefix of tag keys reserved for the provider.
pub const SYSTEM_TAG_PREFIX: &str = "aws:";

/// Whether `key` is a provider-managed tag key.
#[must_use]
pub fn is_system_tag(key: &str) -> bool {
    key.starts_with(SYSTEM_TAG_PREFIX)
}

/// Sort tags by key, then value.
pub fn sort_tags(tags: &mut [Tag]) {
    tags.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.value.cmp(&b.value)));
}

/// User tags of `tags`, sorted.
#[must_use]
pub fn user_tags(tags: &[Tag]) -> Vec<Tag> {
    let mut out: Vec<Tag> = tags.iter().filter(|t| !is_system_tag(&t.key)).cloned().collect();
    sort_tags(&mut out);
    out
}

/// System tags of `tags`, sorted.
#[must_use]
pub fn system_tags(tags: &[Tag]) -> Vec<Tag> {
    let mut out: Vec<Tag> = tags.iter().filter(|t| is_system_tag(&t.key)).cloned().collect();
    sort_tags(&mut out);
    out
}

/// Compare two user tag sets ignoring order and system tags.
#[must_use]
pub fn user_tags_equal(desired: &[Tag], observed: &[Tag]) -> bool {
    user_tags(desired) == user_tags(observed)
}

/// Copy of a lifecycle filter with its `and` tags sorted.
#[must_use]
pub fn normalize_lifecycle_filter(filter: &LifecycleRuleFilter) -> LifecycleRuleFilter {
    let mut out = filter.clone();
    if let Some(and) = out.and.as_mut() {
        sort_tags(&mut and.tags);
    }
    out
}

/// Copy of a replication filter with its `and` tags sorted.
#[must_use]
pub fn normalize_replication_filter(filter: &ReplicationRuleFilter) -> ReplicationRuleFilter {
    let mut out = filter.clone();
    if let Some(and) = out.and.as_mut() {
        sort_tags(&mut and.tags);
    }
    out
}

/// Compare two string lists as sets.
#[must_use]
pub fn same_set(a: &[String], b: &[String]) -> bool {
    let mut a: Vec<&str> = a.iter().map(String::as_str).collect();
    let mut b: Vec<&str> = b.iter().map(String::as_str).collect();
    a.sort_unstable();
    a.dedup();
    b.sort_unstable();
    b.dedup();
    a == b
}

/// Compare one desired notification target to an observed one.
///
/// Events are a set and filter rules are order-insensitive. The observed ID
/// is only checked when the desired target names one, since the provider
/// assigns IDs itself.
#[must_use]
pub fn notification_target_matches(
    desired: &NotificationTarget,
    observed: &NotificationTarget,
) -> bool {
    if desired.id.is_some() && desired.id != observed.id {
        return false;
    }
    if desired.arn != observed.arn || !same_set(&desired.events, &observed.events) {
        return false;
    }
    sorted_rules(&desired.filter_rules) == sorted_rules(&observed.filter_rules)
}

fn sorted_rules(rules: &[FilterRule]) -> Vec<FilterRule> {
    let mut out = rules.to_vec();
    out.sort();
    out
}

/// Compare two notification target lists position by position.
#[must_use]
pub fn notification_targets_match(
    desired: &[NotificationTarget],
    observed: &[NotificationTarget],
) -> bool {
    desired.len() == observed.len()
        && desired
            .iter()
            .zip(observed)
            .all(|(d, o)| notification_target_matches(d, o))
}

#[cfg(test)]
mod tests {
    use rustack_s3_model::types::{FilterRuleName, ReplicationRuleAndOperator};

    use super::*;

    #[test]
    fn test_should_ignore_order_and_system_tags() {
        let desired = vec![Tag::new("b", "2"), Tag::new("a", "1")];
        let observed = vec![
            Tag::new("aws:cloudformation:stack-name", "s"),
            Tag::new("a", "1"),
            Tag::new("b", "2"),
        ];
        assert!(user_tags_equal(&desired, &observed));
        assert_eq!(system_tags(&observed).len(), 1);
        assert!(!user_tags_equal(&desired, &[Tag::new("a", "1")]));
    }

    #[test]
    fn test_should_sort_replication_filter_tags() {
        let filter = ReplicationRuleFilter {
            and: Some(ReplicationRuleAndOperator {
                prefix: Some("p/".into()),
                tags: vec![Tag::new("z", "1"), Tag::new("a", "1")],
            }),
            ..ReplicationRuleFilter::default()
        };
        let normalized = normalize_replication_filter(&filter);
        let keys: Vec<_> = normalized.and.unwrap().tags.into_iter().map(|t| t.key).collect();
        assert_eq!(keys, vec!["a", "z"]);
    }

    #[test]
    fn test_should_compare_notification_targets() {
        let desired = NotificationTarget {
            id: None,
            arn: "arn:aws:sqs:us-east-1:123456789012:q".into(),
            events: vec!["s3:ObjectRemoved:*".into(), "s3:ObjectCreated:*".into()],
            filter_rules: vec![FilterRule {
                name: FilterRuleName::Suffix,
                value: ".jpg".into(),
            }],
        };
        let mut observed = desired.clone();
        observed.id = Some("generated".into());
        observed.events.reverse();
        assert!(notification_target_matches(&desired, &observed));

        let mut named = desired.clone();
        named.id = Some("mine".into());
        assert!(!notification_target_matches(&named, &observed));

        observed.events.pop();
        assert!(!notification_target_matches(&desired, &observed));
    }

    #[test]
    fn test_should_compare_sets() {
        assert!(same_set(&["a".into(), "b".into()], &["b".into(), "a".into(), "a".into()]));
        assert!(!same_set(&["a".into()], &["b".into()]));
    }
}
