//! Structured bucket policy body.
//!
//! The manifest carries the policy as typed statements rather than a JSON
//! string so that field order and scalar-vs-list spelling never matter to the
//! user. The provider crate serializes this to the canonical AWS JSON form.

use serde::{Deserialize, Serialize};

/// Statement effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyEffect {
    /// Allow the listed actions.
    #[default]
    Allow,
    /// Deny the listed actions.
    Deny,
}

impl PolicyEffect {
    /// Wire spelling.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "Allow",
            Self::Deny => "Deny",
        }
    }
}

/// Who a statement applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketPrincipal {
    /// `"Principal": "*"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_principals: Option<bool>,
    /// AWS account or IAM principal ARNs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aws_principals: Vec<String>,
    /// Service principals, e.g. `logging.s3.amazonaws.com`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service: Vec<String>,
    /// Federated identity providers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub federated: Vec<String>,
    /// Canonical user IDs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub canonical_user: Vec<String>,
}

/// One key inside a condition operator block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionPair {
    /// Condition key, e.g. `aws:SecureTransport`.
    pub key: String,
    /// Values; a single value is written as a scalar.
    #[serde(default)]
    pub values: Vec<String>,
}

/// A condition operator with its key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyCondition {
    /// Operator, e.g. `Bool` or `StringEquals`.
    pub operator_key: String,
    /// Pairs checked by the operator.
    #[serde(default)]
    pub conditions: Vec<ConditionPair>,
}

/// One policy statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketPolicyStatement {
    /// Statement identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// Allow or deny.
    #[serde(default)]
    pub effect: PolicyEffect,
    /// Principals the statement applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<BucketPrincipal>,
    /// Principals the statement does not apply to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_principal: Option<BucketPrincipal>,
    /// Actions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action: Vec<String>,
    /// Excluded actions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_action: Vec<String>,
    /// Resources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource: Vec<String>,
    /// Excluded resources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_resource: Vec<String>,
    /// Conditions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub condition: Vec<PolicyCondition>,
}

/// A bucket policy document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketPolicyBody {
    /// Policy language version, usually `2012-10-17`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Policy identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Statements.
    #[serde(default)]
    pub statements: Vec<BucketPolicyStatement>,
}
