//! Bucket policy serialization and semantic comparison.
//!
//! The desired policy is a typed [`BucketPolicyBody`]; the provider returns
//! whatever JSON it stored, with its own key order and scalar-vs-list
//! spelling. Both sides are brought to one normal form before comparing:
//!
//! - `Statement` is always a list.
//! - String lists are sorted and deduplicated; a single-entry list becomes a
//!   scalar.
//! - A principal of `{"AWS": "*"}` is the same as `"*"`.

use rustack_s3_model::policy::{BucketPolicyBody, BucketPrincipal, BucketPolicyStatement};
use serde_json::{Map, Value, json};

/// Failure to read a policy document.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The document is not JSON.
    #[error("policy is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The document is JSON but not an object.
    #[error("policy must be a JSON object")]
    NotAnObject,
}

/// Serialize a typed policy to the JSON document S3 accepts.
#[must_use]
pub fn serialize_policy(body: &BucketPolicyBody) -> String {
    policy_value(body).to_string()
}

fn policy_value(body: &BucketPolicyBody) -> Value {
    let mut doc = Map::new();
    if let Some(version) = &body.version {
        doc.insert("Version".into(), json!(version));
    }
    if let Some(id) = &body.id {
        doc.insert("Id".into(), json!(id));
    }
    let statements: Vec<Value> = body.statements.iter().map(statement_value).collect();
    doc.insert("Statement".into(), Value::Array(statements));
    Value::Object(doc)
}

fn statement_value(statement: &BucketPolicyStatement) -> Value {
    let mut out = Map::new();
    if let Some(sid) = &statement.sid {
        out.insert("Sid".into(), json!(sid));
    }
    out.insert("Effect".into(), json!(statement.effect.as_str()));
    if let Some(principal) = &statement.principal {
        out.insert("Principal".into(), principal_value(principal));
    }
    if let Some(principal) = &statement.not_principal {
        out.insert("NotPrincipal".into(), principal_value(principal));
    }
    for (key, values) in [
        ("Action", &statement.action),
        ("NotAction", &statement.not_action),
        ("Resource", &statement.resource),
        ("NotResource", &statement.not_resource),
    ] {
        if !values.is_empty() {
            out.insert(key.into(), string_list(values));
        }
    }
    if !statement.condition.is_empty() {
        let mut operators = Map::new();
        for condition in &statement.condition {
            let pairs = operators
                .entry(condition.operator_key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(pairs) = pairs {
                for pair in &condition.conditions {
                    pairs.insert(pair.key.clone(), string_list(&pair.values));
                }
            }
        }
        out.insert("Condition".into(), Value::Object(operators));
    }
    Value::Object(out)
}

fn principal_value(principal: &BucketPrincipal) -> Value {
    if principal.all_principals == Some(true) {
        return json!("*");
    }
    let mut out = Map::new();
    for (key, values) in [
        ("AWS", &principal.aws_principals),
        ("Service", &principal.service),
        ("Federated", &principal.federated),
        ("CanonicalUser", &principal.canonical_user),
    ] {
        if !values.is_empty() {
            out.insert(key.into(), string_list(values));
        }
    }
    Value::Object(out)
}

fn string_list(values: &[String]) -> Value {
    match values {
        [single] => json!(single),
        many => json!(many),
    }
}

/// Parse a policy document into its normal form.
///
/// # Errors
///
/// Returns [`PolicyError`] when the document is not a JSON object.
pub fn normalize_policy(document: &str) -> Result<Value, PolicyError> {
    let value: Value = serde_json::from_str(document)?;
    let Value::Object(doc) = value else {
        return Err(PolicyError::NotAnObject);
    };
    Ok(Value::Object(normalize_document(doc)))
}

fn normalize_document(mut doc: Map<String, Value>) -> Map<String, Value> {
    if let Some(statement) = doc.remove("Statement") {
        let statements = match statement {
            Value::Array(items) => items,
            single => vec![single],
        };
        let statements = statements
            .into_iter()
            .map(|s| match s {
                Value::Object(s) => Value::Object(normalize_statement(s)),
                other => other,
            })
            .collect();
        doc.insert("Statement".into(), Value::Array(statements));
    }
    doc
}

fn normalize_statement(statement: Map<String, Value>) -> Map<String, Value> {
    statement
        .into_iter()
        .map(|(key, value)| {
            let value = match key.as_str() {
                "Principal" | "NotPrincipal" => normalize_principal(value),
                _ => normalize_value(value),
            };
            (key, value)
        })
        .collect()
}

fn normalize_principal(value: Value) -> Value {
    let value = normalize_value(value);
    if let Value::Object(map) = &value {
        if map.len() == 1 && map.get("AWS") == Some(&json!("*")) {
            return json!("*");
        }
    }
    value
}

fn normalize_value(value: Value) -> Value {
    match value {
        Value::Array(items) if items.iter().all(Value::is_string) => {
            let mut strings: Vec<String> = items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect();
            strings.sort_unstable();
            strings.dedup();
            string_list(&strings)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_value(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Whether the desired typed policy and an observed document mean the same.
///
/// # Errors
///
/// Returns [`PolicyError`] when the observed document cannot be parsed.
pub fn policy_matches(desired: &BucketPolicyBody, observed: &str) -> Result<bool, PolicyError> {
    let desired = normalize_policy(&serialize_policy(desired))?;
    Ok(desired == normalize_policy(observed)?)
}
