//! Cross-resource reference resolution.
//!
//! A referencing field comes as a triple: the literal value, a [`Reference`]
//! naming another managed resource, and a [`Selector`] matching one by labels.
//! [`resolve`] turns the triple into a literal value before any provider call
//! is made, and records which object it resolved to so later ticks are stable.

use std::collections::BTreeMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// A reference to another managed resource by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Name of the referenced object.
    pub name: String,
}

impl Reference {
    /// Create a reference to the named object.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A label query that must match exactly one managed resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    /// Labels the referenced object must carry.
    #[serde(default)]
    pub match_labels: BTreeMap<String, String>,
}

impl Selector {
    /// Whether an object carrying `labels` matches.
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.match_labels
            .iter()
            .all(|(k, v)| labels.get(k).is_some_and(|actual| actual == v))
    }
}

/// What the control plane knows about a potential reference target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencedObject {
    /// Kind of the object.
    pub kind: String,
    /// Control-plane name.
    pub name: String,
    /// Labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// External name, once set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_name: Option<String>,
    /// ARN, once observed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
}

/// Pulls the literal identifier out of a referenced object.
pub type Extractor = fn(&ReferencedObject) -> Option<String>;

/// Extract the external name.
#[must_use]
pub fn external_name(object: &ReferencedObject) -> Option<String> {
    object.external_name.clone()
}

/// Extract the ARN.
#[must_use]
pub fn arn(object: &ReferencedObject) -> Option<String> {
    object.arn.clone()
}

/// Read access to reference targets in the control plane.
#[async_trait]
pub trait ReferenceSource: Send + Sync + Debug {
    /// Fetch one object by kind and name.
    async fn get(&self, kind: &str, name: &str) -> ProviderResult<Option<ReferencedObject>>;

    /// List objects of a kind.
    async fn list(&self, kind: &str) -> ProviderResult<Vec<ReferencedObject>>;
}

/// One field to resolve.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionRequest<'a> {
    /// Field path, used in error messages.
    pub field: &'a str,
    /// Kind of the referenced object.
    pub kind: &'a str,
    /// Literal value already present.
    pub current_value: Option<&'a str>,
    /// Reference by name.
    pub reference: Option<&'a Reference>,
    /// Reference by labels.
    pub selector: Option<&'a Selector>,
    /// Identifier extractor.
    pub extract: Extractor,
}

/// Outcome of resolving one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionResponse {
    /// Value to store in the literal field.
    pub resolved_value: Option<String>,
    /// Reference to record next to it.
    pub resolved_reference: Option<Reference>,
}

/// Resolve one referencing field.
///
/// A non-empty current value wins. Otherwise the named reference is looked up,
/// then the selector, which must match exactly one object. With none of the
/// three set, nothing is resolved.
pub async fn resolve(
    source: &dyn ReferenceSource,
    req: ResolutionRequest<'_>,
) -> ProviderResult<ResolutionResponse> {
    if let Some(value) = req.current_value.filter(|v| !v.is_empty()) {
        return Ok(ResolutionResponse {
            resolved_value: Some(value.to_owned()),
            resolved_reference: req.reference.cloned(),
        });
    }

    let target = if let Some(reference) = req.reference {
        source
            .get(req.kind, &reference.name)
            .await?
            .ok_or_else(|| {
                ProviderError::reference(
                    req.field,
                    format!("referenced {} {} not found", req.kind, reference.name),
                )
            })?
    } else if let Some(selector) = req.selector {
        let mut matches: Vec<_> = source
            .list(req.kind)
            .await?
            .into_iter()
            .filter(|o| selector.matches(&o.labels))
            .collect();
        match matches.len() {
            1 => matches.remove(0),
            0 => {
                return Err(ProviderError::reference(
                    req.field,
                    format!("no {} matches selector", req.kind),
                ));
            }
            n => {
                return Err(ProviderError::reference(
                    req.field,
                    format!("selector matches {n} {} objects, expected exactly one", req.kind),
                ));
            }
        }
    } else {
        return Ok(ResolutionResponse::default());
    };

    let value = (req.extract)(&target).filter(|v| !v.is_empty()).ok_or_else(|| {
        ProviderError::reference(
            req.field,
            format!("referenced {} {} is not ready", req.kind, target.name),
        )
    })?;

    debug!(field = req.field, target = %target.name, value = %value, "resolved reference");
    Ok(ResolutionResponse {
        resolved_value: Some(value),
        resolved_reference: Some(Reference::new(target.name)),
    })
}

/// Rewrites every referencing field of a managed resource into a literal.
#[async_trait]
pub trait ReferenceResolver<R>: Send + Sync + Debug {
    /// Resolve all references of `resource` in place.
    async fn resolve_references(
        &self,
        source: &dyn ReferenceSource,
        resource: &mut R,
    ) -> ProviderResult<()>;
}
