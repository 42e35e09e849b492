//! Status conditions published on managed resources.
//!
//! A resource carries at most one condition per [`ConditionType`]. Setting a
//! condition replaces the previous one of the same type; the transition time
//! only moves when status, reason or message actually change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionType {
    /// Whether the external resource is usable.
    Ready,
    /// Whether the last reconcile tick succeeded.
    Synced,
}

/// Tri-state condition status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionStatus {
    /// Condition holds.
    True,
    /// Condition does not hold.
    False,
    /// Not yet known.
    Unknown,
}

/// Machine-readable reason attached to a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionReason {
    /// The external resource is ready for use.
    Available,
    /// The external resource exists but is not usable.
    Unavailable,
    /// The external resource is being created.
    Creating,
    /// The external resource is being deleted.
    Deleting,
    /// The last tick succeeded.
    ReconcileSuccess,
    /// The last tick failed.
    ReconcileError,
}

impl ConditionReason {
    /// Returns the wire string of the reason.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Unavailable => "Unavailable",
            Self::Creating => "Creating",
            Self::Deleting => "Deleting",
            Self::ReconcileSuccess => "ReconcileSuccess",
            Self::ReconcileError => "ReconcileError",
        }
    }
}

impl std::fmt::Display for ConditionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single status condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Condition kind.
    #[serde(rename = "type")]
    pub kind: ConditionType,
    /// Condition status.
    pub status: ConditionStatus,
    /// Reason for the status.
    pub reason: ConditionReason,
    /// Human-readable detail, usually a wrapped error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// When the status last changed.
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    fn new(kind: ConditionType, status: ConditionStatus, reason: ConditionReason) -> Self {
        Self {
            kind,
            status,
            reason,
            message: None,
            last_transition_time: Utc::now(),
        }
    }

    /// `Ready=True`, reason `Available`.
    #[must_use]
    pub fn available() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::True, ConditionReason::Available)
    }

    /// `Ready=False`, reason `Unavailable`.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(
            ConditionType::Ready,
            ConditionStatus::False,
            ConditionReason::Unavailable,
        )
    }

    /// `Ready=False`, reason `Creating`.
    #[must_use]
    pub fn creating() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::False, ConditionReason::Creating)
    }

    /// `Ready=False`, reason `Deleting`.
    #[must_use]
    pub fn deleting() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::False, ConditionReason::Deleting)
    }

    /// `Synced=True`, reason `ReconcileSuccess`.
    #[must_use]
    pub fn reconcile_success() -> Self {
        Self::new(
            ConditionType::Synced,
            ConditionStatus::True,
            ConditionReason::ReconcileSuccess,
        )
    }

    /// `Synced=False`, reason `ReconcileError`, carrying the error message.
    #[must_use]
    pub fn reconcile_error(err: &impl std::fmt::Display) -> Self {
        Self {
            message: Some(err.to_string()),
            ..Self::new(
                ConditionType::Synced,
                ConditionStatus::False,
                ConditionReason::ReconcileError,
            )
        }
    }

    /// Whether two conditions are equal apart from their transition time.
    #[must_use]
    pub fn equal_ignoring_time(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
    }
}

/// Set `condition` in `conditions`, replacing any condition of the same type.
///
/// Returns `true` when the set changed.
pub fn set_condition(conditions: &mut Vec<Condition>, condition: Condition) -> bool {
    match conditions.iter_mut().find(|c| c.kind == condition.kind) {
        Some(existing) if existing.equal_ignoring_time(&condition) => false,
        Some(existing) => {
            *existing = condition;
            true
        }
        None => {
            conditions.push(condition);
            true
        }
    }
}

/// Look up the condition of the given type.
#[must_use]
pub fn get_condition(conditions: &[Condition], kind: ConditionType) -> Option<&Condition> {
    conditions.iter().find(|c| c.kind == kind)
}
