//! Error taxonomy for reconcile ticks.
//!
//! Every failure a tick can surface is a [`ProviderError`]. Provider calls are
//! wrapped once with a short sub-resource prefix (`cannot get bucket cors`) and
//! once more by the engine with the phase (`cannot create or update`), so the
//! message on a `Synced=False` condition reads from phase to root cause.

use std::fmt::Write as _;

/// Boxed error used to carry provider SDK errors without naming their type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Phase prefix used when a sub-resource update fails.
pub const ERR_CREATE_OR_UPDATE: &str = "cannot create or update";

/// Phase prefix used when a sub-resource delete fails.
pub const ERR_DELETE: &str = "cannot delete";

/// Error type for everything that can go wrong during a reconcile tick.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// A provider call failed.
    #[error("{context}: {source}")]
    Api {
        /// Short description of the failed call.
        context: String,
        /// The underlying provider error.
        #[source]
        source: BoxError,
    },

    /// The desired state is invalid and will not heal without a spec change.
    #[error("{0}")]
    Configuration(String),

    /// An error wrapped with the reconcile phase it happened in.
    #[error("{context}: {source}")]
    Context {
        /// Phase description.
        context: String,
        /// The wrapped error.
        #[source]
        source: Box<ProviderError>,
    },

    /// Writing the managed resource back to the control plane failed.
    #[error("cannot update managed resource: {0}")]
    ControlPlane(String),

    /// A reference could not be resolved.
    #[error("cannot resolve reference {field}: {reason}")]
    Reference {
        /// Field path of the reference.
        field: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The connector could not build a provider client.
    #[error("cannot connect to provider: {0}")]
    Connect(String),

    /// Several independent failures, reported together.
    #[error("{}", join_errors(.0))]
    Aggregate(Vec<ProviderError>),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ProviderError {
    /// Wrap a provider error with a short call description.
    pub fn api(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Api {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Build a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Wrap an error with the reconcile phase it happened in.
    #[must_use]
    pub fn context(context: impl Into<String>, source: Self) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Build a reference resolution error.
    pub fn reference(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Reference {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Collapse a list of errors: `None` when empty, the error itself when
    /// there is only one.
    #[must_use]
    pub fn aggregate(mut errors: Vec<Self>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Aggregate(errors)),
        }
    }

    /// Whether retrying without a desired-state change is pointless.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Configuration(_) => true,
            Self::Context { source, .. } => source.is_terminal(),
            Self::Aggregate(errors) => errors.iter().any(Self::is_terminal),
            _ => false,
        }
    }

    /// Walk through phase wrappers to the innermost error.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Downcast the provider error carried by an [`ProviderError::Api`]
    /// (possibly behind phase wrappers).
    #[must_use]
    pub fn provider_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self.root() {
            Self::Api { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}

fn join_errors(errors: &[ProviderError]) -> String {
    let mut out = String::new();
    for (i, err) in errors.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        let _ = write!(out, "{err}");
    }
    out
}

/// Convenience result type for reconcile operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
