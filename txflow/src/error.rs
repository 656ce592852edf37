//! Error taxonomy shared by every component of the core.

use thiserror::Error;

/// Result alias used throughout the crate
pub type FlowResult<T> = Result<T, FlowError>;

/// Coarse error category, used by callers to decide on affordances
/// (for example disabling a confirm button on `Incompatible`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    Incompatible,
    Unsupported,
    InvalidAmount,
    Upstream,
}

#[derive(Debug, Error)]
pub enum FlowError {
    /// A network, token, method, pair or market id could not be resolved
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    /// The selection cascade or the supplied parameters are inconsistent
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The bridging method cannot operate between the selected network families
    #[error("incompatible: {0}")]
    Incompatible(String),

    /// The chain id is not handled by the component
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A decimal amount could not be parsed
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Failure from a builder, lookup service or chain client, tagged with
    /// the operation that observed it
    #[error("{op}: {source:#}")]
    Upstream {
        op: String,
        #[source]
        source: anyhow::Error,
    },
}

impl FlowError {
    pub fn not_found(what: &'static str, id: impl Into<String>) -> Self {
        FlowError::NotFound {
            what,
            id: id.into(),
        }
    }

    /// Wraps any error as `Upstream` under the given operation name.
    pub fn upstream(op: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        FlowError::Upstream {
            op: op.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FlowError::NotFound { .. } => ErrorKind::NotFound,
            FlowError::InvalidState(_) => ErrorKind::InvalidState,
            FlowError::Incompatible(_) => ErrorKind::Incompatible,
            FlowError::Unsupported(_) => ErrorKind::Unsupported,
            FlowError::InvalidAmount(_) => ErrorKind::InvalidAmount,
            FlowError::Upstream { .. } => ErrorKind::Upstream,
        }
    }
}

/// Extension for tagging results with the operation that produced them.
pub trait ResultExt<T> {
    /// Converts the error into `FlowError::Upstream` under `op`.
    fn upstream(self, op: &str) -> FlowResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn upstream(self, op: &str) -> FlowResult<T> {
        self.map_err(|e| FlowError::upstream(op, e))
    }
}
