//! Errors returned by checks
//!
//! Absence (missing singleton, uninstalled CRD, empty result) is never an
//! error - it becomes a condition on the diagnostic. Everything here means
//! the check could not be evaluated.

use kompat_cluster::{FieldPathError, ReadError};

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// Two checks registered with the same ID
    #[error("check '{0}' is already registered")]
    DuplicateCheck(String),

    /// A cluster read failed for a reason other than absence
    #[error("{context}: {source}")]
    Read {
        context: String,
        #[source]
        source: ReadError,
    },

    /// A check was written with a malformed field path
    #[error(transparent)]
    FieldPath(#[from] FieldPathError),

    /// An object could not be decoded into the expected shape
    #[error("decoding {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A workload filter returned an error
    #[error("filtering {resource}: {source}")]
    Filter {
        resource: String,
        #[source]
        source: Box<CheckError>,
    },

    /// An operator condition builder returned an error
    #[error("building condition for {kind}: {source}")]
    Condition {
        kind: String,
        #[source]
        source: Box<CheckError>,
    },

    /// The management state field holds something other than Managed/Unmanaged/Removed
    #[error("component '{component}' has unknown management state '{value}'")]
    InvalidManagementState { component: String, value: String },

    /// The run was cancelled while a read was in flight
    #[error("operation cancelled")]
    Cancelled,

    /// Error raised by check policy code
    #[error(transparent)]
    Policy(#[from] anyhow::Error),
}

impl CheckError {
    /// Wrap a read failure with call-site context
    pub fn read(context: impl Into<String>, source: ReadError) -> Self {
        Self::Read {
            context: context.into(),
            source,
        }
    }

    /// Wrap a decode failure with call-site context
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// Whether the error (or the error it wraps) is a cancellation
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::Filter { source, .. } | Self::Condition { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}
