//! Error types for negotiation, dispatch and catalog loading.

use thiserror::Error;

use crate::{CapabilityName, OperationName, RevisionTag};

/// Result type for GLX operations.
pub type GlxResult<T> = Result<T, GlxError>;

/// Errors raised while acquiring a handle or invoking an operation on it.
#[derive(Debug, Error)]
pub enum GlxError {
    /// A forced revision could not be obtained from the surface.
    #[error("{0} context unavailable and its revision was forced")]
    UnavailableRevision(RevisionTag),

    /// Neither revision could be obtained.
    #[error("no WebGL context available")]
    NoContext,

    /// A required capability is neither implicit nor activatable.
    #[error("extension {0} unavailable")]
    MissingCapability(CapabilityName),

    /// An operation resolved to the unsupported stub was invoked.
    #[error("operation \"{operation}\" not available{}", unlock_hint(.capability.as_ref()))]
    UnsupportedOperation {
        /// The invoked operation.
        operation: OperationName,
        /// Capability that would have provided the operation, when known.
        capability: Option<CapabilityName>,
    },

    /// The operation name is not part of the catalog.
    #[error("unknown operation \"{0}\"")]
    UnknownOperation(OperationName),

    /// Instrumentation was attempted on something that is not a GLX handle.
    #[error("not a GLX context handle")]
    InvalidHandle,

    /// The underlying provider rejected a forwarded call.
    #[error("provider call \"{operation}\" failed: {message}")]
    Provider {
        /// Concrete method that failed.
        operation: String,
        /// Provider supplied description.
        message: String,
    },

    /// The capability catalog is malformed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

fn unlock_hint(capability: Option<&CapabilityName>) -> String {
    capability.map_or_else(String::new, |c| format!(" (requires extension {c})"))
}

/// Errors found while loading or validating a capability catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The document is not valid catalog JSON.
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog file could not be read.
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// An operation name is listed more than once.
    #[error("operation \"{0}\" listed more than once")]
    DuplicateOperation(String),

    /// An extension binding names an empty capability or method.
    #[error("extension binding for \"{0}\" has an empty capability or method name")]
    EmptyCapability(String),

    /// A parameter default refers to a constant missing from every enum table.
    #[error("unknown constant \"{0}\"")]
    UnknownConstant(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_operation_names_unlocking_extension() {
        let err = GlxError::UnsupportedOperation {
            operation: OperationName::from("drawBuffers"),
            capability: Some(CapabilityName::from("WEBGL_draw_buffers")),
        };
        let text = err.to_string();
        assert!(text.contains("\"drawBuffers\""));
        assert!(text.contains("WEBGL_draw_buffers"));
    }

    #[test]
    fn unsupported_operation_without_capability_has_no_hint() {
        let err = GlxError::UnsupportedOperation {
            operation: OperationName::from("texStorage3D"),
            capability: None,
        };
        assert_eq!(err.to_string(), "operation \"texStorage3D\" not available");
    }

    #[test]
    fn unavailable_revision_names_revision() {
        let err = GlxError::UnavailableRevision(RevisionTag::Modern);
        assert!(err.to_string().starts_with("WebGL 2"));
    }
}
