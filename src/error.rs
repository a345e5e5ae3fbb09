//! Error types for descriptor construction and registration.

use thiserror::Error;

/// Errors that can occur while building the foreign records for a module.
///
/// A build error always means no descriptor reached the runtime. Memory already
/// taken from the arena for the failed attempt is not reclaimed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The arena could not provide memory for a table, record, or string.
    #[error("allocation of {bytes} bytes for {what} failed")]
    Allocation { what: &'static str, bytes: usize },

    /// A string contains a NUL byte and cannot be handed over as a C string.
    #[error("{field} of `{owner}` contains a NUL byte at position {position}")]
    InteriorNul {
        field: &'static str,
        owner: String,
        position: usize,
    },

    /// The requested private state size does not fit the runtime's signed size type.
    #[error("module state size {size} exceeds the runtime's maximum")]
    StateSizeOverflow { size: usize },
}

impl BuildError {
    pub(crate) fn allocation(what: &'static str, bytes: usize) -> Self {
        BuildError::Allocation { what, bytes }
    }

    /// True when the failure came from the allocator rather than from the input.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, BuildError::Allocation { .. })
    }
}

/// Errors that can occur when registering a module with the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The descriptor could not be built; the runtime was never called.
    #[error("failed to build module descriptor: {0}")]
    Build(#[from] BuildError),

    /// The runtime returned a null handle. Details are in the runtime's own
    /// error indicator.
    #[error("runtime rejected module `{module}`")]
    ForeignRejection { module: String },
}

impl RegistrationError {
    /// True when the runtime itself refused the descriptor.
    pub fn is_foreign_rejection(&self) -> bool {
        matches!(self, RegistrationError::ForeignRejection { .. })
    }
}
