//! Error types for the stagewire library.
//!
//! Every error is raised at construction time and is fatal to the pipeline
//! build in progress; there is no partial-success mode. After an error the
//! session should be discarded.

use thiserror::Error;

/// The main error type for stagewire operations.
#[derive(Debug, Clone, Error)]
pub enum StagewireError {
    /// Two build units were created with the same id in one session.
    #[error("{0}")]
    DuplicateId(#[from] DuplicateIdError),

    /// A stage was referenced before its body closed.
    #[error("{0}")]
    UnsealedStageReference(#[from] UnsealedStageReferenceError),

    /// A handle from outside the current session was used.
    #[error("{0}")]
    UnknownTarget(#[from] UnknownTargetError),
}

/// Error raised when two build units are declared with the same id in one
/// pipeline session.
#[derive(Debug, Clone, Error)]
#[error("duplicate build unit id '{id}'")]
pub struct DuplicateIdError {
    /// The conflicting unit id.
    pub id: String,
}

impl DuplicateIdError {
    /// Creates a new duplicate id error.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Error raised when a dependency target or appended child is a stage whose
/// body has not yet closed.
///
/// Only a sealed stage has a final entry/exit frontier, so only a sealed
/// stage may be wired against.
#[derive(Debug, Clone, Error)]
#[error("{kind} stage referenced before its body closed")]
pub struct UnsealedStageReferenceError {
    /// The variant of the stage that was still open.
    pub kind: String,
}

impl UnsealedStageReferenceError {
    /// Creates a new unsealed stage reference error.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

/// Error raised when a unit or stage handle does not belong to the current
/// construction session.
#[derive(Debug, Clone, Error)]
#[error("{handle} does not belong to this pipeline session")]
pub struct UnknownTargetError {
    /// Description of the foreign handle.
    pub handle: String,
}

impl UnknownTargetError {
    /// Creates an unknown target error for a foreign unit handle.
    #[must_use]
    pub fn unit() -> Self {
        Self {
            handle: "build unit handle".to_string(),
        }
    }

    /// Creates an unknown target error for a foreign stage handle.
    #[must_use]
    pub fn stage() -> Self {
        Self {
            handle: "stage handle".to_string(),
        }
    }
}
