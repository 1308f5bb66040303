//! Error types for the LifeGit core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the LifeGit core and its services.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum LifeGitError {
    /// Input validation error (empty name, empty message, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A branch was asked to transition from a status that does not allow it
    #[error("Invalid branch state for {operation}: branch is {status}")]
    InvalidBranchState { operation: String, status: String },

    /// Misuse of an operation (e.g. completing or merging the master branch)
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Branch creation left partial state behind (branch persisted, plan lost)
    #[error("Branch creation failed: {0}")]
    CreationFailed(String),

    /// No master branch exists in the store
    #[error("Master branch not found")]
    MasterBranchNotFound,

    /// A branch has no task plan yet
    #[error("Branch '{branch_id}' has no task plan")]
    NoTaskPlan { branch_id: String },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound { entity_type: String, id: String },

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LifeGitError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an InvalidBranchState error
    pub fn invalid_state(operation: impl Into<String>, status: impl Into<String>) -> Self {
        Self::InvalidBranchState {
            operation: operation.into(),
            status: status.into(),
        }
    }

    /// Creates an InvalidOperation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an InvalidBranchState or InvalidOperation error
    pub fn is_invalid_use(&self) -> bool {
        matches!(
            self,
            Self::InvalidBranchState { .. } | Self::InvalidOperation(_)
        )
    }

    /// Check if this is a NotFound-style error (including the missing master
    /// branch and missing task plan variants), so callers can offer repair
    /// actions such as recreating the master branch.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::MasterBranchNotFound | Self::NoTaskPlan { .. }
        )
    }

    /// Check if this is a DataAccess error
    pub fn is_data_access(&self) -> bool {
        matches!(self, Self::DataAccess(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for LifeGitError {
    fn from(err: std::io::Error) -> Self {
        Self::DataAccess(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for LifeGitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for LifeGitError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for LifeGitError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, LifeGitError>`.
pub type Result<T> = std::result::Result<T, LifeGitError>;
