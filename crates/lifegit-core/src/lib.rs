//! LifeGit core domain layer.
//!
//! Models personal goals as version-control branches: a continuous master
//! life-timeline accumulates completed goals, while each in-progress goal
//! is an isolated branch with its own task breakdown and progress log.
//!
//! This crate owns the domain models, the persistence ports (repository
//! traits), the completion-service port, the shared error taxonomy, and
//! the pure version-upgrade evaluator. Services that coordinate them live
//! in `lifegit-application`; storage adapters live in
//! `lifegit-infrastructure`.

pub mod branch;
pub mod commit;
pub mod completion;
pub mod error;
pub mod plan;
pub mod user;
pub mod version;

// Re-export common error type
pub use error::{LifeGitError, Result};
