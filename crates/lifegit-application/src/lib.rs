//! Application layer for LifeGit.
//!
//! Coordinates the domain models and ports from `lifegit-core` into the
//! goal-branch lifecycle: branch creation with AI task decomposition,
//! completion and merge onto the master timeline, commit recording, and
//! version-upgrade proposal/acceptance.

pub mod branch_service;
pub mod commit_service;
pub mod decomposition;
pub mod task_service;
pub mod version_service;

pub use branch_service::{BranchService, MergeOutcome};
pub use commit_service::CommitService;
pub use decomposition::{RetryPolicy, TaskDecompositionPipeline};
pub use task_service::{NewTask, TaskService};
pub use version_service::VersionService;
