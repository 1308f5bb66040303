//! Commit repository trait.
//!
//! Defines the interface for commit persistence operations, including the
//! predicate queries the recorder and the version evaluator read from.

use super::model::Commit;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// An abstract repository for managing commit persistence.
#[async_trait]
pub trait CommitRepository: Send + Sync {
    /// Finds a commit by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Commit))`: Commit found
    /// - `Ok(None)`: Commit not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, commit_id: &str) -> Result<Option<Commit>>;

    /// Saves a new commit.
    async fn save(&self, commit: &Commit) -> Result<()>;

    /// Updates an existing commit (explicit user edit).
    async fn update(&self, commit: &Commit) -> Result<()>;

    /// Deletes a commit by its ID.
    async fn delete(&self, commit_id: &str) -> Result<()>;

    /// Lists all commits for a branch, newest first.
    async fn list_by_branch(&self, branch_id: &str) -> Result<Vec<Commit>>;

    /// Lists every stored commit, newest first.
    async fn list_all(&self) -> Result<Vec<Commit>>;

    /// Counts the commits recorded on a branch.
    async fn count_by_branch(&self, branch_id: &str) -> Result<usize>;

    /// Finds commits whose message contains the given text.
    async fn search_by_content(&self, text: &str) -> Result<Vec<Commit>>;

    /// Finds commits in the half-open timestamp range `[from, to)`.
    async fn find_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Commit>>;

    /// Deletes every commit on a branch (cascade support for branch deletion).
    async fn delete_by_branch(&self, branch_id: &str) -> Result<()>;
}
