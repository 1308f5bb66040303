//! TOML-file-based CommitRepository implementation.

use crate::paths::{LifeGitPaths, PathError};
use crate::storage::EntityDirStorage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lifegit_core::commit::{Commit, CommitRepository};
use lifegit_core::error::{LifeGitError, Result};
use std::path::Path;

/// Commit repository storing one TOML file per commit under
/// `<base>/commits/`.
pub struct TomlCommitRepository {
    storage: EntityDirStorage,
}

impl TomlCommitRepository {
    /// Creates a repository at the default location.
    pub fn new() -> std::result::Result<Self, PathError> {
        Ok(Self::with_base(LifeGitPaths::resolve()?.base()))
    }

    /// Creates a repository with a custom base directory (for testing).
    pub fn with_base(base: &Path) -> Self {
        Self {
            storage: EntityDirStorage::new(base, "commits"),
        }
    }

    fn load_sorted(&self) -> Result<Vec<Commit>> {
        let mut commits: Vec<Commit> = self
            .storage
            .load_all()
            .map_err(|e| LifeGitError::data_access(format!("Failed to load commits: {}", e)))?;
        commits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(commits)
    }
}

#[async_trait]
impl CommitRepository for TomlCommitRepository {
    async fn find_by_id(&self, commit_id: &str) -> Result<Option<Commit>> {
        self.storage
            .load(commit_id)
            .map_err(|e| LifeGitError::data_access(format!("Failed to load commit: {}", e)))
    }

    async fn save(&self, commit: &Commit) -> Result<()> {
        self.storage
            .save(&commit.id, commit)
            .map_err(|e| LifeGitError::data_access(format!("Failed to save commit: {}", e)))
    }

    async fn update(&self, commit: &Commit) -> Result<()> {
        self.save(commit).await
    }

    async fn delete(&self, commit_id: &str) -> Result<()> {
        self.storage
            .delete(commit_id)
            .map_err(|e| LifeGitError::data_access(format!("Failed to delete commit: {}", e)))
    }

    async fn list_by_branch(&self, branch_id: &str) -> Result<Vec<Commit>> {
        Ok(self
            .load_sorted()?
            .into_iter()
            .filter(|c| c.branch_id == branch_id)
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Commit>> {
        self.load_sorted()
    }

    async fn count_by_branch(&self, branch_id: &str) -> Result<usize> {
        Ok(self.list_by_branch(branch_id).await?.len())
    }

    async fn search_by_content(&self, text: &str) -> Result<Vec<Commit>> {
        Ok(self
            .load_sorted()?
            .into_iter()
            .filter(|c| c.message.contains(text))
            .collect())
    }

    async fn find_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Commit>> {
        Ok(self
            .load_sorted()?
            .into_iter()
            .filter(|c| c.timestamp >= from && c.timestamp < to)
            .collect())
    }

    async fn delete_by_branch(&self, branch_id: &str) -> Result<()> {
        for commit in self.list_by_branch(branch_id).await? {
            self.delete(&commit.id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use lifegit_core::commit::CommitType;
    use tempfile::TempDir;

    fn repository() -> (TomlCommitRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlCommitRepository::with_base(temp_dir.path());
        (repo, temp_dir)
    }

    #[tokio::test]
    async fn test_save_and_find_commit() {
        let (repo, _temp_dir) = repository();
        let commit = Commit::new(
            "Studied 30 minutes",
            CommitType::Learning,
            "branch-1",
            None,
        );

        repo.save(&commit).await.unwrap();

        let found = repo.find_by_id(&commit.id).await.unwrap().unwrap();
        assert_eq!(found, commit);
    }

    #[tokio::test]
    async fn test_list_by_branch_newest_first() {
        let (repo, _temp_dir) = repository();
        let mut older = Commit::new("older", CommitType::Learning, "branch-1", None);
        older.timestamp = Utc::now() - Duration::hours(2);
        let newer = Commit::new("newer", CommitType::Learning, "branch-1", None);
        let elsewhere = Commit::new("elsewhere", CommitType::Learning, "branch-2", None);
        repo.save(&older).await.unwrap();
        repo.save(&newer).await.unwrap();
        repo.save(&elsewhere).await.unwrap();

        let listed = repo.list_by_branch("branch-1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].message, "newer");
        assert_eq!(repo.count_by_branch("branch-1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_search_and_date_range() {
        let (repo, _temp_dir) = repository();
        let mut old = Commit::new("vocabulary drill", CommitType::TaskComplete, "b", None);
        old.timestamp = Utc::now() - Duration::days(10);
        let recent = Commit::new("grammar review", CommitType::Learning, "b", None);
        repo.save(&old).await.unwrap();
        repo.save(&recent).await.unwrap();

        let hits = repo.search_by_content("grammar").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].message, "grammar review");

        let window = repo
            .find_by_date_range(Utc::now() - Duration::days(1), Utc::now() + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].message, "grammar review");
    }

    #[tokio::test]
    async fn test_delete_by_branch_cascades() {
        let (repo, _temp_dir) = repository();
        for i in 0..3 {
            let commit = Commit::new(format!("c{i}"), CommitType::Learning, "branch-1", None);
            repo.save(&commit).await.unwrap();
        }
        let keep = Commit::new("keep", CommitType::Learning, "branch-2", None);
        repo.save(&keep).await.unwrap();

        repo.delete_by_branch("branch-1").await.unwrap();

        assert_eq!(repo.count_by_branch("branch-1").await.unwrap(), 0);
        assert_eq!(repo.count_by_branch("branch-2").await.unwrap(), 1);
    }
}
