//! TOML-file-based BranchRepository implementation.

use crate::paths::{LifeGitPaths, PathError};
use crate::storage::EntityDirStorage;
use async_trait::async_trait;
use lifegit_core::branch::{Branch, BranchRepository};
use lifegit_core::error::{LifeGitError, Result};
use std::path::Path;

/// Branch repository storing one TOML file per branch under
/// `<base>/branches/`.
pub struct TomlBranchRepository {
    storage: EntityDirStorage,
}

impl TomlBranchRepository {
    /// Creates a repository at the default location.
    pub fn new() -> std::result::Result<Self, PathError> {
        Ok(Self::with_base(LifeGitPaths::resolve()?.base()))
    }

    /// Creates a repository with a custom base directory (for testing).
    pub fn with_base(base: &Path) -> Self {
        Self {
            storage: EntityDirStorage::new(base, "branches"),
        }
    }
}

#[async_trait]
impl BranchRepository for TomlBranchRepository {
    async fn find_by_id(&self, branch_id: &str) -> Result<Option<Branch>> {
        self.storage
            .load(branch_id)
            .map_err(|e| LifeGitError::data_access(format!("Failed to load branch: {}", e)))
    }

    async fn find_master(&self) -> Result<Option<Branch>> {
        let branches: Vec<Branch> = self
            .storage
            .load_all()
            .map_err(|e| LifeGitError::data_access(format!("Failed to load branches: {}", e)))?;
        Ok(branches.into_iter().find(|b| b.is_master))
    }

    async fn save(&self, branch: &Branch) -> Result<()> {
        self.storage
            .save(&branch.id, branch)
            .map_err(|e| LifeGitError::data_access(format!("Failed to save branch: {}", e)))
    }

    async fn delete(&self, branch_id: &str) -> Result<()> {
        self.storage
            .delete(branch_id)
            .map_err(|e| LifeGitError::data_access(format!("Failed to delete branch: {}", e)))
    }

    async fn list_all(&self) -> Result<Vec<Branch>> {
        let mut branches: Vec<Branch> = self
            .storage
            .load_all()
            .map_err(|e| LifeGitError::data_access(format!("Failed to load branches: {}", e)))?;
        // Most recent first.
        branches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(branches)
    }

    async fn list_active(&self) -> Result<Vec<Branch>> {
        let branches = self.list_all().await?;
        Ok(branches
            .into_iter()
            .filter(|b| b.is_active() && !b.is_master)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repository() -> (TomlBranchRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlBranchRepository::with_base(temp_dir.path());
        (repo, temp_dir)
    }

    #[tokio::test]
    async fn test_save_and_find_branch() {
        let (repo, _temp_dir) = repository();
        let branch = Branch::new("学英语", "每天学习30分钟", None);

        repo.save(&branch).await.unwrap();

        let found = repo.find_by_id(&branch.id).await.unwrap().unwrap();
        assert_eq!(found, branch);
    }

    #[tokio::test]
    async fn test_find_master_among_branches() {
        let (repo, _temp_dir) = repository();
        let master = Branch::master("master");
        let goal = Branch::new("goal", "", Some(master.id.clone()));
        repo.save(&master).await.unwrap();
        repo.save(&goal).await.unwrap();

        let found = repo.find_master().await.unwrap().unwrap();
        assert_eq!(found.id, master.id);
    }

    #[tokio::test]
    async fn test_list_active_filters_terminal_and_master() {
        let (repo, _temp_dir) = repository();
        let master = Branch::master("master");
        let active = Branch::new("active", "", None);
        let mut done = Branch::new("done", "", None);
        done.complete(chrono::Utc::now()).unwrap();
        repo.save(&master).await.unwrap();
        repo.save(&active).await.unwrap();
        repo.save(&done).await.unwrap();

        let listed = repo.list_active().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, active.id);
    }

    #[tokio::test]
    async fn test_delete_branch() {
        let (repo, _temp_dir) = repository();
        let branch = Branch::new("goal", "", None);
        repo.save(&branch).await.unwrap();

        repo.delete(&branch.id).await.unwrap();

        assert!(repo.find_by_id(&branch.id).await.unwrap().is_none());
    }
}
