//! In-memory repository implementations.
//!
//! Map-backed ports for tests and for embedders that bring their own
//! durability. Behavior matches the TOML repositories, minus the disk.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use lifegit_core::branch::{Branch, BranchRepository};
use lifegit_core::commit::{Commit, CommitRepository};
use lifegit_core::error::{LifeGitError, Result};
use lifegit_core::plan::{TaskPlan, TaskPlanRepository};
use lifegit_core::user::{UserProfile, UserRepository};
use lifegit_core::version::{VersionRecord, VersionRecordRepository};

fn lock_err() -> LifeGitError {
    LifeGitError::internal("repository lock poisoned")
}

/// In-memory branch store.
#[derive(Default)]
pub struct InMemoryBranchRepository {
    inner: Mutex<HashMap<String, Branch>>,
}

impl InMemoryBranchRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BranchRepository for InMemoryBranchRepository {
    async fn find_by_id(&self, branch_id: &str) -> Result<Option<Branch>> {
        let inner = self.inner.lock().map_err(|_| lock_err())?;
        Ok(inner.get(branch_id).cloned())
    }

    async fn find_master(&self) -> Result<Option<Branch>> {
        let inner = self.inner.lock().map_err(|_| lock_err())?;
        Ok(inner.values().find(|b| b.is_master).cloned())
    }

    async fn save(&self, branch: &Branch) -> Result<()> {
        let mut inner = self.inner.lock().map_err(|_| lock_err())?;
        inner.insert(branch.id.clone(), branch.clone());
        Ok(())
    }

    async fn delete(&self, branch_id: &str) -> Result<()> {
        let mut inner = self.inner.lock().map_err(|_| lock_err())?;
        inner.remove(branch_id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Branch>> {
        let inner = self.inner.lock().map_err(|_| lock_err())?;
        let mut branches: Vec<Branch> = inner.values().cloned().collect();
        branches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(branches)
    }

    async fn list_active(&self) -> Result<Vec<Branch>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter(|b| b.is_active() && !b.is_master)
            .collect())
    }
}

/// In-memory commit store.
#[derive(Default)]
pub struct InMemoryCommitRepository {
    inner: Mutex<HashMap<String, Commit>>,
}

impl InMemoryCommitRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommitRepository for InMemoryCommitRepository {
    async fn find_by_id(&self, commit_id: &str) -> Result<Option<Commit>> {
        let inner = self.inner.lock().map_err(|_| lock_err())?;
        Ok(inner.get(commit_id).cloned())
    }

    async fn save(&self, commit: &Commit) -> Result<()> {
        let mut inner = self.inner.lock().map_err(|_| lock_err())?;
        inner.insert(commit.id.clone(), commit.clone());
        Ok(())
    }

    async fn update(&self, commit: &Commit) -> Result<()> {
        self.save(commit).await
    }

    async fn delete(&self, commit_id: &str) -> Result<()> {
        let mut inner = self.inner.lock().map_err(|_| lock_err())?;
        inner.remove(commit_id);
        Ok(())
    }

    async fn list_by_branch(&self, branch_id: &str) -> Result<Vec<Commit>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter(|c| c.branch_id == branch_id)
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Commit>> {
        let inner = self.inner.lock().map_err(|_| lock_err())?;
        let mut commits: Vec<Commit> = inner.values().cloned().collect();
        commits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(commits)
    }

    async fn count_by_branch(&self, branch_id: &str) -> Result<usize> {
        Ok(self.list_by_branch(branch_id).await?.len())
    }

    async fn search_by_content(&self, text: &str) -> Result<Vec<Commit>> {
        Ok(self
            .list_all()
            .await?
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
            .list_all()
            .await?
            .into_iter()
            .filter(|c| c.timestamp >= from && c.timestamp < to)
            .collect())
    }

    async fn delete_by_branch(&self, branch_id: &str) -> Result<()> {
        let mut inner = self.inner.lock().map_err(|_| lock_err())?;
        inner.retain(|_, c| c.branch_id != branch_id);
        Ok(())
    }
}

/// In-memory task plan store.
#[derive(Default)]
pub struct InMemoryTaskPlanRepository {
    inner: Mutex<HashMap<String, TaskPlan>>,
}

impl InMemoryTaskPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskPlanRepository for InMemoryTaskPlanRepository {
    async fn find_by_id(&self, plan_id: &str) -> Result<Option<TaskPlan>> {
        let inner = self.inner.lock().map_err(|_| lock_err())?;
        Ok(inner.get(plan_id).cloned())
    }

    async fn find_by_branch(&self, branch_id: &str) -> Result<Option<TaskPlan>> {
        let inner = self.inner.lock().map_err(|_| lock_err())?;
        Ok(inner.values().find(|p| p.branch_id == branch_id).cloned())
    }

    async fn save(&self, plan: &TaskPlan) -> Result<()> {
        let mut inner = self.inner.lock().map_err(|_| lock_err())?;
        inner.insert(plan.id.clone(), plan.clone());
        Ok(())
    }

    async fn delete(&self, plan_id: &str) -> Result<()> {
        let mut inner = self.inner.lock().map_err(|_| lock_err())?;
        inner.remove(plan_id);
        Ok(())
    }
}

/// In-memory version record store.
#[derive(Default)]
pub struct InMemoryVersionRecordRepository {
    inner: Mutex<Vec<VersionRecord>>,
}

impl InMemoryVersionRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VersionRecordRepository for InMemoryVersionRecordRepository {
    async fn save(&self, record: &VersionRecord) -> Result<()> {
        let mut inner = self.inner.lock().map_err(|_| lock_err())?;
        inner.push(record.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<VersionRecord>> {
        let inner = self.inner.lock().map_err(|_| lock_err())?;
        let mut records = inner.clone();
        records.sort_by(|a, b| b.upgraded_at.cmp(&a.upgraded_at));
        Ok(records)
    }

    async fn latest(&self) -> Result<Option<VersionRecord>> {
        Ok(self.list_all().await?.into_iter().next())
    }
}

/// In-memory single-profile store.
#[derive(Default)]
pub struct InMemoryUserRepository {
    inner: Mutex<Option<UserProfile>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn load(&self) -> Result<Option<UserProfile>> {
        let inner = self.inner.lock().map_err(|_| lock_err())?;
        Ok(inner.clone())
    }

    async fn save(&self, profile: &UserProfile) -> Result<()> {
        let mut inner = self.inner.lock().map_err(|_| lock_err())?;
        *inner = Some(profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_branch_store_round_trip() {
        let repo = InMemoryBranchRepository::new();
        let branch = Branch::new("goal", "", None);
        repo.save(&branch).await.unwrap();

        assert_eq!(
            repo.find_by_id(&branch.id).await.unwrap().unwrap().name,
            "goal"
        );
        repo.delete(&branch.id).await.unwrap();
        assert!(repo.find_by_id(&branch.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commit_store_cascade_delete() {
        let repo = InMemoryCommitRepository::new();
        use lifegit_core::commit::CommitType;
        for i in 0..3 {
            repo.save(&Commit::new(
                format!("c{i}"),
                CommitType::Learning,
                "branch-1",
                None,
            ))
            .await
            .unwrap();
        }
        repo.delete_by_branch("branch-1").await.unwrap();
        assert_eq!(repo.count_by_branch("branch-1").await.unwrap(), 0);
    }
}
