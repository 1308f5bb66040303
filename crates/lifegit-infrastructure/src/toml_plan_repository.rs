//! TOML-file-based TaskPlanRepository implementation.

use crate::paths::{LifeGitPaths, PathError};
use crate::storage::EntityDirStorage;
use async_trait::async_trait;
use lifegit_core::error::{LifeGitError, Result};
use lifegit_core::plan::{TaskPlan, TaskPlanRepository};
use std::path::Path;

/// Task plan repository storing one TOML file per plan under
/// `<base>/plans/`.
pub struct TomlTaskPlanRepository {
    storage: EntityDirStorage,
}

impl TomlTaskPlanRepository {
    /// Creates a repository at the default location.
    pub fn new() -> std::result::Result<Self, PathError> {
        Ok(Self::with_base(LifeGitPaths::resolve()?.base()))
    }

    /// Creates a repository with a custom base directory (for testing).
    pub fn with_base(base: &Path) -> Self {
        Self {
            storage: EntityDirStorage::new(base, "plans"),
        }
    }
}

#[async_trait]
impl TaskPlanRepository for TomlTaskPlanRepository {
    async fn find_by_id(&self, plan_id: &str) -> Result<Option<TaskPlan>> {
        self.storage
            .load(plan_id)
            .map_err(|e| LifeGitError::data_access(format!("Failed to load plan: {}", e)))
    }

    async fn find_by_branch(&self, branch_id: &str) -> Result<Option<TaskPlan>> {
        let plans: Vec<TaskPlan> = self
            .storage
            .load_all()
            .map_err(|e| LifeGitError::data_access(format!("Failed to load plans: {}", e)))?;
        Ok(plans.into_iter().find(|p| p.branch_id == branch_id))
    }

    async fn save(&self, plan: &TaskPlan) -> Result<()> {
        self.storage
            .save(&plan.id, plan)
            .map_err(|e| LifeGitError::data_access(format!("Failed to save plan: {}", e)))
    }

    async fn delete(&self, plan_id: &str) -> Result<()> {
        self.storage
            .delete(plan_id)
            .map_err(|e| LifeGitError::data_access(format!("Failed to delete plan: {}", e)))
    }
}
