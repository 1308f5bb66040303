//! Task plan repository trait.
//!
//! Defines the interface for task plan persistence operations.

use super::model::TaskPlan;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for managing task plan persistence.
///
/// Plans are 1:1 with non-master branches, so `find_by_branch` is the
/// primary lookup.
#[async_trait]
pub trait TaskPlanRepository: Send + Sync {
    /// Finds a plan by its ID.
    async fn find_by_id(&self, plan_id: &str) -> Result<Option<TaskPlan>>;

    /// Finds the plan owned by a branch.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(TaskPlan))`: The branch has a plan
    /// - `Ok(None)`: The branch has no plan yet
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_branch(&self, branch_id: &str) -> Result<Option<TaskPlan>>;

    /// Saves a plan (insert or update).
    async fn save(&self, plan: &TaskPlan) -> Result<()>;

    /// Deletes a plan by its ID.
    async fn delete(&self, plan_id: &str) -> Result<()>;
}
