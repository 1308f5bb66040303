//! Branch lifecycle engine.
//!
//! The state machine over goal branches: creation (with synchronous plan
//! generation), completion, merge onto master, abandonment, plan
//! regeneration, and cascade deletion. Completion and merge are
//! deliberately separate operations so a caller can confirm a completion
//! summary before the irreversible master-timeline write, and so the
//! version evaluation side effect fires exactly once, at merge time.
//!
//! Operations against one branch must be serialized by the caller
//! (single-writer contract); the engine carries no per-branch mutex.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use lifegit_core::branch::{Branch, BranchRepository, BranchStatus};
use lifegit_core::commit::{Commit, CommitType};
use lifegit_core::error::{LifeGitError, Result};
use lifegit_core::plan::{TaskPlan, TaskPlanRepository};
use lifegit_core::version::UpgradeEvaluation;

use crate::commit_service::CommitService;
use crate::decomposition::TaskDecompositionPipeline;
use crate::version_service::VersionService;

/// Result of merging a completed branch onto master.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The milestone commit appended to master.
    pub merge_commit: Commit,
    /// The version-upgrade proposal for the merged branch.
    pub evaluation: UpgradeEvaluation,
}

/// The branch lifecycle engine.
pub struct BranchService {
    branches: Arc<dyn BranchRepository>,
    plans: Arc<dyn TaskPlanRepository>,
    recorder: Arc<CommitService>,
    pipeline: Arc<TaskDecompositionPipeline>,
    versions: Arc<VersionService>,
    creating: AtomicBool,
    generating: AtomicBool,
    merging: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl BranchService {
    /// Creates a new engine over the given ports and collaborators.
    pub fn new(
        branches: Arc<dyn BranchRepository>,
        plans: Arc<dyn TaskPlanRepository>,
        recorder: Arc<CommitService>,
        pipeline: Arc<TaskDecompositionPipeline>,
        versions: Arc<VersionService>,
    ) -> Self {
        Self {
            branches,
            plans,
            recorder,
            pipeline,
            versions,
            creating: AtomicBool::new(false),
            generating: AtomicBool::new(false),
            merging: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    // ============================================================================
    // Observation points (progress indication only, no decision logic)
    // ============================================================================

    /// Whether a branch creation is in flight.
    pub fn is_creating(&self) -> bool {
        self.creating.load(Ordering::SeqCst)
    }

    /// Whether a plan generation is in flight.
    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::SeqCst)
    }

    /// Whether a merge is in flight.
    pub fn is_merging(&self) -> bool {
        self.merging.load(Ordering::SeqCst)
    }

    /// The display string of the most recent failure, cleared at the
    /// start of each operation.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().map(|slot| slot.clone()).unwrap_or(None)
    }

    // ============================================================================
    // Lifecycle operations
    // ============================================================================

    /// Returns the master branch, creating and persisting it if missing.
    ///
    /// This is the repair action for `MasterBranchNotFound`.
    pub async fn ensure_master(&self, name: &str) -> Result<Branch> {
        if let Some(master) = self.branches.find_master().await? {
            return Ok(master);
        }
        let master = Branch::master(name);
        self.branches.save(&master).await?;
        tracing::info!("created master branch '{name}'");
        Ok(master)
    }

    /// Creates an active goal branch and obtains its task plan.
    ///
    /// The branch is persisted *before* the plan so a late persistence
    /// failure cannot leak an orphaned plan; that failure mode surfaces
    /// as `CreationFailed` and leaves the branch without a plan
    /// (recoverable via `regenerate_task_plan`).
    pub async fn create_branch(
        &self,
        name: &str,
        description: &str,
        timeframe: Option<&str>,
    ) -> Result<(Branch, TaskPlan)> {
        self.clear_error();
        let _creating = FlagGuard::set(&self.creating);
        let result = self.create_branch_inner(name, description, timeframe).await;
        self.capture(result)
    }

    async fn create_branch_inner(
        &self,
        name: &str,
        description: &str,
        timeframe: Option<&str>,
    ) -> Result<(Branch, TaskPlan)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LifeGitError::validation("branch name must not be empty"));
        }

        let parent = self.branches.find_master().await?.map(|master| master.id);
        let branch = Branch::new(name, description, parent);
        self.branches
            .save(&branch)
            .await
            .map_err(|err| LifeGitError::data_access(format!("create_branch: {err}")))?;

        let plan = {
            let _generating = FlagGuard::set(&self.generating);
            self.pipeline
                .generate(&branch.id, name, description, timeframe)
                .await
        };
        self.plans.save(&plan).await.map_err(|err| {
            LifeGitError::CreationFailed(format!(
                "branch '{}' was created but its plan could not be persisted: {err}",
                branch.name
            ))
        })?;

        tracing::info!(
            "created branch '{}' with {} tasks (ai: {})",
            branch.name,
            plan.tasks.len(),
            plan.is_ai_generated
        );
        Ok((branch, plan))
    }

    /// Completes an active branch and records the milestone on the
    /// branch itself. Master is untouched until `merge_branch`.
    pub async fn complete_branch(&self, branch_id: &str) -> Result<Branch> {
        self.clear_error();
        let result = self.complete_branch_inner(branch_id).await;
        self.capture(result)
    }

    async fn complete_branch_inner(&self, branch_id: &str) -> Result<Branch> {
        let mut branch = self.load(branch_id).await?;
        branch.complete(Utc::now())?;
        self.branches.save(&branch).await?;
        self.recorder
            .record(
                format!("Goal completed: {}", branch.name),
                CommitType::Milestone,
                &branch.id,
                None,
            )
            .await?;
        tracing::info!("branch '{}' completed", branch.name);
        Ok(branch)
    }

    /// Merges a completed branch onto master: appends the milestone
    /// commit to the master timeline and produces the version-upgrade
    /// proposal. Acceptance of the proposal is a separate step on the
    /// version service.
    pub async fn merge_branch(&self, branch_id: &str) -> Result<MergeOutcome> {
        self.clear_error();
        let _merging = FlagGuard::set(&self.merging);
        let result = self.merge_branch_inner(branch_id).await;
        self.capture(result)
    }

    async fn merge_branch_inner(&self, branch_id: &str) -> Result<MergeOutcome> {
        let branch = self.load(branch_id).await?;
        if branch.is_master {
            return Err(LifeGitError::invalid_operation(
                "the master branch cannot be merged",
            ));
        }
        if branch.status != BranchStatus::Completed {
            return Err(LifeGitError::invalid_state(
                "merge_branch",
                branch.status.to_string(),
            ));
        }

        let master = self
            .branches
            .find_master()
            .await?
            .ok_or(LifeGitError::MasterBranchNotFound)?;
        let merge_commit = self
            .recorder
            .record(
                format!("Merged goal: {}", branch.name),
                CommitType::Milestone,
                &master.id,
                None,
            )
            .await?;
        let evaluation = self.versions.propose(&branch).await?;

        tracing::info!(
            "merged '{}' onto master (upgrade proposed: {})",
            branch.name,
            evaluation.should_upgrade
        );
        Ok(MergeOutcome {
            merge_commit,
            evaluation,
        })
    }

    /// Abandons an active branch, optionally recording a reflection.
    pub async fn abandon_branch(
        &self,
        branch_id: &str,
        reflection: Option<&str>,
    ) -> Result<Branch> {
        self.clear_error();
        let result = self.abandon_branch_inner(branch_id, reflection).await;
        self.capture(result)
    }

    async fn abandon_branch_inner(
        &self,
        branch_id: &str,
        reflection: Option<&str>,
    ) -> Result<Branch> {
        let mut branch = self.load(branch_id).await?;
        branch.abandon()?;
        self.branches.save(&branch).await?;
        if let Some(text) = reflection {
            if !text.trim().is_empty() {
                self.recorder
                    .record(text, CommitType::Reflection, &branch.id, None)
                    .await?;
            }
        }
        tracing::info!("branch '{}' abandoned", branch.name);
        Ok(branch)
    }

    /// Discards the branch's plan (including completion history) and
    /// requests a fresh one from the pipeline.
    pub async fn regenerate_task_plan(&self, branch_id: &str) -> Result<TaskPlan> {
        self.clear_error();
        let result = self.regenerate_task_plan_inner(branch_id).await;
        self.capture(result)
    }

    async fn regenerate_task_plan_inner(&self, branch_id: &str) -> Result<TaskPlan> {
        let mut branch = self.load(branch_id).await?;
        let old_plan = self
            .plans
            .find_by_branch(branch_id)
            .await?
            .ok_or_else(|| LifeGitError::NoTaskPlan {
                branch_id: branch_id.to_string(),
            })?;
        self.plans.delete(&old_plan.id).await?;

        let plan = {
            let _generating = FlagGuard::set(&self.generating);
            self.pipeline
                .generate(branch_id, &branch.name, &branch.description, None)
                .await
        };
        self.plans.save(&plan).await?;

        branch.set_progress_from_counts(plan.completed_count(), plan.tasks.len());
        self.branches.save(&branch).await?;
        Ok(plan)
    }

    /// Deletes a non-master branch with its commits and plan.
    pub async fn delete_branch(&self, branch_id: &str) -> Result<()> {
        self.clear_error();
        let result = self.delete_branch_inner(branch_id).await;
        self.capture(result)
    }

    async fn delete_branch_inner(&self, branch_id: &str) -> Result<()> {
        let branch = self.load(branch_id).await?;
        if branch.is_master {
            return Err(LifeGitError::invalid_operation(
                "the master branch cannot be deleted",
            ));
        }
        if let Some(plan) = self.plans.find_by_branch(branch_id).await? {
            self.plans.delete(&plan.id).await?;
        }
        self.recorder.purge_branch(branch_id).await?;
        self.branches.delete(branch_id).await?;
        tracing::info!("branch '{}' deleted", branch.name);
        Ok(())
    }

    // ============================================================================
    // Read model
    // ============================================================================

    /// Loads a branch by id.
    pub async fn branch(&self, branch_id: &str) -> Result<Branch> {
        self.load(branch_id).await
    }

    /// Active, non-master branches.
    pub async fn list_active(&self) -> Result<Vec<Branch>> {
        self.branches.list_active().await
    }

    /// The branch's task plan, if it has one.
    pub async fn plan_for(&self, branch_id: &str) -> Result<Option<TaskPlan>> {
        self.plans.find_by_branch(branch_id).await
    }

    // ============================================================================
    // Internals
    // ============================================================================

    async fn load(&self, branch_id: &str) -> Result<Branch> {
        self.branches
            .find_by_id(branch_id)
            .await?
            .ok_or_else(|| LifeGitError::not_found("branch", branch_id))
    }

    fn clear_error(&self) {
        if let Ok(mut slot) = self.last_error.lock() {
            *slot = None;
        }
    }

    fn capture<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            tracing::warn!("branch operation failed: {err}");
            if let Ok(mut slot) = self.last_error.lock() {
                *slot = Some(err.to_string());
            }
        }
        result
    }
}

/// Sets an observation flag for a scope; clears it on drop, panics
/// included.
struct FlagGuard<'a>(&'a AtomicBool);

impl<'a> FlagGuard<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
