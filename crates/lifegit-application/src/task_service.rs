//! Task-level plan maintenance.
//!
//! Completion toggles, manual task edits, and reordering all flow through
//! this service so that branch progress is recomputed from the full task
//! collection on every mutation and task completions leave an explicit
//! TaskComplete record in the commit log.

use std::sync::Arc;

use chrono::Utc;
use lifegit_core::branch::BranchRepository;
use lifegit_core::commit::CommitType;
use lifegit_core::error::{LifeGitError, Result};
use lifegit_core::plan::{TaskItem, TaskPlan, TaskPlanRepository, TimeScope};

use crate::commit_service::CommitService;

/// A manually-entered task draft.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub estimated_minutes: u32,
    pub time_scope: TimeScope,
}

/// Service for mutating a branch's task plan.
///
/// Operations against one branch must be serialized by the caller
/// (single-writer contract); progress is recomputed from the whole task
/// list on each mutation rather than through fine-grained locking.
pub struct TaskService {
    branches: Arc<dyn BranchRepository>,
    plans: Arc<dyn TaskPlanRepository>,
    recorder: Arc<CommitService>,
}

impl TaskService {
    /// Creates a new task service over the given ports.
    pub fn new(
        branches: Arc<dyn BranchRepository>,
        plans: Arc<dyn TaskPlanRepository>,
        recorder: Arc<CommitService>,
    ) -> Self {
        Self {
            branches,
            plans,
            recorder,
        }
    }

    /// Marks a task complete, records a TaskComplete commit referencing
    /// it, and recomputes branch progress.
    ///
    /// Completing an already-completed task is a no-op (no duplicate
    /// commit).
    pub async fn complete_task(&self, branch_id: &str, task_id: &str) -> Result<TaskPlan> {
        let mut plan = self.plan_for(branch_id).await?;
        let task = plan
            .task(task_id)
            .ok_or_else(|| LifeGitError::not_found("task", task_id))?;
        if task.is_completed {
            return Ok(plan);
        }
        let title = task.title.clone();

        plan.set_completed(task_id, true, Utc::now());
        self.plans.save(&plan).await?;
        self.recorder
            .record(
                format!("Completed task: {title}"),
                CommitType::TaskComplete,
                branch_id,
                Some(task_id.to_string()),
            )
            .await?;
        self.sync_progress(branch_id, &plan).await?;
        Ok(plan)
    }

    /// Clears a task's completion flag and recomputes branch progress.
    ///
    /// The TaskComplete commit, if any, stays in the log; removing it is
    /// an explicit user action on the recorder.
    pub async fn reopen_task(&self, branch_id: &str, task_id: &str) -> Result<TaskPlan> {
        let mut plan = self.plan_for(branch_id).await?;
        if !plan.set_completed(task_id, false, Utc::now()) {
            return Err(LifeGitError::not_found("task", task_id));
        }
        self.plans.save(&plan).await?;
        self.sync_progress(branch_id, &plan).await?;
        Ok(plan)
    }

    /// Appends a manually-entered task to the plan.
    pub async fn add_task(&self, branch_id: &str, draft: NewTask) -> Result<TaskPlan> {
        if draft.title.trim().is_empty() {
            return Err(LifeGitError::validation("task title must not be empty"));
        }
        if draft.estimated_minutes == 0 {
            return Err(LifeGitError::validation(
                "task duration estimate must be positive",
            ));
        }
        let mut plan = self.plan_for(branch_id).await?;
        plan.push_task(TaskItem::new(
            draft.title,
            draft.description,
            draft.estimated_minutes,
            draft.time_scope,
            plan.tasks.len(),
            false,
        ));
        self.plans.save(&plan).await?;
        self.sync_progress(branch_id, &plan).await?;
        Ok(plan)
    }

    /// Removes a task from the plan and recomputes branch progress.
    pub async fn remove_task(&self, branch_id: &str, task_id: &str) -> Result<TaskPlan> {
        let mut plan = self.plan_for(branch_id).await?;
        if plan.remove_task(task_id).is_none() {
            return Err(LifeGitError::not_found("task", task_id));
        }
        self.plans.save(&plan).await?;
        self.sync_progress(branch_id, &plan).await?;
        Ok(plan)
    }

    /// Moves a task to a new position in the plan.
    pub async fn move_task(&self, branch_id: &str, task_id: &str, to: usize) -> Result<TaskPlan> {
        let mut plan = self.plan_for(branch_id).await?;
        if !plan.move_task(task_id, to) {
            return Err(LifeGitError::not_found("task", task_id));
        }
        self.plans.save(&plan).await?;
        Ok(plan)
    }

    async fn plan_for(&self, branch_id: &str) -> Result<TaskPlan> {
        self.plans
            .find_by_branch(branch_id)
            .await?
            .ok_or_else(|| LifeGitError::NoTaskPlan {
                branch_id: branch_id.to_string(),
            })
    }

    async fn sync_progress(&self, branch_id: &str, plan: &TaskPlan) -> Result<()> {
        let mut branch = self
            .branches
            .find_by_id(branch_id)
            .await?
            .ok_or_else(|| LifeGitError::not_found("branch", branch_id))?;
        branch.set_progress_from_counts(plan.completed_count(), plan.tasks.len());
        self.branches.save(&branch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifegit_core::branch::Branch;
    use lifegit_core::commit::CommitRepository;
    use lifegit_infrastructure::memory::{
        InMemoryBranchRepository, InMemoryCommitRepository, InMemoryTaskPlanRepository,
    };

    struct Fixture {
        branches: Arc<InMemoryBranchRepository>,
        commits: Arc<InMemoryCommitRepository>,
        service: TaskService,
        branch_id: String,
    }

    async fn fixture(task_count: usize) -> Fixture {
        let branches = Arc::new(InMemoryBranchRepository::new());
        let plans = Arc::new(InMemoryTaskPlanRepository::new());
        let commits = Arc::new(InMemoryCommitRepository::new());
        let recorder = Arc::new(CommitService::new(commits.clone()));
        let service = TaskService::new(branches.clone(), plans.clone(), recorder);

        let branch = Branch::new("学英语", "每天学习30分钟", None);
        branches.save(&branch).await.unwrap();
        let tasks: Vec<TaskItem> = (0..task_count)
            .map(|i| TaskItem::new(format!("task {i}"), "", 30, TimeScope::Daily, i, true))
            .collect();
        let plan = TaskPlan::new(&branch.id, "3 months", true, tasks);
        plans.save(&plan).await.unwrap();

        Fixture {
            branches,
            commits,
            service,
            branch_id: branch.id,
        }
    }

    #[tokio::test]
    async fn test_complete_task_records_commit_and_progress() {
        let fx = fixture(4).await;
        let initial = fx.service.plan_for(&fx.branch_id).await.unwrap();
        let task_id = initial.tasks[0].id.clone();

        let plan = fx.service.complete_task(&fx.branch_id, &task_id).await.unwrap();
        assert_eq!(plan.completed_count(), 1);

        let branch = fx.branches.find_by_id(&fx.branch_id).await.unwrap().unwrap();
        assert_eq!(branch.progress, 0.25);

        let commits = fx.commits.list_by_branch(&fx.branch_id).await.unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].commit_type, CommitType::TaskComplete);
        assert_eq!(commits[0].related_task_id, Some(task_id));
    }

    #[tokio::test]
    async fn test_complete_task_twice_is_idempotent() {
        let fx = fixture(2).await;
        let plan = fx.service.plan_for(&fx.branch_id).await.unwrap();
        let task_id = plan.tasks[0].id.clone();

        fx.service.complete_task(&fx.branch_id, &task_id).await.unwrap();
        fx.service.complete_task(&fx.branch_id, &task_id).await.unwrap();

        let commits = fx.commits.list_by_branch(&fx.branch_id).await.unwrap();
        assert_eq!(commits.len(), 1);
    }

    #[tokio::test]
    async fn test_reopen_task_recomputes_progress() {
        let fx = fixture(2).await;
        let plan = fx.service.plan_for(&fx.branch_id).await.unwrap();
        let task_id = plan.tasks[0].id.clone();

        fx.service.complete_task(&fx.branch_id, &task_id).await.unwrap();
        fx.service.reopen_task(&fx.branch_id, &task_id).await.unwrap();

        let branch = fx.branches.find_by_id(&fx.branch_id).await.unwrap().unwrap();
        assert_eq!(branch.progress, 0.0);
    }

    #[tokio::test]
    async fn test_add_remove_move_keep_indices_dense() {
        let fx = fixture(3).await;

        let plan = fx
            .service
            .add_task(
                &fx.branch_id,
                NewTask {
                    title: "extra".to_string(),
                    description: String::new(),
                    estimated_minutes: 15,
                    time_scope: TimeScope::Weekly,
                },
            )
            .await
            .unwrap();
        assert_eq!(plan.tasks.len(), 4);
        assert!(!plan.tasks[3].is_ai_generated);

        let removed_id = plan.tasks[1].id.clone();
        let plan = fx.service.remove_task(&fx.branch_id, &removed_id).await.unwrap();
        assert_eq!(plan.tasks.len(), 3);

        let moved_id = plan.tasks[2].id.clone();
        let plan = fx.service.move_task(&fx.branch_id, &moved_id, 0).await.unwrap();
        assert_eq!(plan.tasks[0].id, moved_id);
        for (index, task) in plan.tasks.iter().enumerate() {
            assert_eq!(task.order_index, index);
        }
    }

    #[tokio::test]
    async fn test_add_task_validates_draft() {
        let fx = fixture(1).await;
        let err = fx
            .service
            .add_task(
                &fx.branch_id,
                NewTask {
                    title: "  ".to_string(),
                    description: String::new(),
                    estimated_minutes: 15,
                    time_scope: TimeScope::Daily,
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_missing_plan_is_distinct_error() {
        let fx = fixture(1).await;
        let err = fx
            .service
            .complete_task("no-such-branch", "no-such-task")
            .await
            .unwrap_err();
        assert!(matches!(err, LifeGitError::NoTaskPlan { .. }));
    }
}
