//! Version upgrade service.
//!
//! Assembles a completed branch's metrics into scoring signals, delegates
//! to the pure evaluator, and implements the explicit acceptance step
//! that mints the immutable audit record and advances the user's current
//! version.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use lifegit_core::branch::{Branch, BranchRepository, BranchStatus};
use lifegit_core::commit::{CommitRepository, CommitType};
use lifegit_core::error::{LifeGitError, Result};
use lifegit_core::plan::TaskPlanRepository;
use lifegit_core::user::{UserProfile, UserRepository};
use lifegit_core::version::{
    BASE_VERSION, UpgradeEvaluation, UpgradeSignals, VersionRecord, VersionRecordRepository,
    evaluate, parse_version,
};

/// Service owning the upgrade proposal and acceptance flow.
pub struct VersionService {
    branches: Arc<dyn BranchRepository>,
    plans: Arc<dyn TaskPlanRepository>,
    commits: Arc<dyn CommitRepository>,
    versions: Arc<dyn VersionRecordRepository>,
    users: Arc<dyn UserRepository>,
}

impl VersionService {
    /// Creates a new version service over the given ports.
    pub fn new(
        branches: Arc<dyn BranchRepository>,
        plans: Arc<dyn TaskPlanRepository>,
        commits: Arc<dyn CommitRepository>,
        versions: Arc<dyn VersionRecordRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            branches,
            plans,
            commits,
            versions,
            users,
        }
    }

    /// Scores a branch and proposes (or declines to propose) an upgrade.
    ///
    /// Proposal only; nothing is persisted. The separate [`accept`] step
    /// is the explicit confirmation.
    ///
    /// [`accept`]: VersionService::accept
    pub async fn propose(&self, branch: &Branch) -> Result<UpgradeEvaluation> {
        let signals = self.signals_for(branch).await?;
        let profile = self.users.load().await?.unwrap_or_default();
        let evaluation = evaluate(&signals, &profile.current_version);
        tracing::debug!(
            "upgrade proposal for '{}': score {} -> upgrade {}",
            branch.name,
            evaluation.score,
            evaluation.should_upgrade
        );
        Ok(evaluation)
    }

    /// Accepts a proposed upgrade: mints the immutable version record with
    /// achievement/commit snapshots and advances the user's version.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when the proposal would move the version
    /// backward (version numbers are monotonically non-decreasing) or was
    /// not an upgrade proposal at all.
    pub async fn accept(
        &self,
        branch: &Branch,
        evaluation: &UpgradeEvaluation,
    ) -> Result<VersionRecord> {
        if !evaluation.should_upgrade {
            return Err(LifeGitError::invalid_operation(
                "evaluation did not propose an upgrade",
            ));
        }

        let mut profile = self.users.load().await?.unwrap_or_default();
        let current = parse_version(&profile.current_version).unwrap_or(BASE_VERSION);
        let proposed = parse_version(&evaluation.suggested_version).ok_or_else(|| {
            LifeGitError::validation(format!(
                "malformed version string '{}'",
                evaluation.suggested_version
            ))
        })?;
        if proposed < current {
            return Err(LifeGitError::invalid_operation(format!(
                "version must not decrease ({} -> {})",
                profile.current_version, evaluation.suggested_version
            )));
        }

        let achievement_count = self
            .branches
            .list_all()
            .await?
            .iter()
            .filter(|b| b.status == BranchStatus::Completed)
            .count();
        let total_commits = self.commits.list_all().await?.len();

        let record = VersionRecord::new(
            &evaluation.suggested_version,
            &branch.name,
            evaluation.reasons.join("; "),
            evaluation.is_important_milestone,
            achievement_count,
            total_commits,
        );
        self.versions.save(&record).await?;

        profile.current_version = evaluation.suggested_version.clone();
        self.save_profile(profile).await?;

        tracing::info!(
            "life version upgraded to {} (trigger: '{}')",
            record.version,
            branch.name
        );
        Ok(record)
    }

    /// The full upgrade audit trail, newest first.
    pub async fn history(&self) -> Result<Vec<VersionRecord>> {
        self.versions.list_all().await
    }

    /// The user's current version string.
    pub async fn current_version(&self) -> Result<String> {
        Ok(self
            .users
            .load()
            .await?
            .unwrap_or_default()
            .current_version)
    }

    async fn save_profile(&self, profile: UserProfile) -> Result<()> {
        self.users.save(&profile).await
    }

    async fn signals_for(&self, branch: &Branch) -> Result<UpgradeSignals> {
        let commit_count = self.commits.count_by_branch(&branch.id).await?;
        let task_completion_rate = self.completion_rate(branch).await?;
        Ok(UpgradeSignals {
            commit_count,
            duration_days: branch.age_days(Utc::now()),
            task_completion_rate,
            text: format!("{} {}", branch.name, branch.description),
        })
    }

    /// Fraction of plan tasks with at least one TaskComplete commit
    /// referencing their id. An explicit record is required; the
    /// `is_completed` flag alone does not count toward scoring.
    async fn completion_rate(&self, branch: &Branch) -> Result<f64> {
        let Some(plan) = self.plans.find_by_branch(&branch.id).await? else {
            return Ok(0.0);
        };
        if plan.tasks.is_empty() {
            return Ok(0.0);
        }

        let commits = self.commits.list_by_branch(&branch.id).await?;
        let recorded: HashSet<&str> = commits
            .iter()
            .filter(|c| c.commit_type == CommitType::TaskComplete)
            .filter_map(|c| c.related_task_id.as_deref())
            .collect();
        let completed = plan
            .tasks
            .iter()
            .filter(|task| recorded.contains(task.id.as_str()))
            .count();
        Ok(completed as f64 / plan.tasks.len() as f64)
    }
}
