//! Branch domain model.
//!
//! A branch is an isolated, named goal with its own task plan and progress
//! log, analogous to a version-control branch. One distinguished branch per
//! user, the master branch, represents the continuous life timeline and is
//! excluded from every lifecycle transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LifeGitError, Result};

/// Lifecycle status of a branch.
///
/// Transitions: `Active -> Completed` and `Active -> Abandoned`. Both
/// target states are terminal; the master branch never transitions at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchStatus {
    /// The goal is being worked on.
    Active,
    /// The goal was finished and can be merged onto master.
    Completed,
    /// The goal was given up.
    Abandoned,
}

impl std::fmt::Display for BranchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BranchStatus::Active => "Active",
            BranchStatus::Completed => "Completed",
            BranchStatus::Abandoned => "Abandoned",
        };
        write!(f, "{s}")
    }
}

/// A goal branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Unique branch identifier (UUID format)
    pub id: String,
    /// Short goal name (e.g. "学英语")
    pub name: String,
    /// Free-text goal description
    pub description: String,
    /// Current lifecycle status
    pub status: BranchStatus,
    /// Whether this is the single master (life-timeline) branch
    pub is_master: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Completion timestamp, set by the Completed transition
    pub completed_at: Option<DateTime<Utc>>,
    /// Fraction of plan tasks completed, in `[0, 1]`. Derived; recomputed
    /// whenever task completion changes.
    pub progress: f64,
    /// Informational link to the branch this was forked from (normally master)
    pub parent_branch_id: Option<String>,
}

impl Branch {
    /// Creates a new active goal branch.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parent_branch_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            status: BranchStatus::Active,
            is_master: false,
            created_at: Utc::now(),
            completed_at: None,
            progress: 0.0,
            parent_branch_id,
        }
    }

    /// Creates the master branch.
    ///
    /// Exactly one branch per store has `is_master = true`.
    pub fn master(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: "Life timeline".to_string(),
            status: BranchStatus::Active,
            is_master: true,
            created_at: Utc::now(),
            completed_at: None,
            progress: 0.0,
            parent_branch_id: None,
        }
    }

    /// Whether the branch is still being worked on.
    pub fn is_active(&self) -> bool {
        self.status == BranchStatus::Active
    }

    /// Days elapsed since the branch was created, as of `now`.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days()
    }

    /// Marks the branch completed.
    ///
    /// Fails with `InvalidOperation` on master and `InvalidBranchState`
    /// unless the branch is currently `Active`.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.is_master {
            return Err(LifeGitError::invalid_operation(
                "the master branch cannot be completed",
            ));
        }
        if self.status != BranchStatus::Active {
            return Err(LifeGitError::invalid_state(
                "complete_branch",
                self.status.to_string(),
            ));
        }
        self.status = BranchStatus::Completed;
        self.completed_at = Some(now);
        Ok(())
    }

    /// Marks the branch abandoned.
    ///
    /// Fails with `InvalidOperation` on master and `InvalidBranchState`
    /// unless the branch is currently `Active`.
    pub fn abandon(&mut self) -> Result<()> {
        if self.is_master {
            return Err(LifeGitError::invalid_operation(
                "the master branch cannot be abandoned",
            ));
        }
        if self.status != BranchStatus::Active {
            return Err(LifeGitError::invalid_state(
                "abandon_branch",
                self.status.to_string(),
            ));
        }
        self.status = BranchStatus::Abandoned;
        Ok(())
    }

    /// Recomputes `progress` from task counts.
    ///
    /// Zero total tasks yields a progress of zero.
    pub fn set_progress_from_counts(&mut self, completed: usize, total: usize) {
        self.progress = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64
        };
    }
}
