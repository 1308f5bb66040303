//! Commit domain model.
//!
//! A commit is an immutable, timestamped progress record attached to a
//! branch. Commits are the only write path that drives progress metrics
//! and version scoring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Taxonomy of progress records.
///
/// The named variants cover the built-in record kinds; `Other` keeps the
/// set open for records an embedding application wants to introduce
/// without touching the core. Every decision point (progress derivation,
/// scoring, prompt formatting) matches exhaustively on this type.
///
/// Serialized as its tag string so stored commits read as
/// `commit_type = "milestone"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum CommitType {
    /// A plan task was finished.
    TaskComplete,
    /// Something was learned along the way.
    Learning,
    /// A free-form reflection.
    Reflection,
    /// A notable event: goal completion, merge onto master.
    Milestone,
    /// Application-defined record kind.
    Other(String),
}

impl std::fmt::Display for CommitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitType::TaskComplete => write!(f, "task_complete"),
            CommitType::Learning => write!(f, "learning"),
            CommitType::Reflection => write!(f, "reflection"),
            CommitType::Milestone => write!(f, "milestone"),
            CommitType::Other(kind) => write!(f, "{kind}"),
        }
    }
}

impl std::str::FromStr for CommitType {
    type Err = std::convert::Infallible;

    /// Parses a commit type tag. Unknown tags land in `Other` rather than
    /// failing, keeping the taxonomy open.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "task_complete" => CommitType::TaskComplete,
            "learning" => CommitType::Learning,
            "reflection" => CommitType::Reflection,
            "milestone" => CommitType::Milestone,
            other => CommitType::Other(other.to_string()),
        })
    }
}

impl From<CommitType> for String {
    fn from(commit_type: CommitType) -> Self {
        commit_type.to_string()
    }
}

impl From<String> for CommitType {
    fn from(tag: String) -> Self {
        // FromStr is infallible; unknown tags already land in `Other`.
        tag.parse().unwrap_or(CommitType::Other(tag))
    }
}

/// An immutable progress record on a branch.
///
/// Once created, a commit only changes through the explicit user actions
/// exposed by the commit recorder (message edit, delete).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// Unique commit identifier (UUID format)
    pub id: String,
    /// Non-empty progress message
    pub message: String,
    /// Record kind
    pub commit_type: CommitType,
    /// Creation timestamp
    pub timestamp: DateTime<Utc>,
    /// Branch this record belongs to
    pub branch_id: String,
    /// Task this record refers to, for `TaskComplete` records
    pub related_task_id: Option<String>,
}

impl Commit {
    /// Creates a new commit stamped with the current time.
    pub fn new(
        message: impl Into<String>,
        commit_type: CommitType,
        branch_id: impl Into<String>,
        related_task_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
            commit_type,
            timestamp: Utc::now(),
            branch_id: branch_id.into(),
            related_task_id,
        }
    }
}
