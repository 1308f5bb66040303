//! Version record domain model.
//!
//! A version record is an immutable audit entry marking a life-timeline
//! "version" upgrade triggered by a merged goal. Version strings follow
//! the `vMAJOR.MINOR` shape (e.g. "v1.3") and are monotonically
//! non-decreasing per user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fallback base when a stored version string cannot be parsed.
pub const BASE_VERSION: (u32, u32) = (1, 0);

/// An immutable life-version upgrade entry.
///
/// Never edited after creation; the achievement and commit counts are
/// snapshots of the moment the upgrade was accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Unique record identifier (UUID format)
    pub id: String,
    /// The version reached, e.g. "v2.0"
    pub version: String,
    /// When the upgrade was accepted
    pub upgraded_at: DateTime<Utc>,
    /// Name of the merged goal branch that triggered the upgrade
    pub trigger_branch_name: String,
    /// Human-readable justification assembled from the matched signals
    pub reason: String,
    /// Whether the upgrade was a major (milestone) bump
    pub is_important_milestone: bool,
    /// Completed-goal count at upgrade time
    pub achievement_count: usize,
    /// Total commit count across all branches at upgrade time
    pub total_commits_at_upgrade: usize,
}

impl VersionRecord {
    /// Creates a record stamped with the current time.
    pub fn new(
        version: impl Into<String>,
        trigger_branch_name: impl Into<String>,
        reason: impl Into<String>,
        is_important_milestone: bool,
        achievement_count: usize,
        total_commits_at_upgrade: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            version: version.into(),
            upgraded_at: Utc::now(),
            trigger_branch_name: trigger_branch_name.into(),
            reason: reason.into(),
            is_important_milestone,
            achievement_count,
            total_commits_at_upgrade,
        }
    }
}

/// Parses a `vMAJOR.MINOR` string into its numeric parts.
pub fn parse_version(version: &str) -> Option<(u32, u32)> {
    let rest = version.strip_prefix('v')?;
    let (major, minor) = rest.split_once('.')?;
    Some((major.parse().ok()?, minor.parse().ok()?))
}

/// Computes the next version string.
///
/// An important milestone increments MAJOR and resets MINOR to 0; a
/// regular upgrade increments MINOR only. An unparseable current version
/// is treated as the `v1.0` base.
pub fn next_version(current: &str, important: bool) -> String {
    let (major, minor) = parse_version(current).unwrap_or(BASE_VERSION);
    if important {
        format!("v{}.0", major + 1)
    } else {
        format!("v{}.{}", major, minor + 1)
    }
}
