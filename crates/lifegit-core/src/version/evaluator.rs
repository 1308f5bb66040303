//! Version upgrade scoring.
//!
//! A pure, additive heuristic over a completed branch's metrics that
//! decides whether merging the goal should bump the user's life version
//! number. The evaluator only proposes; acceptance is a separate explicit
//! step owned by the version service.

use serde::{Deserialize, Serialize};

use super::model::next_version;

/// Minimum score for a proposed upgrade.
const UPGRADE_THRESHOLD: u32 = 5;
/// Minimum score for a major (milestone) upgrade.
const MILESTONE_THRESHOLD: u32 = 7;

/// Life-area keywords worth extra weight, in English and Chinese.
const LIFE_AREA_KEYWORDS: &[&str] = &[
    "career",
    "职业",
    "工作",
    "education",
    "学习",
    "教育",
    "health",
    "健康",
    "relationship",
    "关系",
    "感情",
    "finance",
    "理财",
    "财务",
    "growth",
    "成长",
];

/// Metrics of a completed branch, assembled by the version service.
#[derive(Debug, Clone)]
pub struct UpgradeSignals {
    /// Number of commits recorded on the branch
    pub commit_count: usize,
    /// Days between branch creation and evaluation
    pub duration_days: i64,
    /// Fraction of plan tasks with a recorded completion, in `[0, 1]`
    pub task_completion_rate: f64,
    /// Branch name and description, matched against the life-area keywords
    pub text: String,
}

/// The evaluator's proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeEvaluation {
    /// Whether the score clears the upgrade threshold
    pub should_upgrade: bool,
    /// The version the upgrade would reach, e.g. "v1.4"
    pub suggested_version: String,
    /// Whether the score clears the milestone threshold (major bump)
    pub is_important_milestone: bool,
    /// Human-readable justification, one entry per matched signal
    pub reasons: Vec<String>,
    /// The raw additive score
    pub score: u32,
}

/// Scores a completed branch and proposes a version bump.
///
/// Scoring is additive over independent signals: commit volume, branch
/// duration, task completion rate, and a life-area keyword match on the
/// branch text. `current_version` is the user's version at evaluation
/// time ("vMAJOR.MINOR").
pub fn evaluate(signals: &UpgradeSignals, current_version: &str) -> UpgradeEvaluation {
    let mut score = 0;
    let mut reasons = Vec::new();

    if signals.commit_count >= 10 {
        score += 3;
        reasons.push(format!("sustained effort: {} commits", signals.commit_count));
    } else if signals.commit_count >= 5 {
        score += 1;
        reasons.push(format!("steady effort: {} commits", signals.commit_count));
    }

    if signals.duration_days >= 7 {
        score += 2;
        reasons.push(format!("long-running goal: {} days", signals.duration_days));
    }

    if signals.task_completion_rate >= 0.8 {
        score += 3;
        reasons.push(format!(
            "high task completion: {:.0}%",
            signals.task_completion_rate * 100.0
        ));
    } else if signals.task_completion_rate >= 0.5 {
        score += 1;
        reasons.push(format!(
            "solid task completion: {:.0}%",
            signals.task_completion_rate * 100.0
        ));
    }

    if matches_life_area(&signals.text) {
        score += 2;
        reasons.push("touches an important life area".to_string());
    }

    let should_upgrade = score >= UPGRADE_THRESHOLD;
    let is_important_milestone = score >= MILESTONE_THRESHOLD;

    UpgradeEvaluation {
        should_upgrade,
        suggested_version: next_version(current_version, is_important_milestone),
        is_important_milestone,
        reasons,
        score,
    }
}

fn matches_life_area(text: &str) -> bool {
    let lower = text.to_lowercase();
    LIFE_AREA_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
}
