//! Commit recorder.
//!
//! Append-only progress log per branch. Commits are the source of truth
//! for the metrics consumed by the version evaluator and the statistics
//! layer; the only mutations are the explicit user actions (message edit,
//! delete) surfaced here.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use lifegit_core::commit::{Commit, CommitRepository, CommitType};
use lifegit_core::error::{LifeGitError, Result};

/// Service wrapping the commit port with validation and derived reads.
pub struct CommitService {
    commits: Arc<dyn CommitRepository>,
}

impl CommitService {
    /// Creates a new recorder over the given port.
    pub fn new(commits: Arc<dyn CommitRepository>) -> Self {
        Self { commits }
    }

    /// Appends a progress record to a branch.
    ///
    /// # Errors
    ///
    /// `Validation` when the message is empty or whitespace-only.
    pub async fn record(
        &self,
        message: impl Into<String>,
        commit_type: CommitType,
        branch_id: &str,
        related_task_id: Option<String>,
    ) -> Result<Commit> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(LifeGitError::validation("commit message must not be empty"));
        }
        let commit = Commit::new(message, commit_type, branch_id, related_task_id);
        self.commits.save(&commit).await?;
        Ok(commit)
    }

    /// Rewrites a commit's message (explicit user action).
    pub async fn edit_message(&self, commit_id: &str, message: impl Into<String>) -> Result<Commit> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(LifeGitError::validation("commit message must not be empty"));
        }
        let mut commit = self
            .commits
            .find_by_id(commit_id)
            .await?
            .ok_or_else(|| LifeGitError::not_found("commit", commit_id))?;
        commit.message = message;
        self.commits.update(&commit).await?;
        Ok(commit)
    }

    /// Deletes a commit (explicit user action).
    pub async fn remove(&self, commit_id: &str) -> Result<()> {
        self.commits.delete(commit_id).await
    }

    /// Deletes every commit on a branch (cascade for branch deletion).
    pub async fn purge_branch(&self, branch_id: &str) -> Result<()> {
        self.commits.delete_by_branch(branch_id).await
    }

    /// All commits on a branch, newest first.
    pub async fn list_by_branch(&self, branch_id: &str) -> Result<Vec<Commit>> {
        self.commits.list_by_branch(branch_id).await
    }

    /// Number of commits on a branch.
    pub async fn count_for_branch(&self, branch_id: &str) -> Result<usize> {
        self.commits.count_by_branch(branch_id).await
    }

    /// Commits of one record kind on a branch, newest first.
    pub async fn list_by_type(
        &self,
        branch_id: &str,
        commit_type: &CommitType,
    ) -> Result<Vec<Commit>> {
        Ok(self
            .commits
            .list_by_branch(branch_id)
            .await?
            .into_iter()
            .filter(|c| &c.commit_type == commit_type)
            .collect())
    }

    /// Commits whose message contains the given text.
    pub async fn search(&self, text: &str) -> Result<Vec<Commit>> {
        self.commits.search_by_content(text).await
    }

    /// Commits in the half-open timestamp range `[from, to)`.
    pub async fn in_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Commit>> {
        self.commits.find_by_date_range(from, to).await
    }

    /// Consecutive calendar days with at least one commit, walking
    /// backward from `today`.
    ///
    /// A day with no commit yet *today* does not break a streak that ran
    /// through yesterday; the streak then counts from yesterday.
    pub async fn current_streak(&self, today: NaiveDate) -> Result<u32> {
        let commits = self.commits.list_all().await?;
        let days: HashSet<NaiveDate> = commits
            .iter()
            .map(|commit| commit.timestamp.date_naive())
            .collect();

        let mut cursor = if days.contains(&today) {
            today
        } else {
            match today.pred_opt() {
                Some(yesterday) if days.contains(&yesterday) => yesterday,
                _ => return Ok(0),
            }
        };

        let mut streak = 0;
        while days.contains(&cursor) {
            streak += 1;
            match cursor.pred_opt() {
                Some(previous) => cursor = previous,
                None => break,
            }
        }
        Ok(streak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use lifegit_infrastructure::memory::InMemoryCommitRepository;

    fn service() -> (CommitService, Arc<InMemoryCommitRepository>) {
        let repo = Arc::new(InMemoryCommitRepository::new());
        (CommitService::new(repo.clone()), repo)
    }

    async fn seed_commit_at(repo: &InMemoryCommitRepository, branch_id: &str, at: DateTime<Utc>) {
        let mut commit = Commit::new("progress", CommitType::Learning, branch_id, None);
        commit.timestamp = at;
        repo.save(&commit).await.unwrap();
    }

    #[tokio::test]
    async fn test_record_rejects_empty_message() {
        let (service, _) = service();
        let err = service
            .record("   ", CommitType::Learning, "branch-1", None)
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_record_and_count() {
        let (service, _) = service();
        service
            .record("Studied for 30 minutes", CommitType::Learning, "branch-1", None)
            .await
            .unwrap();
        service
            .record("Finished chapter", CommitType::TaskComplete, "branch-1", None)
            .await
            .unwrap();
        service
            .record("Other branch", CommitType::Learning, "branch-2", None)
            .await
            .unwrap();

        assert_eq!(service.count_for_branch("branch-1").await.unwrap(), 2);
        assert_eq!(service.count_for_branch("branch-2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_by_type_filters_kind() {
        let (service, _) = service();
        service
            .record("note", CommitType::Learning, "branch-1", None)
            .await
            .unwrap();
        service
            .record("done", CommitType::TaskComplete, "branch-1", None)
            .await
            .unwrap();

        let learned = service
            .list_by_type("branch-1", &CommitType::Learning)
            .await
            .unwrap();
        assert_eq!(learned.len(), 1);
        assert_eq!(learned[0].message, "note");
    }

    #[tokio::test]
    async fn test_edit_message_validates_and_updates() {
        let (service, _) = service();
        let commit = service
            .record("draft", CommitType::Reflection, "branch-1", None)
            .await
            .unwrap();

        assert!(service.edit_message(&commit.id, "").await.is_err());

        let edited = service.edit_message(&commit.id, "final text").await.unwrap();
        assert_eq!(edited.message, "final text");

        let listed = service.list_by_branch("branch-1").await.unwrap();
        assert_eq!(listed[0].message, "final text");
    }

    #[tokio::test]
    async fn test_streak_counts_consecutive_days() {
        let (service, repo) = service();
        let today = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();

        // Commits today, yesterday, two days ago; none three days ago;
        // one far in the past that must not extend the streak.
        for days_back in [0, 1, 2] {
            seed_commit_at(&repo, "branch-1", today - Duration::days(days_back)).await;
        }
        seed_commit_at(&repo, "branch-1", today - Duration::days(30)).await;

        assert_eq!(service.current_streak(today.date_naive()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_streak_survives_quiet_morning() {
        let (service, repo) = service();
        let today = Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap();

        // No commit yet today, but yesterday and the day before have some.
        seed_commit_at(&repo, "branch-1", today - Duration::days(1)).await;
        seed_commit_at(&repo, "branch-1", today - Duration::days(2)).await;

        assert_eq!(service.current_streak(today.date_naive()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_streak_zero_after_gap() {
        let (service, repo) = service();
        let today = Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap();

        seed_commit_at(&repo, "branch-1", today - Duration::days(2)).await;

        assert_eq!(service.current_streak(today.date_naive()).await.unwrap(), 0);
    }
}
