//! TOML-file-based VersionRecordRepository implementation.

use crate::paths::{LifeGitPaths, PathError};
use crate::storage::EntityDirStorage;
use async_trait::async_trait;
use lifegit_core::error::{LifeGitError, Result};
use lifegit_core::version::{VersionRecord, VersionRecordRepository};
use std::path::Path;

/// Version record repository storing one TOML file per record under
/// `<base>/versions/`.
pub struct TomlVersionRecordRepository {
    storage: EntityDirStorage,
}

impl TomlVersionRecordRepository {
    /// Creates a repository at the default location.
    pub fn new() -> std::result::Result<Self, PathError> {
        Ok(Self::with_base(LifeGitPaths::resolve()?.base()))
    }

    /// Creates a repository with a custom base directory (for testing).
    pub fn with_base(base: &Path) -> Self {
        Self {
            storage: EntityDirStorage::new(base, "versions"),
        }
    }
}

#[async_trait]
impl VersionRecordRepository for TomlVersionRecordRepository {
    async fn save(&self, record: &VersionRecord) -> Result<()> {
        self.storage
            .save(&record.id, record)
            .map_err(|e| LifeGitError::data_access(format!("Failed to save version record: {}", e)))
    }

    async fn list_all(&self) -> Result<Vec<VersionRecord>> {
        let mut records: Vec<VersionRecord> = self.storage.load_all().map_err(|e| {
            LifeGitError::data_access(format!("Failed to load version records: {}", e))
        })?;
        records.sort_by(|a, b| b.upgraded_at.cmp(&a.upgraded_at));
        Ok(records)
    }

    async fn latest(&self) -> Result<Option<VersionRecord>> {
        Ok(self.list_all().await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn repository() -> (TomlVersionRecordRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlVersionRecordRepository::with_base(temp_dir.path());
        (repo, temp_dir)
    }

    #[tokio::test]
    async fn test_latest_returns_most_recent() {
        let (repo, _temp_dir) = repository();
        let mut first = VersionRecord::new("v1.1", "goal a", "steady effort", false, 1, 5);
        first.upgraded_at = Utc::now() - Duration::days(30);
        let second = VersionRecord::new("v2.0", "goal b", "milestone", true, 2, 20);
        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();

        let latest = repo.latest().await.unwrap().unwrap();
        assert_eq!(latest.version, "v2.0");
        assert!(latest.is_important_milestone);

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].version, "v2.0");
        assert_eq!(all[1].version, "v1.1");
    }

    #[tokio::test]
    async fn test_record_snapshots_round_trip() {
        let (repo, _temp_dir) = repository();
        let record = VersionRecord::new("v1.1", "学英语", "sustained effort", false, 3, 42);
        repo.save(&record).await.unwrap();

        let loaded = repo.latest().await.unwrap().unwrap();
        assert_eq!(loaded.achievement_count, 3);
        assert_eq!(loaded.total_commits_at_upgrade, 42);
        assert_eq!(loaded.trigger_branch_name, "学英语");
    }
}
