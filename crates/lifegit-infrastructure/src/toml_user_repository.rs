//! TOML-file-based UserRepository implementation.

use crate::paths::{LifeGitPaths, PathError};
use crate::storage::EntityDirStorage;
use async_trait::async_trait;
use lifegit_core::error::{LifeGitError, Result};
use lifegit_core::user::{UserProfile, UserRepository};
use std::path::Path;

/// Fixed entity id; the store holds a single profile.
const PROFILE_ID: &str = "profile";

/// User profile repository storing a single TOML file under
/// `<base>/user/`.
pub struct TomlUserRepository {
    storage: EntityDirStorage,
}

impl TomlUserRepository {
    /// Creates a repository at the default location.
    pub fn new() -> std::result::Result<Self, PathError> {
        Ok(Self::with_base(LifeGitPaths::resolve()?.base()))
    }

    /// Creates a repository with a custom base directory (for testing).
    pub fn with_base(base: &Path) -> Self {
        Self {
            storage: EntityDirStorage::new(base, "user"),
        }
    }
}

#[async_trait]
impl UserRepository for TomlUserRepository {
    async fn load(&self) -> Result<Option<UserProfile>> {
        self.storage
            .load(PROFILE_ID)
            .map_err(|e| LifeGitError::data_access(format!("Failed to load user profile: {}", e)))
    }

    async fn save(&self, profile: &UserProfile) -> Result<()> {
        self.storage
            .save(PROFILE_ID, profile)
            .map_err(|e| LifeGitError::data_access(format!("Failed to save user profile: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_before_save_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlUserRepository::with_base(temp_dir.path());
        assert!(repo.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_reload_profile() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlUserRepository::with_base(temp_dir.path());

        let mut profile = UserProfile::default();
        profile.current_version = "v1.3".to_string();
        repo.save(&profile).await.unwrap();

        let loaded = repo.load().await.unwrap().unwrap();
        assert_eq!(loaded.current_version, "v1.3");
    }
}
