//! Unified path management for LifeGit data files.
//!
//! All persistent data lives under a single base directory, one
//! collection subdirectory per entity type:
//!
//! ```text
//! ~/.config/lifegit/           # default base (platform config dir)
//! ├── branches/
//! ├── commits/
//! ├── plans/
//! ├── versions/
//! └── user/
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Base-directory resolution for LifeGit storage.
#[derive(Debug, Clone)]
pub struct LifeGitPaths {
    base: PathBuf,
}

impl LifeGitPaths {
    /// Resolves the default base directory (`~/.config/lifegit/` on Linux).
    pub fn resolve() -> Result<Self, PathError> {
        let base = dirs::config_dir()
            .map(|dir| dir.join("lifegit"))
            .ok_or(PathError::ConfigDirNotFound)?;
        Ok(Self { base })
    }

    /// Uses a custom base directory (for testing).
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The base directory all collections live under.
    pub fn base(&self) -> &PathBuf {
        &self.base
    }
}
