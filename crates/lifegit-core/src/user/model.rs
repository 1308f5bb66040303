//! User profile domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single per-store user profile.
///
/// Carries the current life version the upgrade evaluator parses and the
/// acceptance step advances. Version strings follow `vMAJOR.MINOR`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display nickname
    pub nickname: String,
    /// Current life version, e.g. "v1.3"
    pub current_version: String,
    /// When the profile was first created
    pub created_at: DateTime<Utc>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            nickname: "You".to_string(),
            current_version: "v1.0".to_string(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::parse_version;

    #[test]
    fn test_default_version_parses() {
        let profile = UserProfile::default();
        assert_eq!(parse_version(&profile.current_version), Some((1, 0)));
    }
}
