//! User profile repository trait.

use super::model::UserProfile;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for the single user profile record.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Loads the profile.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(UserProfile))`: A profile has been stored
    /// - `Ok(None)`: No profile exists yet
    /// - `Err(_)`: Error occurred during retrieval
    async fn load(&self) -> Result<Option<UserProfile>>;

    /// Saves the profile (insert or update).
    async fn save(&self, profile: &UserProfile) -> Result<()>;
}
