//! Branch repository trait.
//!
//! Defines the interface for branch persistence operations.

use super::model::Branch;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for managing branch persistence.
///
/// This trait defines the contract for persisting and retrieving goal
/// branches, decoupling the lifecycle engine from the specific storage
/// mechanism (e.g., TOML files, database, remote API).
#[async_trait]
pub trait BranchRepository: Send + Sync {
    /// Finds a branch by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Branch))`: Branch found
    /// - `Ok(None)`: Branch not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, branch_id: &str) -> Result<Option<Branch>>;

    /// Finds the single master branch, if one exists.
    async fn find_master(&self) -> Result<Option<Branch>>;

    /// Saves a branch (insert or update).
    async fn save(&self, branch: &Branch) -> Result<()>;

    /// Deletes a branch by its ID.
    ///
    /// Deleting a branch that does not exist is not an error.
    async fn delete(&self, branch_id: &str) -> Result<()>;

    /// Lists all stored branches.
    async fn list_all(&self) -> Result<Vec<Branch>>;

    /// Lists branches that are currently `Active` and not master.
    async fn list_active(&self) -> Result<Vec<Branch>>;
}
