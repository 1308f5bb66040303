//! Version record repository trait.

use super::model::VersionRecord;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for the immutable version-upgrade audit trail.
///
/// Records are append-only; there is deliberately no update operation.
#[async_trait]
pub trait VersionRecordRepository: Send + Sync {
    /// Appends a new record.
    async fn save(&self, record: &VersionRecord) -> Result<()>;

    /// Lists all records, newest first.
    async fn list_all(&self) -> Result<Vec<VersionRecord>>;

    /// Returns the most recent record, if any.
    async fn latest(&self) -> Result<Option<VersionRecord>>;
}
