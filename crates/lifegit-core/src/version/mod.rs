//! Version domain module.
//!
//! Contains the immutable version-record model, `vMAJOR.MINOR` string
//! helpers, the pure upgrade-scoring evaluator, and the repository trait
//! for the audit trail.

mod evaluator;
mod model;
mod repository;

pub use evaluator::{UpgradeEvaluation, UpgradeSignals, evaluate};
pub use model::{BASE_VERSION, VersionRecord, next_version, parse_version};
pub use repository::VersionRecordRepository;
