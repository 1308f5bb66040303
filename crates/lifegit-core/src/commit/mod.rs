//! Commit domain module.
//!
//! Contains the progress-record model, the record-type taxonomy, and the
//! repository trait for commit persistence.

mod model;
mod repository;

pub use model::{Commit, CommitType};
pub use repository::CommitRepository;
