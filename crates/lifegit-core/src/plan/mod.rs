//! Task plan domain module.
//!
//! Contains the plan/task models, the time-scope taxonomy, and the
//! repository trait for plan persistence.

mod model;
mod repository;

pub use model::{TaskItem, TaskPlan, TimeScope};
pub use repository::TaskPlanRepository;
