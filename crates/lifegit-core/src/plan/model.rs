//! Task plan domain model.
//!
//! A task plan is the structured breakdown of a goal into ordered,
//! time-scoped units of work. Plans are owned 1:1 by a non-master branch;
//! items keep a dense, unique `order_index` that defines display and
//! execution order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cadence a task is meant to be worked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeScope {
    /// Worked every day.
    Daily,
    /// Worked on a weekly rhythm.
    Weekly,
    /// Worked on a monthly rhythm.
    Monthly,
}

impl TimeScope {
    /// Parses a scope tag leniently.
    ///
    /// Unrecognized values default to `Daily` rather than failing the
    /// surrounding parse; completion backends are not reliable enough to
    /// reject a whole plan over one tag.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => TimeScope::Weekly,
            "monthly" => TimeScope::Monthly,
            _ => TimeScope::Daily,
        }
    }
}

impl std::fmt::Display for TimeScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TimeScope::Daily => "daily",
            TimeScope::Weekly => "weekly",
            TimeScope::Monthly => "monthly",
        };
        write!(f, "{s}")
    }
}

/// A single unit of work inside a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    /// Unique task identifier (UUID format)
    pub id: String,
    /// Short task title
    pub title: String,
    /// Longer task description
    pub description: String,
    /// Estimated effort in minutes, always positive
    pub estimated_minutes: u32,
    /// Cadence tag
    pub time_scope: TimeScope,
    /// Position within the plan; unique and dense, starting at 0
    pub order_index: usize,
    /// Whether the task has been completed
    pub is_completed: bool,
    /// Completion timestamp, present when `is_completed`
    pub completed_at: Option<DateTime<Utc>>,
    /// Whether this item came from the completion service
    pub is_ai_generated: bool,
}

impl TaskItem {
    /// Creates a new, not-yet-completed task.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        estimated_minutes: u32,
        time_scope: TimeScope,
        order_index: usize,
        is_ai_generated: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            estimated_minutes,
            time_scope,
            order_index,
            is_completed: false,
            completed_at: None,
            is_ai_generated,
        }
    }
}

/// The ordered task breakdown owned by a goal branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPlan {
    /// Unique plan identifier (UUID format)
    pub id: String,
    /// The owning branch (1:1 with a non-master branch)
    pub branch_id: String,
    /// Human-readable overall duration summary (e.g. "about 3 months")
    pub total_duration: String,
    /// Whether the plan came from the completion service
    pub is_ai_generated: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent task-level modification
    pub last_modified_at: Option<DateTime<Utc>>,
    /// Tasks in `order_index` order
    pub tasks: Vec<TaskItem>,
}

impl TaskPlan {
    /// Creates a plan owning the given tasks, renumbering them densely.
    pub fn new(
        branch_id: impl Into<String>,
        total_duration: impl Into<String>,
        is_ai_generated: bool,
        tasks: Vec<TaskItem>,
    ) -> Self {
        let mut plan = Self {
            id: Uuid::new_v4().to_string(),
            branch_id: branch_id.into(),
            total_duration: total_duration.into(),
            is_ai_generated,
            created_at: Utc::now(),
            last_modified_at: None,
            tasks,
        };
        plan.renumber();
        plan
    }

    /// Number of completed tasks.
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_completed).count()
    }

    /// Fraction of tasks completed, in `[0, 1]`. Zero when the plan is empty.
    pub fn progress(&self) -> f64 {
        if self.tasks.is_empty() {
            0.0
        } else {
            self.completed_count() as f64 / self.tasks.len() as f64
        }
    }

    /// Looks up a task by id.
    pub fn task(&self, task_id: &str) -> Option<&TaskItem> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Restores the dense `order_index` invariant: tasks keep their current
    /// relative order and are renumbered 0..n.
    pub fn renumber(&mut self) {
        self.tasks.sort_by_key(|t| t.order_index);
        for (index, task) in self.tasks.iter_mut().enumerate() {
            task.order_index = index;
        }
    }

    /// Appends a task at the end of the plan.
    pub fn push_task(&mut self, mut task: TaskItem) {
        task.order_index = self.tasks.len();
        self.tasks.push(task);
        self.touch();
    }

    /// Removes a task by id, renumbering the remainder.
    ///
    /// Returns the removed task, or `None` when the id is unknown.
    pub fn remove_task(&mut self, task_id: &str) -> Option<TaskItem> {
        let position = self.tasks.iter().position(|t| t.id == task_id)?;
        let removed = self.tasks.remove(position);
        self.renumber();
        self.touch();
        Some(removed)
    }

    /// Moves a task to a new position, shifting the others.
    ///
    /// `to` is clamped to the last position. Returns false when the id is
    /// unknown.
    pub fn move_task(&mut self, task_id: &str, to: usize) -> bool {
        let Some(from) = self.tasks.iter().position(|t| t.id == task_id) else {
            return false;
        };
        let task = self.tasks.remove(from);
        let to = to.min(self.tasks.len());
        self.tasks.insert(to, task);
        for (index, task) in self.tasks.iter_mut().enumerate() {
            task.order_index = index;
        }
        self.touch();
        true
    }

    /// Sets a task's completion flag, stamping or clearing `completed_at`.
    ///
    /// Returns false when the id is unknown.
    pub fn set_completed(&mut self, task_id: &str, completed: bool, now: DateTime<Utc>) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) else {
            return false;
        };
        task.is_completed = completed;
        task.completed_at = if completed { Some(now) } else { None };
        self.touch();
        true
    }

    fn touch(&mut self) {
        self.last_modified_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str, order_index: usize) -> TaskItem {
        TaskItem::new(title, "", 30, TimeScope::Daily, order_index, true)
    }

    fn assert_dense(plan: &TaskPlan) {
        for (index, task) in plan.tasks.iter().enumerate() {
            assert_eq!(task.order_index, index);
        }
    }

    #[test]
    fn test_parse_lenient_scope() {
        assert_eq!(TimeScope::parse_lenient("weekly"), TimeScope::Weekly);
        assert_eq!(TimeScope::parse_lenient("MONTHLY"), TimeScope::Monthly);
        assert_eq!(TimeScope::parse_lenient("daily"), TimeScope::Daily);
        assert_eq!(TimeScope::parse_lenient("fortnightly"), TimeScope::Daily);
        assert_eq!(TimeScope::parse_lenient(""), TimeScope::Daily);
    }

    #[test]
    fn test_new_plan_renumbers_sparse_indices() {
        let plan = TaskPlan::new(
            "branch-1",
            "2 weeks",
            true,
            vec![task("c", 7), task("a", 2), task("b", 5)],
        );
        assert_dense(&plan);
        assert_eq!(plan.tasks[0].title, "a");
        assert_eq!(plan.tasks[2].title, "c");
    }

    #[test]
    fn test_remove_keeps_indices_dense() {
        let mut plan = TaskPlan::new(
            "branch-1",
            "2 weeks",
            true,
            vec![task("a", 0), task("b", 1), task("c", 2)],
        );
        let middle = plan.tasks[1].id.clone();
        let removed = plan.remove_task(&middle).unwrap();
        assert_eq!(removed.title, "b");
        assert_eq!(plan.tasks.len(), 2);
        assert_dense(&plan);
    }

    #[test]
    fn test_move_task_reorders_densely() {
        let mut plan = TaskPlan::new(
            "branch-1",
            "2 weeks",
            true,
            vec![task("a", 0), task("b", 1), task("c", 2)],
        );
        let first = plan.tasks[0].id.clone();
        assert!(plan.move_task(&first, 99)); // clamped to the end
        assert_eq!(plan.tasks[2].title, "a");
        assert_dense(&plan);
        assert!(!plan.move_task("no-such-task", 0));
    }

    #[test]
    fn test_progress_tracks_completion() {
        let mut plan = TaskPlan::new(
            "branch-1",
            "2 weeks",
            true,
            vec![task("a", 0), task("b", 1)],
        );
        assert_eq!(plan.progress(), 0.0);

        let id = plan.tasks[0].id.clone();
        assert!(plan.set_completed(&id, true, Utc::now()));
        assert_eq!(plan.progress(), 0.5);
        assert!(plan.tasks[0].completed_at.is_some());

        assert!(plan.set_completed(&id, false, Utc::now()));
        assert_eq!(plan.progress(), 0.0);
        assert!(plan.tasks[0].completed_at.is_none());
    }

    #[test]
    fn test_empty_plan_progress_is_zero() {
        let plan = TaskPlan::new("branch-1", "", false, Vec::new());
        assert_eq!(plan.progress(), 0.0);
    }

    #[test]
    fn test_push_task_appends_at_end() {
        let mut plan = TaskPlan::new("branch-1", "2 weeks", true, vec![task("a", 0)]);
        plan.push_task(task("b", 0));
        assert_eq!(plan.tasks[1].title, "b");
        assert_dense(&plan);
        assert!(plan.last_modified_at.is_some());
    }
}
