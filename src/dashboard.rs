//! Dashboard aggregation over one fetch of tasks, categories and recent
//! context. Nothing here is persisted.

use chrono::{DateTime, Duration, Utc};

use crate::category::Category;
use crate::context::ContextEntry;
use crate::fields::Status;
use crate::task::Task;

/// Scores at or above this are highlighted as high priority.
pub const HIGH_PRIORITY_THRESHOLD: f64 = 70.0;
/// Deadlines this many days ahead (or fewer) count as upcoming.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;
/// Context entries shown on the dashboard.
pub const RECENT_CONTEXT_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Tasks due within the upcoming window, soonest first.
    pub upcoming: Vec<Task>,
    /// All tasks, highest priority score first.
    pub ranked: Vec<Task>,
    pub category_count: usize,
    pub recent_context: Vec<ContextEntry>,
}

impl DashboardSummary {
    /// The highest-priority task, if any.
    pub fn top_task(&self) -> Option<&Task> {
        self.ranked.first()
    }
}

pub fn is_high_priority(task: &Task) -> bool {
    task.priority_score >= HIGH_PRIORITY_THRESHOLD
}

/// Whether the task's deadline falls in `[now, now + UPCOMING_WINDOW_DAYS]`.
pub fn is_upcoming(task: &Task, now: DateTime<Utc>) -> bool {
    match task.deadline {
        Some(d) => d >= now && d <= now + Duration::days(UPCOMING_WINDOW_DAYS),
        None => false,
    }
}

/// Sort tasks by priority score, highest first. Ties keep their order.
pub fn rank_by_priority(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
}

pub fn summarise(
    mut tasks: Vec<Task>,
    categories: &[Category],
    mut recent_context: Vec<ContextEntry>,
    now: DateTime<Utc>,
) -> DashboardSummary {
    rank_by_priority(&mut tasks);

    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.status == Status::Done).count();

    let mut upcoming: Vec<Task> = tasks.iter().filter(|t| is_upcoming(t, now)).cloned().collect();
    upcoming.sort_by_key(|t| t.deadline);

    recent_context.truncate(RECENT_CONTEXT_LIMIT);

    DashboardSummary {
        total,
        completed,
        pending: total - completed,
        upcoming,
        ranked: tasks,
        category_count: categories.len(),
        recent_context,
    }
}
