//! Filter engine: pure, order-preserving task filtering.
//!
//! Criteria fields combine with AND semantics across fields and OR semantics
//! within a field; an empty field imposes no constraint. The reference
//! instant is an explicit parameter and all calendar math (due-day
//! extraction, week and month windows) happens in that instant's timezone,
//! so the predicates carry no ambient clock or timezone dependency.

use chrono::{DateTime, Datelike, Duration, TimeZone};
use serde::{Deserialize, Serialize};

use crate::task::{Priority, Task};

/// Completion status selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Completed,
}

/// Rolling calendar windows over the task due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateWindow {
    Today,
    Overdue,
    ThisWeek,
    ThisMonth,
}

/// A filter over status, due date, category and priority.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default)]
    pub status: Vec<Status>,
    #[serde(default)]
    pub date: Option<DateWindow>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub priority: Vec<Priority>,
}

impl Criteria {
    /// Whether any field constrains the result.
    pub fn is_active(&self) -> bool {
        !self.status.is_empty()
            || self.date.is_some()
            || !self.categories.is_empty()
            || !self.priority.is_empty()
    }

    /// Whether a single task satisfies every active field, relative to `now`.
    pub fn matches<Tz: TimeZone>(&self, task: &Task, now: &DateTime<Tz>) -> bool {
        if !self.status.is_empty() {
            let status_match = (self.status.contains(&Status::Pending) && !task.completed)
                || (self.status.contains(&Status::Completed) && task.completed);
            if !status_match {
                return false;
            }
        }

        if let Some(window) = self.date {
            // Tasks without a due date never match a date window.
            let Some(due) = task.due_date else {
                return false;
            };
            let today = now.date_naive();
            let due_day = due.with_timezone(&now.timezone()).date_naive();
            let in_window = match window {
                DateWindow::Today => due_day == today,
                DateWindow::Overdue => due_day < today && !task.completed,
                DateWindow::ThisWeek => {
                    let start =
                        today - Duration::days(today.weekday().num_days_from_sunday() as i64);
                    let end = start + Duration::days(6);
                    due_day >= start && due_day <= end
                }
                DateWindow::ThisMonth => {
                    due_day.year() == today.year() && due_day.month() == today.month()
                }
            };
            if !in_window {
                return false;
            }
        }

        if !self.categories.is_empty() && !self.categories.contains(&task.category) {
            return false;
        }

        if !self.priority.is_empty() && !self.priority.contains(&task.priority) {
            return false;
        }

        true
    }
}

/// Filter `tasks` against `criteria` relative to `now`, preserving the
/// original relative order.
pub fn apply<Tz: TimeZone>(tasks: &[Task], criteria: &Criteria, now: DateTime<Tz>) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| criteria.matches(task, &now))
        .cloned()
        .collect()
}

/// [`apply`] against the current local wall clock.
pub fn apply_now(tasks: &[Task], criteria: &Criteria) -> Vec<Task> {
    apply(tasks, criteria, chrono::Local::now())
}
