//! Statistics engine: completion rates over rolling calendar windows.
//!
//! For each window (day, week, month, year) the population is every task
//! whose `updated_at` falls at or after the window start; the rate is the
//! rounded percentage of completed tasks in that population, `0` when the
//! population is empty. The reference instant is an explicit parameter so
//! window boundaries stay testable; week start is Monday.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Completion rates (percent, 0..=100) per rolling window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionStats {
    pub daily: u8,
    pub weekly: u8,
    pub monthly: u8,
    pub yearly: u8,
}

/// Compute completion rates relative to `now`, in `now`'s timezone.
pub fn completion_stats<Tz: TimeZone>(tasks: &[Task], now: DateTime<Tz>) -> CompletionStats {
    let tz = now.timezone();
    let today = now.date_naive();

    let start_of_day = today.and_time(NaiveTime::MIN);
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    let start_of_week = monday.and_time(NaiveTime::MIN);
    let start_of_month = today.with_day(1).unwrap_or(today).and_time(NaiveTime::MIN);
    let start_of_year = today
        .with_month(1)
        .and_then(|d| d.with_day(1))
        .unwrap_or(today)
        .and_time(NaiveTime::MIN);

    CompletionStats {
        daily: rate_since(tasks, resolve_local(&tz, start_of_day)),
        weekly: rate_since(tasks, resolve_local(&tz, start_of_week)),
        monthly: rate_since(tasks, resolve_local(&tz, start_of_month)),
        yearly: rate_since(tasks, resolve_local(&tz, start_of_year)),
    }
}

/// [`completion_stats`] against the ambient local clock.
pub fn completion_stats_now(tasks: &[Task]) -> CompletionStats {
    completion_stats(tasks, chrono::Local::now())
}

fn rate_since(tasks: &[Task], start: DateTime<Utc>) -> u8 {
    let mut total = 0usize;
    let mut completed = 0usize;
    for task in tasks {
        if task.updated_at >= start {
            total += 1;
            if task.completed {
                completed += 1;
            }
        }
    }
    if total == 0 {
        return 0;
    }
    (100.0 * completed as f64 / total as f64).round() as u8
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // Midnight can fall in a DST gap; the window then starts at the next
        // representable hour.
        LocalResult::None => resolve_local(tz, naive + Duration::hours(1)),
    }
}
