//! Report-time scoring: per-employee status counters, high-priority
//! penalties and the leaderboard. Nothing here is persisted.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::models::{Employee, EmployeeId, Priority, Task, TaskStatus};
use crate::tasks::employee_name;

/// Every employee starts a report with this score.
pub const BASE_SCORE: i64 = 100;
/// Deducted for each open or overdue high-priority task.
pub const HIGH_PRIORITY_PENALTY: i64 = 10;

/// Per-employee aggregate computed at report time. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeStats {
    pub employee_id: EmployeeId,
    pub name: String,
    pub assigned: usize,
    pub in_progress: usize,
    pub done: usize,
    /// Tasks whose status is none of the three known states.
    pub other: usize,
    pub total: usize,
    pub high_priority_issues: usize,
    /// Starts at [`BASE_SCORE`] and has no floor.
    pub score: i64,
}

impl EmployeeStats {
    fn new(employee_id: EmployeeId, name: String) -> Self {
        EmployeeStats {
            employee_id,
            name,
            assigned: 0,
            in_progress: 0,
            done: 0,
            other: 0,
            total: 0,
            high_priority_issues: 0,
            score: BASE_SCORE,
        }
    }

    /// Share of the total as a percentage, 0 when there are no tasks.
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total as f64
        }
    }

    fn record(&mut self, task: &Task, now: NaiveDateTime) {
        match task.status {
            TaskStatus::Assigned => self.assigned += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::Done => self.done += 1,
            TaskStatus::Other(_) => self.other += 1,
        }
        self.total += 1;

        let penalty = task_penalty(task, now);
        if penalty != 0 {
            self.score -= penalty;
            self.high_priority_issues += 1;
        }
    }
}

/// Returns the score deduction a single task causes at `now`.
///
/// - High priority and not done: penalised.
/// - High priority, done, and `now` is past midnight of the deadline:
///   penalised. Deadlines that are empty or not `YYYY-MM-DD` never count
///   as overdue.
/// - Anything else: no deduction.
pub fn task_penalty(task: &Task, now: NaiveDateTime) -> i64 {
    if task.priority != Priority::High {
        return 0;
    }
    if !task.status.is_done() {
        return HIGH_PRIORITY_PENALTY;
    }
    if task.deadline.is_empty() {
        return 0;
    }
    match NaiveDate::parse_from_str(&task.deadline, "%Y-%m-%d") {
        Ok(deadline) if now > deadline.and_time(NaiveTime::MIN) => HIGH_PRIORITY_PENALTY,
        Ok(_) => 0,
        Err(e) => {
            debug!(id = task.id, deadline = %task.deadline, "unparseable deadline: {}", e);
            0
        }
    }
}

/// Aggregates tasks per employee, in the order each employee is first
/// seen in `tasks`. Employees without tasks are not included.
pub fn compute_stats(tasks: &[Task], employees: &[Employee], now: NaiveDateTime) -> Vec<EmployeeStats> {
    let mut stats: Vec<EmployeeStats> = Vec::new();
    for task in tasks {
        let idx = match stats.iter().position(|s| s.employee_id == task.employee_id) {
            Some(i) => i,
            None => {
                let name = employee_name(employees, &task.employee_id).to_string();
                stats.push(EmployeeStats::new(task.employee_id.clone(), name));
                stats.len() - 1
            }
        };
        stats[idx].record(task, now);
    }
    stats
}

/// Orders employees by score, highest first. Equal scores keep the
/// order they were first seen in.
pub fn leaderboard(mut stats: Vec<EmployeeStats>) -> Vec<EmployeeStats> {
    // sort_by is stable
    stats.sort_by(|a, b| b.score.cmp(&a.score));
    stats
}
