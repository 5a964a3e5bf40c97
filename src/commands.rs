use chrono::{Local, NaiveDate, NaiveDateTime};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::auth::{hash_password, login, Session};
use crate::error::{Error, Result};
use crate::models::{EmployeeId, Priority, Task, TaskStatus};
use crate::performance::{compute_stats, leaderboard, BASE_SCORE};
use crate::storage::Storage;
use crate::tasks::{
    apply_task_update, assign_task, employee_name, get_tasks_for_employee, load_employees,
    load_task, load_tasks, TaskUpdate,
};

fn header(cells: &[&str]) -> Vec<Cell> {
    cells
        .iter()
        .map(|c| Cell::new(c).add_attribute(Attribute::Bold))
        .collect()
}

fn status_color(status: &TaskStatus) -> Color {
    match status {
        TaskStatus::Assigned => Color::Yellow,
        TaskStatus::InProgress => Color::Cyan,
        TaskStatus::Done => Color::Green,
        TaskStatus::Other(_) => Color::Reset,
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

/// Authenticates and greets the user.
pub fn cmd_login(store: &impl Storage, username: &str, password: &str) -> Result<Session> {
    let session = login(store, username, password)?;
    println!("Welcome {}! Role: {}", session.username, session.role);
    Ok(session)
}

/// Lists employees, the choices available when assigning a task.
pub fn cmd_employees(store: &impl Storage) -> Result<()> {
    let employees = load_employees(store)?;
    if employees.is_empty() {
        println!("No employees found.");
        return Ok(());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header(&["ID", "Employee Name"]));
    for e in employees {
        table.add_row(vec![e.id.to_string(), e.name]);
    }
    println!("{table}");
    Ok(())
}

/// Assigns a new task to an existing employee.
///
/// The deadline must not be before `today`.
pub fn cmd_assign(
    store: &impl Storage,
    employee_id: EmployeeId,
    title: String,
    description: String,
    deadline: NaiveDate,
    priority: Priority,
    today: NaiveDate,
) -> Result<Task> {
    if deadline < today {
        return Err(Error::DeadlineInPast(deadline));
    }
    let employees = load_employees(store)?;
    if !employees.iter().any(|e| e.id == employee_id) {
        return Err(Error::UnknownEmployee(employee_id.to_string()));
    }

    let task = assign_task(store, employee_id, title, description, deadline, priority)?;
    println!("Task assigned successfully (id = {})", task.id);
    Ok(task)
}

/// Prints every task in stored order.
pub fn cmd_tasks(store: &impl Storage) -> Result<()> {
    let tasks = load_tasks(store)?;
    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    let employees = load_employees(store)?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&[
            "Task ID",
            "Employee",
            "Title",
            "Priority",
            "Status",
            "Deadline",
            "Time Spent (hrs)",
            "Reason",
        ]));

    for t in tasks {
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(format!("{}: {}", t.employee_id, employee_name(&employees, &t.employee_id))),
            Cell::new(&t.title),
            Cell::new(t.priority).fg(priority_color(t.priority)),
            Cell::new(&t.status).fg(status_color(&t.status)),
            Cell::new(&t.deadline),
            Cell::new(format!("{:.1}", t.time_spent)),
            Cell::new(&t.reason),
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Prints one card per task assigned to the employee.
pub fn cmd_mine(store: &impl Storage, employee_id: &EmployeeId) -> Result<()> {
    let tasks = get_tasks_for_employee(store, employee_id)?;
    if tasks.is_empty() {
        println!("You have no tasks assigned.");
        return Ok(());
    }

    for t in tasks {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new(format!("Task {}", t.id)).add_attribute(Attribute::Bold),
                Cell::new(&t.title).add_attribute(Attribute::Bold),
            ]);
        table.add_row(vec![Cell::new("Description"), Cell::new(&t.description)]);
        table.add_row(vec![Cell::new("Priority"), Cell::new(t.priority).fg(priority_color(t.priority))]);
        table.add_row(vec![Cell::new("Status"), Cell::new(&t.status).fg(status_color(&t.status))]);
        table.add_row(vec![Cell::new("Assigned On"), Cell::new(t.assigned_on)]);
        table.add_row(vec![Cell::new("Deadline"), Cell::new(&t.deadline)]);
        table.add_row(vec![Cell::new("Time Spent"), Cell::new(format!("{} hrs", t.time_spent))]);
        if !t.status.is_done() && !t.reason.is_empty() {
            table.add_row(vec![Cell::new("Reason"), Cell::new(&t.reason)]);
        }
        println!("{table}");
    }
    Ok(())
}

/// Applies an employee's update to one of their own tasks.
///
/// A task owned by someone else is reported as not found.
pub fn cmd_update(store: &impl Storage, employee_id: &EmployeeId, id: u64, update: TaskUpdate) -> Result<Task> {
    let task = load_task(store, id)?;
    if task.employee_id != *employee_id {
        return Err(Error::TaskNotFound(id));
    }
    let task = apply_task_update(store, id, update)?;
    println!("Task {} updated successfully!", id);
    Ok(task)
}

/// Prints the per-employee breakdown and the leaderboard as of `now`.
pub fn cmd_report(store: &impl Storage, now: NaiveDateTime, top: Option<usize>) -> Result<()> {
    let tasks = load_tasks(store)?;
    let employees = load_employees(store)?;
    let stats = compute_stats(&tasks, &employees, now);
    if stats.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&[
            "Employee",
            "Total",
            "Done",
            "In Progress",
            "Assigned",
            "High Priority Issues",
            "Score",
        ]));
    for s in &stats {
        let score_color = if s.score >= BASE_SCORE {
            Color::Green
        } else if s.score >= BASE_SCORE / 2 {
            Color::Yellow
        } else {
            Color::Red
        };
        table.add_row(vec![
            Cell::new(&s.name),
            Cell::new(s.total),
            Cell::new(format!("{} ({:.1}%)", s.done, s.percent(s.done))),
            Cell::new(format!("{} ({:.1}%)", s.in_progress, s.percent(s.in_progress))),
            Cell::new(format!("{} ({:.1}%)", s.assigned, s.percent(s.assigned))),
            Cell::new(s.high_priority_issues),
            Cell::new(format!("{} / {}", s.score, BASE_SCORE)).fg(score_color),
        ]);
    }
    println!("{table}");

    let ranked = leaderboard(stats);
    let mut board = Table::new();
    board
        .load_preset(UTF8_FULL)
        .set_header(header(&["Rank", "Employee", "Score"]));
    for (i, s) in ranked.iter().take(top.unwrap_or(usize::MAX)).enumerate() {
        board.add_row(vec![Cell::new(i + 1), Cell::new(&s.name), Cell::new(s.score)]);
    }
    println!("Leaderboard");
    println!("{board}");
    Ok(())
}

/// Prints an encoded hash suitable for the `password` field of `users.json`.
pub fn cmd_hash_password(password: &str) -> Result<()> {
    println!("{}", hash_password(password)?);
    Ok(())
}

/// The current local date and time, as used by reports.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
