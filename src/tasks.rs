//! Task assignment and mutation.
//!
//! Every operation loads the whole task collection, changes at most one
//! record, and saves the whole collection back. Nothing coordinates
//! concurrent callers: two overlapping mutations both save their own
//! snapshot and the later save wins.

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Employee, EmployeeId, Priority, Task, TaskStatus};
use crate::storage::{Collection, Storage};

/// Shown wherever a task refers to an employee that does not exist.
pub const UNKNOWN_EMPLOYEE: &str = "Unknown";

/// Loads all tasks in stored order.
pub fn load_tasks(store: &impl Storage) -> Result<Vec<Task>> {
    store.load(Collection::Tasks)
}

/// Loads all employees in stored order.
pub fn load_employees(store: &impl Storage) -> Result<Vec<Employee>> {
    store.load(Collection::Employees)
}

/// Loads a single task by its ID.
///
/// Returns `TaskNotFound` if no task has that ID.
pub fn load_task(store: &impl Storage, id: u64) -> Result<Task> {
    load_tasks(store)?
        .into_iter()
        .find(|t| t.id == id)
        .ok_or(Error::TaskNotFound(id))
}

/// Looks up the display name of an employee, or [`UNKNOWN_EMPLOYEE`].
pub fn employee_name<'a>(employees: &'a [Employee], id: &EmployeeId) -> &'a str {
    employees
        .iter()
        .find(|e| e.id == *id)
        .map(|e| e.name.as_str())
        .unwrap_or(UNKNOWN_EMPLOYEE)
}

/// Creates a new task with status Assigned and appends it to the collection.
///
/// The new id is the current number of tasks plus one. The employee is
/// not checked for existence and the deadline is not checked against
/// today; callers that care do that before calling.
pub fn assign_task(
    store: &impl Storage,
    employee_id: EmployeeId,
    title: String,
    description: String,
    deadline: NaiveDate,
    priority: Priority,
) -> Result<Task> {
    let mut tasks = load_tasks(store)?;
    let task = Task {
        id: tasks.len() as u64 + 1,
        employee_id,
        title,
        description,
        status: TaskStatus::Assigned,
        assigned_on: Local::now().date_naive(),
        deadline: deadline.format("%Y-%m-%d").to_string(),
        priority,
        time_spent: 0.0,
        reason: String::new(),
    };
    tasks.push(task.clone());
    store.save(Collection::Tasks, &tasks)?;
    info!(id = task.id, employee = %task.employee_id, "task assigned");
    Ok(task)
}

/// Returns the tasks assigned to one employee, in stored order.
pub fn get_tasks_for_employee(store: &impl Storage, employee_id: &EmployeeId) -> Result<Vec<Task>> {
    let mut tasks = load_tasks(store)?;
    tasks.retain(|t| t.employee_id == *employee_id);
    debug!(employee = %employee_id, count = tasks.len(), "filtered tasks");
    Ok(tasks)
}

/// Loads the collection, applies `f` to the first task with `id` and
/// saves. Nothing is written when the task does not exist.
fn mutate_task<S, F>(store: &S, id: u64, f: F) -> Result<Task>
where
    S: Storage,
    F: FnOnce(&mut Task),
{
    let mut tasks = load_tasks(store)?;
    let task = tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or(Error::TaskNotFound(id))?;
    f(task);
    let updated = task.clone();
    store.save(Collection::Tasks, &tasks)?;
    Ok(updated)
}

/// Overwrites the status of a task. Any status may follow any other.
pub fn update_task_status(store: &impl Storage, id: u64, status: TaskStatus) -> Result<Task> {
    let task = mutate_task(store, id, |t| t.status = status)?;
    info!(id, status = %task.status, "task status updated");
    Ok(task)
}

/// Adds hours to the time spent on a task.
///
/// Zero hours leaves the task and the stored collection untouched.
pub fn log_time_spent(store: &impl Storage, id: u64, hours: f64) -> Result<Task> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(Error::InvalidHours(hours));
    }
    if hours == 0.0 {
        return load_task(store, id);
    }
    let task = mutate_task(store, id, |t| t.time_spent += hours)?;
    info!(id, hours, total = task.time_spent, "time logged");
    Ok(task)
}

/// Overwrites the reason text of a task.
pub fn update_task_reason(store: &impl Storage, id: u64, reason: String) -> Result<Task> {
    let task = mutate_task(store, id, |t| t.reason = reason)?;
    info!(id, "task reason updated");
    Ok(task)
}

/// The changes an employee submits for one task in a single action.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub status: Option<TaskStatus>,
    pub hours: f64,
    pub reason: Option<String>,
}

/// Applies a [`TaskUpdate`] as up to three independent mutations: status,
/// then hours if positive, then the trimmed reason if non-empty.
///
/// The reason only applies to tasks that were not Done before the
/// update.
pub fn apply_task_update(store: &impl Storage, id: u64, update: TaskUpdate) -> Result<Task> {
    if !update.hours.is_finite() || update.hours < 0.0 {
        return Err(Error::InvalidHours(update.hours));
    }
    let mut task = load_task(store, id)?;
    let was_done = task.status.is_done();

    if let Some(status) = update.status {
        task = update_task_status(store, id, status)?;
    }
    if update.hours > 0.0 {
        task = log_time_spent(store, id, update.hours)?;
    }
    if let Some(reason) = update.reason {
        let reason = reason.trim();
        if !was_done && !reason.is_empty() {
            task = update_task_reason(store, id, reason.to_string())?;
        }
    }
    Ok(task)
}
