use chrono::{Local, NaiveDate};
use taskdesk::models::{Employee, EmployeeId, Priority, Task, TaskStatus};
use taskdesk::storage::{Collection, MemoryStorage, Storage};
use taskdesk::tasks::*;
use taskdesk::Error;

fn deadline() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 6, 1).unwrap()
}

fn employees() -> Vec<Employee> {
    vec![
        Employee { id: "1".into(), name: "Asha".into() },
        Employee { id: "2".into(), name: "Ben".into() },
    ]
}

fn test_store() -> MemoryStorage {
    MemoryStorage::new()
        .with(Collection::Employees, &employees())
        .unwrap()
}

fn assign(store: &MemoryStorage, employee: &str, title: &str) -> Task {
    assign_task(
        store,
        employee.into(),
        title.into(),
        format!("{} description", title),
        deadline(),
        Priority::Medium,
    )
    .unwrap()
}

#[test]
fn test_assign_first_task() {
    let store = test_store();
    let task = assign(&store, "1", "Write report");

    assert_eq!(task.id, 1);
    assert_eq!(task.status, TaskStatus::Assigned);
    assert_eq!(task.time_spent, 0.0);
    assert_eq!(task.reason, "");
    assert_eq!(task.deadline, "2030-06-01");
    assert_eq!(task.assigned_on, Local::now().date_naive());

    let tasks = load_tasks(&store).unwrap();
    assert_eq!(tasks, vec![task]);
}

#[test]
fn test_assign_uses_count_plus_one() {
    let store = test_store();
    for i in 0..3 {
        assign(&store, "1", &format!("Task {}", i));
    }
    let task = assign(&store, "2", "Fourth");
    assert_eq!(task.id, 4);

    let ids: Vec<u64> = load_tasks(&store).unwrap().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn test_assign_to_unknown_employee_is_allowed() {
    let store = test_store();
    let task = assign(&store, "99", "Orphan");
    assert_eq!(task.employee_id, EmployeeId::from("99"));
    assert_eq!(employee_name(&employees(), &task.employee_id), UNKNOWN_EMPLOYEE);
}

#[test]
fn test_tasks_for_employee() {
    let store = test_store();
    assign(&store, "1", "A");
    assign(&store, "2", "B");
    assign(&store, "1", "C");

    let titles: Vec<String> = get_tasks_for_employee(&store, &"1".into())
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["A", "C"]);
    assert!(get_tasks_for_employee(&store, &"3".into()).unwrap().is_empty());
}

#[test]
fn test_numeric_employee_ids_match_strings() {
    let raw = br#"[
        {
            "id": 1,
            "employee_id": 7,
            "title": "Legacy",
            "description": "",
            "status": "Assigned",
            "assigned_on": "2024-01-01",
            "deadline": "2024-02-01",
            "time_spent": 0
        }
    ]"#;
    let store = MemoryStorage::new();
    store.write(Collection::Tasks, raw).unwrap();

    let tasks = get_tasks_for_employee(&store, &"7".into()).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].priority, Priority::Medium);
    assert_eq!(tasks[0].reason, "");
}

#[test]
fn test_status_transitions_are_unconstrained() {
    let store = test_store();
    let id = assign(&store, "1", "Loop").id;

    update_task_status(&store, id, TaskStatus::Done).unwrap();
    update_task_status(&store, id, TaskStatus::Assigned).unwrap();
    let task = update_task_status(&store, id, TaskStatus::InProgress).unwrap();
    assert_eq!(task.status, TaskStatus::InProgress);

    let task = update_task_status(&store, id, "Blocked".into()).unwrap();
    assert_eq!(task.status, TaskStatus::Other("Blocked".into()));
    assert_eq!(load_task(&store, id).unwrap().status.as_str(), "Blocked");
}

#[test]
fn test_log_time_is_additive() {
    let store = test_store();
    let id = assign(&store, "1", "Hours").id;

    log_time_spent(&store, id, 1.5).unwrap();
    let task = log_time_spent(&store, id, 2.0).unwrap();
    assert_eq!(task.time_spent, 3.5);
    assert_eq!(load_task(&store, id).unwrap().time_spent, 3.5);
}

#[test]
fn test_log_zero_hours_is_noop() {
    let store = test_store();
    let id = assign(&store, "1", "Idle").id;
    log_time_spent(&store, id, 2.0).unwrap();
    let before = store.raw(Collection::Tasks);

    let task = log_time_spent(&store, id, 0.0).unwrap();
    assert_eq!(task.time_spent, 2.0);
    assert_eq!(store.raw(Collection::Tasks), before);
}

#[test]
fn test_log_negative_hours_rejected() {
    let store = test_store();
    let id = assign(&store, "1", "Hours").id;
    assert!(matches!(log_time_spent(&store, id, -1.0), Err(Error::InvalidHours(_))));
    assert!(matches!(log_time_spent(&store, id, f64::NAN), Err(Error::InvalidHours(_))));
    assert_eq!(load_task(&store, id).unwrap().time_spent, 0.0);
}

#[test]
fn test_update_reason() {
    let store = test_store();
    let id = assign(&store, "1", "Blocked work").id;
    let task = update_task_reason(&store, id, "Waiting on vendor".into()).unwrap();
    assert_eq!(task.reason, "Waiting on vendor");
    let task = update_task_reason(&store, id, String::new()).unwrap();
    assert_eq!(task.reason, "");
}

#[test]
fn test_missing_task_leaves_collection_unchanged() {
    let store = test_store();
    assign(&store, "1", "Only");
    let before = store.raw(Collection::Tasks).unwrap();

    assert!(matches!(
        update_task_status(&store, 42, TaskStatus::Done),
        Err(Error::TaskNotFound(42))
    ));
    assert!(matches!(
        update_task_reason(&store, 42, "x".into()),
        Err(Error::TaskNotFound(42))
    ));
    assert!(matches!(log_time_spent(&store, 42, 1.0), Err(Error::TaskNotFound(42))));

    assert_eq!(store.raw(Collection::Tasks).unwrap(), before);
}

#[test]
fn test_mutations_only_touch_one_task() {
    let store = test_store();
    let a = assign(&store, "1", "A");
    let b = assign(&store, "2", "B");

    update_task_status(&store, b.id, TaskStatus::Done).unwrap();
    log_time_spent(&store, b.id, 4.0).unwrap();

    assert_eq!(load_task(&store, a.id).unwrap(), a);
}

#[test]
fn test_apply_update_all_fields() {
    let store = test_store();
    let id = assign(&store, "1", "Card").id;

    let task = apply_task_update(
        &store,
        id,
        TaskUpdate {
            status: Some(TaskStatus::InProgress),
            hours: 2.5,
            reason: Some("  Waiting on review  ".into()),
        },
    )
    .unwrap();

    assert_eq!(task.status, TaskStatus::InProgress);
    assert_eq!(task.time_spent, 2.5);
    assert_eq!(task.reason, "Waiting on review");
    assert_eq!(load_task(&store, id).unwrap(), task);
}

#[test]
fn test_apply_update_skips_blank_reason_and_done_tasks() {
    let store = test_store();
    let id = assign(&store, "1", "Card").id;
    update_task_reason(&store, id, "Original".into()).unwrap();

    let task = apply_task_update(
        &store,
        id,
        TaskUpdate { status: None, hours: 0.0, reason: Some("   ".into()) },
    )
    .unwrap();
    assert_eq!(task.reason, "Original");

    update_task_status(&store, id, TaskStatus::Done).unwrap();
    let task = apply_task_update(
        &store,
        id,
        TaskUpdate { status: None, hours: 1.0, reason: Some("Late".into()) },
    )
    .unwrap();
    assert_eq!(task.reason, "Original");
    assert_eq!(task.time_spent, 1.0);
}

#[test]
fn test_apply_update_rejects_negative_hours_before_writing() {
    let store = test_store();
    let id = assign(&store, "1", "Card").id;
    let before = store.raw(Collection::Tasks);

    let res = apply_task_update(
        &store,
        id,
        TaskUpdate { status: Some(TaskStatus::Done), hours: -2.0, reason: None },
    );
    assert!(matches!(res, Err(Error::InvalidHours(_))));
    assert_eq!(store.raw(Collection::Tasks), before);
}

#[test]
fn test_concurrent_writers_lose_updates() {
    let store = test_store();
    let id = assign(&store, "1", "Race").id;

    // Second writer loads before the first one saves.
    let stale: Vec<Task> = store.load(Collection::Tasks).unwrap();
    update_task_status(&store, id, TaskStatus::Done).unwrap();
    store.save(Collection::Tasks, &stale).unwrap();

    assert_eq!(load_task(&store, id).unwrap().status, TaskStatus::Assigned);
}
