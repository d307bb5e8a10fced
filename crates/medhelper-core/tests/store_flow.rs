use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use medhelper_core::page::{AddTaskForm, Notice, PageController};
use medhelper_core::store::TaskStore;
use medhelper_core::task::{NewTask, Priority};
use medhelper_core::view;
use tempfile::tempdir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
}

fn plus(days: u64) -> NaiveDate {
    today().checked_add_days(Days::new(days)).expect("in range")
}

fn minus(days: u64) -> NaiveDate {
    today().checked_sub_days(Days::new(days)).expect("in range")
}

#[test]
fn initialize_is_idempotent() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("nested").join("med_helper.db");

    let store = TaskStore::open(&path).expect("open store");
    store.add_task(&NewTask::new("Anatomy lab")).expect("add");
    store.initialize().expect("second initialize");
    let reopened = TaskStore::open(&path).expect("reopen");

    assert!(path.exists());
    assert_eq!(reopened.list_tasks().expect("list").len(), 1);
}

#[test]
fn every_add_gets_a_fresh_id() {
    let temp = tempdir().expect("tempdir");
    let store = TaskStore::open(&temp.path().join("tasks.db")).expect("open store");

    let mut seen = HashSet::new();
    for i in 0..5 {
        let id = store
            .add_task(&NewTask::new(format!("task {i}")))
            .expect("add task");
        assert!(seen.insert(id), "id {id} reused");
    }

    let listed: HashSet<i64> = store.list_tasks().expect("list").iter().map(|t| t.id).collect();
    assert_eq!(listed, seen);
}

#[test]
fn ids_are_not_reused_after_delete() {
    let temp = tempdir().expect("tempdir");
    let store = TaskStore::open(&temp.path().join("tasks.db")).expect("open store");

    let first = store.add_task(&NewTask::new("one")).expect("add");
    let second = store.add_task(&NewTask::new("two")).expect("add");
    store.delete_task(second).expect("delete");
    let third = store.add_task(&NewTask::new("three")).expect("add");

    assert!(third > second && second > first);
}

#[test]
fn toggling_done_restores_state() {
    let temp = tempdir().expect("tempdir");
    let store = TaskStore::open(&temp.path().join("tasks.db")).expect("open store");
    let id = store.add_task(&NewTask::new("Pharm flashcards")).expect("add");

    assert!(store.set_done(id, true).expect("set done"));
    assert!(store.get_task(id).expect("get").expect("exists").done);
    assert!(store.set_done(id, false).expect("set undone"));
    assert!(!store.get_task(id).expect("get").expect("exists").done);

    assert!(!store.set_done(id + 100, true).expect("missing id is a no-op"));
}

#[test]
fn delete_is_a_noop_the_second_time() {
    let temp = tempdir().expect("tempdir");
    let store = TaskStore::open(&temp.path().join("tasks.db")).expect("open store");
    let keep = store.add_task(&NewTask::new("keep")).expect("add");
    let dropped = store.add_task(&NewTask::new("drop")).expect("add");

    assert!(store.delete_task(dropped).expect("delete"));
    assert!(!store.delete_task(dropped).expect("second delete"));

    let tasks = store.list_tasks().expect("list");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, keep);
}

#[test]
fn listing_puts_open_first_then_due_date_then_undated() {
    let temp = tempdir().expect("tempdir");
    let store = TaskStore::open(&temp.path().join("tasks.db")).expect("open store");

    let late = store.add_task(&NewTask::new("late").due(plus(9))).expect("add");
    let undated = store.add_task(&NewTask::new("undated")).expect("add");
    let early = store.add_task(&NewTask::new("early").due(minus(1))).expect("add");
    let finished = store.add_task(&NewTask::new("finished").due(minus(5))).expect("add");
    store.set_done(finished, true).expect("done");

    let order: Vec<i64> = store.list_tasks().expect("list").iter().map(|t| t.id).collect();
    assert_eq!(order, vec![early, late, undated, finished]);
}

#[test]
fn unparseable_due_dates_read_as_none() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("tasks.db");
    let store = TaskStore::open(&path).expect("open store");

    let conn = rusqlite::Connection::open(&path).expect("raw connection");
    conn.execute(
        "INSERT INTO tasks (title, due_date, tag, priority, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params!["legacy", "whenever", "Misc", "Urgent", "2026-01-02T03:04:05.000006"],
    )
    .expect("raw insert");
    conn.execute("INSERT INTO tasks (title) VALUES ('bare')", [])
        .expect("raw insert without created_at");
    conn.execute(
        "INSERT INTO tasks (title, created_at) VALUES ('garbled', 'yesterday-ish')",
        [],
    )
    .expect("raw insert with bad created_at");
    drop(conn);
    store.add_task(&NewTask::new("dated").due(plus(1))).expect("add");

    let tasks = store.list_tasks().expect("list");
    let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["dated", "legacy", "bare", "garbled"]);
    assert_eq!(tasks[1].due_date, None);
    assert_eq!(tasks[1].priority, Priority::Medium);
    assert!(tasks[1].created_at.is_some());
    assert_eq!(tasks[2].created_at, None);
    assert_eq!(tasks[2].priority, Priority::Medium);
    assert!(!tasks[2].done);
    assert_eq!(tasks[3].created_at, None);
    assert!(tasks[0].created_at.is_some());

    let bare = store.get_task(tasks[2].id).expect("get").expect("exists");
    assert_eq!(bare.title, "bare");
}

#[test]
fn scenario_add_then_complete() {
    let temp = tempdir().expect("tempdir");
    let store = TaskStore::open(&temp.path().join("tasks.db")).expect("open store");

    let id = store
        .add_task(
            &NewTask::new("Review cardiac cycle")
                .due(plus(2))
                .tag("Cardio")
                .priority(Priority::High),
        )
        .expect("add");

    let tasks = store.list_tasks().expect("list");
    assert_eq!(tasks.len(), 1);
    assert!(!tasks[0].done);
    assert_eq!(tasks[0].due_date, Some(plus(2)));
    assert_eq!(tasks[0].tag, "Cardio");
    assert_eq!(tasks[0].priority, Priority::High);

    store.set_done(id, true).expect("done");
    let counts = view::counts(&store.list_tasks().expect("list"), today());
    assert_eq!(counts.completed, 1);
    assert_eq!(counts.open, 0);
}

#[test]
fn scenario_overdue_and_far_future() {
    let temp = tempdir().expect("tempdir");
    let store = TaskStore::open(&temp.path().join("tasks.db")).expect("open store");
    store.add_task(&NewTask::new("overdue").due(minus(1))).expect("add");
    store.add_task(&NewTask::new("far").due(plus(10))).expect("add");

    let tasks = store.list_tasks().expect("list");
    let counts = view::counts(&tasks, today());
    assert_eq!(counts.overdue, 1);
    assert_eq!(counts.due_soon, 0);
    assert_eq!(counts.open + counts.completed, tasks.len());
}

#[test]
fn survives_reopen() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("med_helper.db");

    let before = {
        let store = TaskStore::open(&path).expect("open store");
        store.add_task(&NewTask::new("one").due(plus(1)).tag("Block1")).expect("add");
        store
            .add_task(&NewTask::new("two").priority(Priority::Low))
            .expect("add");
        let third = store
            .add_task(&NewTask::new("three").due(minus(3)).tag("Anatomy"))
            .expect("add");
        store.set_done(third, true).expect("done");
        store.list_tasks().expect("list")
    };

    let reopened = TaskStore::open(&path).expect("reopen");
    assert_eq!(reopened.list_tasks().expect("list"), before);
}

#[test]
fn controller_reloads_after_every_action() {
    let temp = tempdir().expect("tempdir");
    let store = TaskStore::open(&temp.path().join("tasks.db")).expect("open store");
    let controller = PageController::new(store);

    let form = AddTaskForm {
        title: "Review cardiac cycle".to_string(),
        due_date: plus(2).format("%Y-%m-%d").to_string(),
        tag: "Cardio".to_string(),
        priority: "High".to_string(),
    };
    let added = controller.add_task(&form, today(), None).expect("add");
    assert_eq!(added.notice, Some(Notice::Success("Task added".to_string())));
    assert_eq!(added.snapshot.tasks.len(), 1);
    assert_eq!(added.snapshot.counts.due_soon, 1);
    let id = added.snapshot.tasks[0].id;

    let toggled = controller.toggle(id, true, today(), None).expect("toggle");
    assert_eq!(toggled.snapshot.counts.completed, 1);
    assert_eq!(toggled.snapshot.counts.open, 0);

    let unchanged = controller.toggle(id, true, today(), None).expect("same state");
    assert_eq!(unchanged.snapshot.counts.completed, 1);

    let missing = controller.toggle(id + 1, true, today(), None).expect("missing id");
    assert_eq!(missing.snapshot.tasks.len(), 1);

    let deleted = controller.delete(id, today(), None).expect("delete");
    assert!(deleted.snapshot.tasks.is_empty());
    assert_eq!(deleted.notice, Some(Notice::Info("Task deleted".to_string())));

    let again = controller.delete(id, today(), None).expect("delete again");
    assert_eq!(again.notice, None);
}

#[test]
fn controller_actions_keep_the_tag_filter() {
    let temp = tempdir().expect("tempdir");
    let store = TaskStore::open(&temp.path().join("tasks.db")).expect("open store");
    let ecg = store.add_task(&NewTask::new("ECG basics").tag("Cardio")).expect("add");
    let murmurs = store.add_task(&NewTask::new("Murmurs").tag("Cardio")).expect("add");
    store.add_task(&NewTask::new("Brachial plexus").tag("Anatomy")).expect("add");
    let controller = PageController::new(store);

    let toggled = controller.toggle(ecg, true, today(), Some("Cardio")).expect("toggle");
    assert_eq!(toggled.snapshot.tag_filter.as_deref(), Some("Cardio"));
    assert_eq!(toggled.snapshot.visible.len(), 2);
    assert_eq!(toggled.snapshot.tasks.len(), 3);

    let deleted = controller.delete(murmurs, today(), Some("Cardio")).expect("delete");
    assert_eq!(deleted.snapshot.tag_filter.as_deref(), Some("Cardio"));
    let visible: Vec<&str> = deleted.snapshot.visible.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(visible, vec!["ECG basics"]);

    let form = AddTaskForm {
        title: "Valve sounds".to_string(),
        tag: "Cardio".to_string(),
        ..AddTaskForm::default()
    };
    let added = controller.add_task(&form, today(), Some("Cardio")).expect("add");
    assert_eq!(added.snapshot.visible.len(), 2);
    assert!(added.snapshot.visible.iter().all(|t| t.has_tag("cardio")));
}

#[test]
fn controller_rejects_blank_title_without_writing() {
    let temp = tempdir().expect("tempdir");
    let store = TaskStore::open(&temp.path().join("tasks.db")).expect("open store");
    let controller = PageController::new(store);

    let outcome = controller
        .add_task(
            &AddTaskForm {
                title: "  ".to_string(),
                ..AddTaskForm::default()
            },
            today(),
            None,
        )
        .expect("validation is not an error");

    assert!(matches!(outcome.notice, Some(Notice::Warning(_))));
    assert!(controller.store().list_tasks().expect("list").is_empty());
}

#[test]
fn snapshot_filters_by_tag_but_counts_everything() {
    let temp = tempdir().expect("tempdir");
    let store = TaskStore::open(&temp.path().join("tasks.db")).expect("open store");
    store.add_task(&NewTask::new("ecg").tag("Cardio").due(plus(1))).expect("add");
    store.add_task(&NewTask::new("bones").tag("Anatomy")).expect("add");
    let controller = PageController::new(store).with_upcoming_limit(1);

    let snap = controller.snapshot(today(), Some(" cardio ")).expect("snapshot");
    assert_eq!(snap.tag_filter.as_deref(), Some("cardio"));
    assert_eq!(snap.visible.len(), 1);
    assert_eq!(snap.counts.open, 2);
    assert_eq!(snap.tags, vec!["Anatomy".to_string(), "Cardio".to_string()]);
    assert_eq!(snap.upcoming.len(), 1);
}

#[test]
fn generate_cards_only_acknowledges() {
    let temp = tempdir().expect("tempdir");
    let store = TaskStore::open(&temp.path().join("tasks.db")).expect("open store");
    let controller = PageController::new(store);

    assert!(matches!(controller.generate_cards(""), Notice::Warning(_)));
    match controller.generate_cards("Preload ~ EDV\nAfterload ~ MAP") {
        Notice::Success(msg) => assert!(msg.contains("2 note lines")),
        other => panic!("unexpected notice: {other:?}"),
    }
    assert!(controller.store().list_tasks().expect("list").is_empty());
}
