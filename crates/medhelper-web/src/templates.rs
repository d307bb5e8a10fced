use askama::Template;
use chrono::NaiveDate;
use medhelper_core::datetime::{format_due_date, relative_due_label};
use medhelper_core::page::{Notice, Snapshot, View};
use medhelper_core::task::{Priority, Task};
use medhelper_core::view::{Counts, DueStatus};

pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
    pub active: bool,
}

pub struct NoticeView {
    pub class: &'static str,
    pub message: String,
}

/// Header, sidebar and notice banner shared by every page.
pub struct Chrome {
    pub title: &'static str,
    pub nav: Vec<NavItem>,
    pub notice: Option<NoticeView>,
    pub today: String,
}

impl Chrome {
    pub fn new(active: View, today: NaiveDate, notice: Option<&Notice>) -> Self {
        Self {
            title: active.label(),
            nav: View::ALL
                .into_iter()
                .map(|v| NavItem {
                    label: v.label(),
                    path: v.path(),
                    active: v == active,
                })
                .collect(),
            notice: notice.map(|n| NoticeView {
                class: n.css_class(),
                message: n.message().to_string(),
            }),
            today: format_due_date(today),
        }
    }
}

pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub tag: String,
    pub priority: &'static str,
    pub priority_class: &'static str,
    pub due: String,
    pub due_label: String,
    pub status_class: &'static str,
    pub done: bool,
}

impl TaskRow {
    pub fn new(task: &Task, today: NaiveDate) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            tag: task.tag.clone(),
            priority: task.priority.as_str(),
            priority_class: task.priority.css_class(),
            due: task.due_date.map(format_due_date).unwrap_or_default(),
            due_label: match task.due_date {
                Some(due) if !task.done => relative_due_label(due, today),
                Some(_) => String::new(),
                None => "no due date".to_string(),
            },
            status_class: DueStatus::classify(task, today).css_class(),
            done: task.done,
        }
    }
}

pub struct PriorityOption {
    pub value: &'static str,
    pub selected: bool,
}

pub struct TagLink {
    pub name: String,
    pub active: bool,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub chrome: Chrome,
    pub counts: Counts,
    pub upcoming: Vec<TaskRow>,
}

impl DashboardPage {
    pub fn new(snapshot: &Snapshot) -> Self {
        Self {
            chrome: Chrome::new(View::Dashboard, snapshot.today, None),
            counts: snapshot.counts,
            upcoming: snapshot
                .upcoming
                .iter()
                .map(|t| TaskRow::new(t, snapshot.today))
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "tasks.html")]
pub struct TasksPage {
    pub chrome: Chrome,
    pub rows: Vec<TaskRow>,
    pub total: usize,
    pub tags: Vec<TagLink>,
    pub filter: Option<String>,
    pub priorities: Vec<PriorityOption>,
}

impl TasksPage {
    pub fn new(snapshot: &Snapshot, notice: Option<&Notice>) -> Self {
        let active_tag = snapshot.tag_filter.as_deref().unwrap_or_default();
        Self {
            chrome: Chrome::new(View::Tasks, snapshot.today, notice),
            rows: snapshot
                .visible
                .iter()
                .map(|t| TaskRow::new(t, snapshot.today))
                .collect(),
            total: snapshot.tasks.len(),
            tags: snapshot
                .tags
                .iter()
                .map(|name| TagLink {
                    active: name.eq_ignore_ascii_case(active_tag),
                    name: name.clone(),
                })
                .collect(),
            filter: snapshot.tag_filter.clone(),
            priorities: Priority::ALL
                .into_iter()
                .map(|p| PriorityOption {
                    value: p.as_str(),
                    selected: p == Priority::default(),
                })
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "anki.html")]
pub struct AnkiPage {
    pub chrome: Chrome,
    pub notes: String,
}

impl AnkiPage {
    pub fn new(today: NaiveDate, notes: String, notice: Option<&Notice>) -> Self {
        Self {
            chrome: Chrome::new(View::Anki, today, notice),
            notes,
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub message: String,
}
