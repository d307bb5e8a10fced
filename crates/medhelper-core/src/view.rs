//! Dashboard aggregates and filtered views derived from a task list and a
//! reference date. Nothing here touches storage.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};

use crate::task::Task;

/// Horizon, in days, for the "due soon" counter.
pub const DUE_SOON_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub open: usize,
    pub due_soon: usize,
    pub overdue: usize,
    pub completed: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.open + self.completed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Done,
    Overdue,
    DueSoon,
    Later,
    NoDate,
}

impl DueStatus {
    pub fn classify(task: &Task, today: NaiveDate) -> Self {
        if task.done {
            return DueStatus::Done;
        }
        match task.due_date {
            None => DueStatus::NoDate,
            Some(due) if due < today => DueStatus::Overdue,
            Some(due) if due <= horizon(today, DUE_SOON_DAYS) => DueStatus::DueSoon,
            Some(_) => DueStatus::Later,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            DueStatus::Done => "task-done",
            DueStatus::Overdue => "task-overdue",
            DueStatus::DueSoon => "task-soon",
            DueStatus::Later => "task-later",
            DueStatus::NoDate => "task-nodate",
        }
    }
}

pub fn open_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|t| !t.done).collect()
}

pub fn done_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|t| t.done).collect()
}

/// Open tasks due between `today` and `today + days`, both inclusive.
/// Overdue and undated tasks are not counted.
pub fn due_within(open: &[&Task], today: NaiveDate, days: u64) -> usize {
    let limit = horizon(today, days);
    open.iter()
        .filter(|t| t.due_date.is_some_and(|due| today <= due && due <= limit))
        .count()
}

pub fn overdue(open: &[&Task], today: NaiveDate) -> usize {
    open.iter()
        .filter(|t| t.due_date.is_some_and(|due| due < today))
        .count()
}

pub fn counts(tasks: &[Task], today: NaiveDate) -> Counts {
    let open = open_tasks(tasks);
    Counts {
        open: open.len(),
        due_soon: due_within(&open, today, DUE_SOON_DAYS),
        overdue: overdue(&open, today),
        completed: done_tasks(tasks).len(),
    }
}

/// Open, dated tasks in due order, at most `limit` of them.
pub fn upcoming(tasks: &[Task], limit: usize) -> Vec<Task> {
    let mut dated: Vec<&Task> = tasks
        .iter()
        .filter(|t| !t.done && t.due_date.is_some())
        .collect();
    dated.sort_by_key(|t| (t.due_date, t.id));
    dated.into_iter().take(limit).cloned().collect()
}

/// Distinct non-empty tags, sorted. Tags differing only in case collapse
/// into the first spelling seen.
pub fn tags(tasks: &[Task]) -> Vec<String> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for tag in tasks.iter().map(|t| t.tag.trim()).filter(|tag| !tag.is_empty()) {
        seen.entry(tag.to_ascii_lowercase()).or_insert(tag);
    }
    seen.into_values().map(str::to_string).collect()
}

pub fn with_tag(tasks: &[Task], tag: &str) -> Vec<Task> {
    if tag.trim().is_empty() {
        return tasks.to_vec();
    }
    tasks.iter().filter(|t| t.has_tag(tag)).cloned().collect()
}

fn horizon(today: NaiveDate, days: u64) -> NaiveDate {
    today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}
