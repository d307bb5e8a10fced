//! Page state and the actions that change it.
//!
//! Every mutation runs against the store, then re-reads the whole task list
//! and recomputes the derived values before anything is rendered.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::anki::AnkiHelper;
use crate::datetime::parse_due_input;
use crate::store::TaskStore;
use crate::task::{NewTask, Priority, Task};
use crate::view::{self, Counts};

pub const DEFAULT_UPCOMING_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Tasks,
    Anki,
}

impl View {
    pub const ALL: [View; 3] = [View::Dashboard, View::Tasks, View::Anki];

    pub fn label(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Tasks => "Deadlines & Tasks",
            View::Anki => "Anki Helper",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::Tasks => "tasks",
            View::Anki => "anki",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            View::Dashboard => "/",
            View::Tasks => "/tasks",
            View::Anki => "/anki",
        }
    }

    /// Unknown slugs fall back to the dashboard.
    pub fn from_slug(slug: &str) -> Self {
        View::ALL
            .into_iter()
            .find(|v| v.slug().eq_ignore_ascii_case(slug.trim()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Info(String),
    Warning(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(msg) | Notice::Info(msg) | Notice::Warning(msg) => msg,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Notice::Success(_) => "notice-success",
            Notice::Info(_) => "notice-info",
            Notice::Warning(_) => "notice-warning",
        }
    }
}

/// Raw add-task form fields as submitted by the page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddTaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub priority: String,
}

impl AddTaskForm {
    pub fn validate(&self) -> Result<NewTask, Notice> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Notice::Warning("Task title is required".to_string()));
        }

        let priority = if self.priority.trim().is_empty() {
            Priority::default()
        } else {
            self.priority
                .parse::<Priority>()
                .map_err(|err| Notice::Warning(format!("{err}")))?
        };

        let due_date = parse_due_input(&self.due_date).map_err(|err| Notice::Warning(format!("{err}")))?;

        Ok(NewTask {
            title: title.to_string(),
            due_date,
            tag: self.tag.trim().to_string(),
            priority,
        })
    }
}

/// Everything a page needs, recomputed from a fresh read of the store.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub today: NaiveDate,
    pub tasks: Vec<Task>,
    pub visible: Vec<Task>,
    pub tag_filter: Option<String>,
    pub counts: Counts,
    pub upcoming: Vec<Task>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub snapshot: Snapshot,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone)]
pub struct PageController {
    store: TaskStore,
    anki: AnkiHelper,
    upcoming_limit: usize,
}

impl PageController {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store,
            anki: AnkiHelper::new(),
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
        }
    }

    pub fn with_upcoming_limit(mut self, limit: usize) -> Self {
        self.upcoming_limit = limit;
        self
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    #[tracing::instrument(skip(self))]
    pub fn snapshot(&self, today: NaiveDate, tag_filter: Option<&str>) -> anyhow::Result<Snapshot> {
        let tasks = self.store.list_tasks()?;
        let tag_filter = tag_filter
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string);

        let visible = match tag_filter.as_deref() {
            Some(tag) => view::with_tag(&tasks, tag),
            None => tasks.clone(),
        };

        debug!(total = tasks.len(), visible = visible.len(), "snapshot rebuilt");
        Ok(Snapshot {
            today,
            counts: view::counts(&tasks, today),
            upcoming: view::upcoming(&tasks, self.upcoming_limit),
            tags: view::tags(&tasks),
            visible,
            tag_filter,
            tasks,
        })
    }

    #[tracing::instrument(skip(self, form), fields(title_len = form.title.len()))]
    pub fn add_task(
        &self,
        form: &AddTaskForm,
        today: NaiveDate,
        tag_filter: Option<&str>,
    ) -> anyhow::Result<Outcome> {
        let notice = match form.validate() {
            Ok(new_task) => {
                let id = self.store.add_task(&new_task)?;
                info!(id, "task added");
                Notice::Success("Task added".to_string())
            }
            Err(notice) => {
                warn!(reason = notice.message(), "add task rejected");
                notice
            }
        };

        Ok(Outcome {
            snapshot: self.snapshot(today, tag_filter)?,
            notice: Some(notice),
        })
    }

    /// Writes the flag only when `checked` differs from what is stored.
    #[tracing::instrument(skip(self))]
    pub fn toggle(
        &self,
        id: i64,
        checked: bool,
        today: NaiveDate,
        tag_filter: Option<&str>,
    ) -> anyhow::Result<Outcome> {
        match self.store.get_task(id)? {
            Some(task) if task.done != checked => {
                self.store.set_done(id, checked)?;
                info!(id, done = checked, "task completion changed");
            }
            Some(_) => debug!(id, "completion unchanged"),
            None => debug!(id, "toggle on missing task ignored"),
        }

        Ok(Outcome {
            snapshot: self.snapshot(today, tag_filter)?,
            notice: None,
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn delete(&self, id: i64, today: NaiveDate, tag_filter: Option<&str>) -> anyhow::Result<Outcome> {
        let removed = self.store.delete_task(id)?;
        let notice = removed.then(|| {
            info!(id, "task deleted");
            Notice::Info("Task deleted".to_string())
        });

        Ok(Outcome {
            snapshot: self.snapshot(today, tag_filter)?,
            notice,
        })
    }

    pub fn generate_cards(&self, notes: &str) -> Notice {
        match self.anki.acknowledge(notes) {
            Some(receipt) => Notice::Success(receipt.message()),
            None => Notice::Warning("Paste some notes first".to_string()),
        }
    }
}
