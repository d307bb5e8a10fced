use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info, warn};

use crate::datetime::{format_created_at, format_due_date, local_now, parse_created_at, parse_due_date};
use crate::task::{NewTask, Priority, Task};

pub const DEFAULT_DB_FILE: &str = "med_helper.db";

const SCHEMA_TASKS: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    due_date TEXT,
    tag TEXT,
    priority TEXT,
    done INTEGER DEFAULT 0,
    created_at TEXT
)";
const INSERT_TASK: &str =
    "INSERT INTO tasks (title, due_date, tag, priority, created_at) VALUES (?1, ?2, ?3, ?4, ?5)";
const SELECT_TASKS: &str = "SELECT id, title, due_date, tag, priority, done, created_at FROM tasks";
const UPDATE_DONE: &str = "UPDATE tasks SET done = ?1 WHERE id = ?2";
const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?1";

/// Persists tasks in a single SQLite file.
///
/// Each operation opens its own connection and commits on its own, so a
/// returned `Ok` means the change is on disk. Two processes sharing one file
/// are not coordinated beyond SQLite's own file locking.
#[derive(Debug, Clone)]
pub struct TaskStore {
    db_path: PathBuf,
}

struct RawTask {
    id: i64,
    title: Option<String>,
    due_date: Option<String>,
    tag: Option<String>,
    priority: Option<String>,
    done: Option<i64>,
    created_at: Option<String>,
}

impl RawTask {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            due_date: row.get(2)?,
            tag: row.get(3)?,
            priority: row.get(4)?,
            done: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn into_task(self) -> Task {
        let priority = match self.priority.as_deref() {
            Some(raw) => raw.parse::<Priority>().unwrap_or_else(|err| {
                warn!(id = self.id, error = %err, "unknown stored priority, reading as Medium");
                Priority::Medium
            }),
            None => Priority::default(),
        };
        let created_at = self.created_at.as_deref().and_then(|raw| {
            parse_created_at(raw)
                .inspect_err(|err| warn!(id = self.id, error = %err, "unreadable created_at, leaving it empty"))
                .ok()
        });

        Task {
            id: self.id,
            title: self.title.unwrap_or_default(),
            due_date: self.due_date.as_deref().and_then(parse_due_date),
            tag: self.tag.unwrap_or_default(),
            priority,
            done: self.done.unwrap_or(0) != 0,
            created_at,
        }
    }
}

impl TaskStore {
    /// Opens the store at `db_path`, creating the file and table when absent.
    #[tracing::instrument(skip(db_path), fields(db = %db_path.display()))]
    pub fn open(db_path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let store = Self {
            db_path: db_path.to_path_buf(),
        };
        store.initialize()?;

        info!(db = %store.db_path.display(), "opened task store");
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Creates the `tasks` table if it does not exist yet. Safe to call on
    /// every start.
    #[tracing::instrument(skip(self))]
    pub fn initialize(&self) -> anyhow::Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(SCHEMA_TASKS)
            .with_context(|| format!("failed to create schema in {}", self.db_path.display()))?;
        Ok(())
    }

    #[tracing::instrument(skip(self, task), fields(title_len = task.title.len(), priority = %task.priority))]
    pub fn add_task(&self, task: &NewTask) -> anyhow::Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            INSERT_TASK,
            params![
                task.title,
                task.due_date.map(format_due_date),
                task.tag,
                task.priority.as_str(),
                format_created_at(local_now()),
            ],
        )
        .context("failed to insert task")?;

        let id = conn.last_insert_rowid();
        debug!(id, "inserted task");
        Ok(id)
    }

    /// All tasks: open before done, then by due date with undated tasks last,
    /// then by id.
    #[tracing::instrument(skip(self))]
    pub fn list_tasks(&self) -> anyhow::Result<Vec<Task>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(SELECT_TASKS).context("failed to prepare task query")?;
        let rows = stmt
            .query_map([], RawTask::from_row)
            .context("failed to query tasks")?;

        let mut tasks = Vec::new();
        for row in rows {
            let raw = row.context("failed to read task row")?;
            tasks.push(raw.into_task());
        }
        sort_for_listing(&mut tasks);

        debug!(count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    #[tracing::instrument(skip(self))]
    pub fn get_task(&self, id: i64) -> anyhow::Result<Option<Task>> {
        let conn = self.connect()?;
        let raw = conn
            .query_row(&format!("{SELECT_TASKS} WHERE id = ?1"), params![id], RawTask::from_row)
            .optional()
            .with_context(|| format!("failed to load task {id}"))?;
        Ok(raw.map(RawTask::into_task))
    }

    /// Sets the completion flag. An unknown id is not an error; the return
    /// value tells whether a row was touched.
    #[tracing::instrument(skip(self))]
    pub fn set_done(&self, id: i64, value: bool) -> anyhow::Result<bool> {
        let conn = self.connect()?;
        let changed = conn
            .execute(UPDATE_DONE, params![i64::from(value), id])
            .with_context(|| format!("failed to update task {id}"))?;
        if changed == 0 {
            debug!(id, "set_done on missing task ignored");
        }
        Ok(changed > 0)
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_task(&self, id: i64) -> anyhow::Result<bool> {
        let conn = self.connect()?;
        let removed = conn
            .execute(DELETE_TASK, params![id])
            .with_context(|| format!("failed to delete task {id}"))?;
        if removed == 0 {
            debug!(id, "delete on missing task ignored");
        }
        Ok(removed > 0)
    }

    fn connect(&self) -> anyhow::Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("failed to open database {}", self.db_path.display()))
    }
}

fn sort_for_listing(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| (t.done, t.due_date.is_none(), t.due_date, t.id));
}
