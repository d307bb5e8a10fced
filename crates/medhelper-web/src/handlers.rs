use askama::Template;
use axum::Form;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect};
use medhelper_core::page::{AddTaskForm, View};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::AppError;
use crate::state::AppState;
use crate::templates::{AnkiPage, DashboardPage, TasksPage};

const STYLESHEET: &str = include_str!("../static/app.css");

/// The active tag filter, carried on the list URL and on every form action.
#[derive(Debug, Default, Deserialize)]
pub struct TasksQuery {
    pub tag: Option<String>,
}

/// A checkbox only submits its field when checked.
#[derive(Debug, Default, Deserialize)]
pub struct ToggleForm {
    #[serde(default)]
    pub done: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnkiForm {
    #[serde(default)]
    pub notes: String,
}

fn render<T: Template>(page: &T) -> Result<Html<String>, AppError> {
    Ok(Html(page.render()?))
}

#[instrument(skip(state))]
pub async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let today = state.today();
    let snapshot = state.run(move |c| c.snapshot(today, None)).await?;
    render(&DashboardPage::new(&snapshot))
}

#[instrument(skip(state))]
pub async fn tasks_page(
    State(state): State<AppState>,
    Query(query): Query<TasksQuery>,
) -> Result<Html<String>, AppError> {
    let today = state.today();
    let snapshot = state
        .run(move |c| c.snapshot(today, query.tag.as_deref()))
        .await?;
    render(&TasksPage::new(&snapshot, None))
}

#[instrument(skip(state, form), fields(title_len = form.title.len()))]
pub async fn add_task(
    State(state): State<AppState>,
    Query(query): Query<TasksQuery>,
    Form(form): Form<AddTaskForm>,
) -> Result<Html<String>, AppError> {
    info!("add task requested");
    let today = state.today();
    let outcome = state
        .run(move |c| c.add_task(&form, today, query.tag.as_deref()))
        .await?;
    render(&TasksPage::new(&outcome.snapshot, outcome.notice.as_ref()))
}

#[instrument(skip(state, form))]
pub async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<TasksQuery>,
    Form(form): Form<ToggleForm>,
) -> Result<Html<String>, AppError> {
    let checked = form.done.is_some();
    info!(id, checked, "toggle requested");
    let today = state.today();
    let outcome = state
        .run(move |c| c.toggle(id, checked, today, query.tag.as_deref()))
        .await?;
    render(&TasksPage::new(&outcome.snapshot, outcome.notice.as_ref()))
}

#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<TasksQuery>,
) -> Result<Html<String>, AppError> {
    info!(id, "delete requested");
    let today = state.today();
    let outcome = state
        .run(move |c| c.delete(id, today, query.tag.as_deref()))
        .await?;
    render(&TasksPage::new(&outcome.snapshot, outcome.notice.as_ref()))
}

#[instrument(skip(state))]
pub async fn anki_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&AnkiPage::new(state.today(), String::new(), None))
}

#[instrument(skip(state, form), fields(notes_len = form.notes.len()))]
pub async fn generate_cards(
    State(state): State<AppState>,
    Form(form): Form<AnkiForm>,
) -> Result<Html<String>, AppError> {
    let notes = form.notes;
    let (notes, notice) = state
        .run(move |c| {
            let notice = c.generate_cards(&notes);
            Ok((notes, notice))
        })
        .await?;
    render(&AnkiPage::new(state.today(), notes, Some(&notice)))
}

/// Sidebar-style selection by name; unknown names land on the dashboard.
#[instrument]
pub async fn select_view(Path(slug): Path<String>) -> Redirect {
    Redirect::to(View::from_slug(&slug).path())
}

pub async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

pub async fn healthz() -> &'static str {
    "ok"
}
