pub mod error;
pub mod handlers;
pub mod state;
pub mod templates;

use std::ffi::OsString;

use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/tasks", get(handlers::tasks_page).post(handlers::add_task))
        .route("/tasks/{id}/done", post(handlers::toggle_task))
        .route("/tasks/{id}/delete", post(handlers::delete_task))
        .route("/anki", get(handlers::anki_page).post(handlers::generate_cards))
        .route("/view/{slug}", get(handlers::select_view))
        .route("/static/app.css", get(handlers::stylesheet))
        .route("/healthz", get(handlers::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tracing::instrument(skip_all)]
pub async fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let launch = medhelper_core::prepare(raw_args)?;
    let state = AppState::new(launch.controller);

    let listener = tokio::net::TcpListener::bind(launch.bind)
        .await
        .with_context(|| format!("failed to bind {}", launch.bind))?;
    info!(addr = %launch.bind, "serving med helper at http://{}", launch.bind);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("http server failed")?;

    info!("done");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(error) => {
            error!(%error, "failed to register SIGTERM handler; falling back to ctrl_c");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
    warn!("received shutdown signal; stopping server");
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed waiting for ctrl_c signal");
    }
    warn!("received shutdown signal; stopping server");
}
