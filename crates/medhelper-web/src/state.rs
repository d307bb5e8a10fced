use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use medhelper_core::datetime::local_today;
use medhelper_core::page::PageController;
use parking_lot::Mutex;

/// Shared handler state. The controller sits behind one lock so each
/// action (store call plus reload) finishes before the next one starts.
#[derive(Clone)]
pub struct AppState {
    controller: Arc<Mutex<PageController>>,
    fixed_today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(controller: PageController) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            fixed_today: None,
        }
    }

    /// Pins "today" instead of reading the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(local_today)
    }

    /// Runs `f` against the controller on the blocking pool.
    pub async fn run<F, T>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&PageController) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let controller = Arc::clone(&self.controller);
        tokio::task::spawn_blocking(move || {
            let guard = controller.lock();
            f(&guard)
        })
        .await
        .context("controller task did not complete")?
    }
}
