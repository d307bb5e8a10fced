pub mod anki;
pub mod cli;
pub mod config;
pub mod datetime;
pub mod page;
pub mod store;
pub mod task;
pub mod view;

use std::ffi::OsString;
use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

/// Resolved startup settings for the
/// web front end.
#[derive(Debug)]
pub struct Launch {
  pub controller: page::PageController,
  pub bind:       SocketAddr
}

#[tracing::instrument(skip_all)]
pub fn prepare(
  raw_args: Vec<OsString>
) -> anyhow::Result<Launch> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting med helper"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  );
  debug!(files = ?cfg.loaded_files, "config resolved");

  let db_path = cli
    .db
    .unwrap_or_else(|| cfg.db_path());
  let bind = match cli.bind {
    | Some(addr) => addr,
    | None => cfg.bind_addr()?
  };

  let store =
    store::TaskStore::open(&db_path)
      .with_context(|| {
        format!(
          "failed to open task store \
           at {}",
          db_path.display()
        )
      })?;

  let controller =
    page::PageController::new(store)
      .with_upcoming_limit(
        cfg.upcoming_limit()?
      );

  Ok(Launch {
    controller,
    bind
  })
}
