//! parlor-api server binary.
//!
//! Serves the entry and user collections over HTTP from a local SQLite file,
//! standing in for the hosted mock API during development.
//!
//! Settings come from `config.toml` (or `--config <path>`), then `PARLOR_*`
//! environment variables, e.g. `PARLOR_PORT=8080`. Every setting has a
//! default, so the file is optional.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use parlor_api::ServerConfig;
use parlor_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Parlor mock REST backend")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

fn load_config(path: PathBuf) -> anyhow::Result<ServerConfig> {
  config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 5232)?
    .set_default("store_path", "parlor.db")?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("PARLOR"))
    .build()
    .context("failed to read configuration")?
    .try_deserialize()
    .context("invalid server configuration")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cfg = load_config(Cli::parse().config)?;

  let store_path = expand_tilde(&cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  info!(path = %store_path.display(), "store opened");

  let app = parlor_api::api_router(Arc::new(store)).layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", cfg.host, cfg.port);
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  info!("serving entries and users on http://{address}");

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  info!("server stopped");
  Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed the server runs
/// until killed.
async fn shutdown_signal() {
  match tokio::signal::ctrl_c().await {
    Ok(()) => info!("shutting down"),
    Err(e) => {
      warn!(error = %e, "cannot listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
