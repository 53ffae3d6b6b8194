//! `parlor`: command-line front end for Parlor chat.
//!
//! # Usage
//!
//! ```
//! parlor --url http://localhost:5232 users
//! parlor --user 1 request john
//! parlor --user 2 accept amy
//! parlor --user 1 watch john
//! parlor --config ~/.config/parlor/config.toml contacts
//! ```

mod app;
mod print;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use parlor_client::{ClientConfig, HttpStore};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "parlor", about = "Contact requests and chat over a shared REST store")]
struct Args {
  /// Path to a TOML config file (url, user, entries_path, users_path,
  /// poll_secs).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the REST store (default: http://localhost:5232).
  #[arg(long, env = "PARLOR_URL")]
  url: Option<String>,

  /// Id of the user to act as.
  #[arg(long, env = "PARLOR_USER")]
  user: Option<String>,

  /// Collection holding requests and messages (default: entries).
  #[arg(long, value_name = "PATH")]
  entries_path: Option<String>,

  /// Collection holding users (default: users).
  #[arg(long, value_name = "PATH")]
  users_path: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List every user.
  Users,
  /// List accepted contacts and open requests.
  Contacts,
  /// Show the relationship with a user.
  Status { who: String },
  /// Send a chat request.
  Request { who: String },
  /// Accept a user's pending request.
  Accept { who: String },
  /// Decline a user's pending request.
  Decline { who: String },
  /// Withdraw your pending request to a user.
  Cancel { who: String },
  /// Send a message to an accepted contact.
  Send {
    who:  String,
    #[arg(required = true, num_args = 1..)]
    text: Vec<String>,
  },
  /// Print the conversation with a user.
  Log { who: String },
  /// Follow a conversation; each line typed on stdin is sent as a message.
  Watch {
    who:       String,
    /// Seconds between polls.
    #[arg(long, value_name = "SECS")]
    poll_secs: Option<u64>,
  },
  /// Edit your profile.
  Profile {
    #[arg(long)]
    name:  Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// Avatar URL; pass an empty string to remove it.
    #[arg(long)]
    image: Option<String>,
  },
  /// Create a new user.
  Register {
    #[arg(long)]
    name:  String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    image: Option<String>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  url:          Option<String>,
  user:         Option<String>,
  entries_path: Option<String>,
  users_path:   Option<String>,
  poll_secs:    Option<u64>,
}

/// Everything the commands need, after flags, file and defaults are merged.
#[derive(Debug)]
struct Settings {
  client: ClientConfig,
  user:   Option<String>,
  poll:   Duration,
}

/// CLI flags override the config file, which overrides defaults.
fn settings(args: &Args, file: ConfigFile) -> Settings {
  let defaults = ClientConfig::default();
  let poll_flag = match &args.command {
    Command::Watch { poll_secs, .. } => *poll_secs,
    _ => None,
  };
  Settings {
    client: ClientConfig {
      base_url: args.url.clone().or(file.url).unwrap_or(defaults.base_url),
      entries_path: args
        .entries_path
        .clone()
        .or(file.entries_path)
        .unwrap_or(defaults.entries_path),
      users_path: args
        .users_path
        .clone()
        .or(file.users_path)
        .unwrap_or(defaults.users_path),
      timeout: defaults.timeout,
    },
    user:   args.user.clone().or(file.user),
    poll:   Duration::from_secs(poll_flag.or(file.poll_secs).unwrap_or(5).max(1)),
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let settings = settings(&args, file_cfg);
  let store = HttpStore::new(settings.client).context("configuring the REST client")?;
  let app = App::new(store, settings.user, settings.poll);

  match args.command {
    Command::Users => app.users().await,
    Command::Contacts => app.contacts().await,
    Command::Status { who } => app.status(&who).await,
    Command::Request { who } => app.request(&who).await,
    Command::Accept { who } => app.accept(&who).await,
    Command::Decline { who } => app.decline(&who).await,
    Command::Cancel { who } => app.cancel(&who).await,
    Command::Send { who, text } => app.send(&who, &text.join(" ")).await,
    Command::Log { who } => app.log(&who).await,
    Command::Watch { who, .. } => app.watch(&who).await,
    Command::Profile { name, email, image } => app.profile(name, email, image).await,
    Command::Register { name, email, image } => app.register(name, email, image).await,
  }
}
