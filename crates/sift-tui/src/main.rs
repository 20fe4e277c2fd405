//! `sift`: pick one user from a remote directory in the terminal.
//!
//! Hosts a single search-select widget. On confirm, the selected user's id
//! (the widget's output field) is printed to stdout so shell scripts can
//! consume it.
//!
//! # Usage
//!
//! ```
//! sift --url http://localhost:8080 --session-cookie <token>
//! sift --config ~/.config/sift/config.toml
//! ```

mod app;
mod ui;

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::{
  event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
  },
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use sift_client::{Credentials, Driver, HttpLookup};
use sift_core::{SearchSelect, WidgetConfig};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "sift", about = "Search a user directory and pick one")]
struct Args {
  /// Path to a TOML config file (url, credentials, [widget] table).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the lookup server (default: http://localhost:8080).
  #[arg(long, env = "SIFT_URL")]
  url: Option<String>,

  /// HTTP Basic username.
  #[arg(long, env = "SIFT_USER")]
  user: Option<String>,

  /// HTTP Basic password (plaintext).
  #[arg(long, env = "SIFT_PASSWORD")]
  password: Option<String>,

  /// Session token sent as the `session` cookie.
  #[arg(long, env = "SIFT_SESSION")]
  session_cookie: Option<String>,

  /// Anti-forgery token sent as `X-CSRF-Token`.
  #[arg(long, env = "SIFT_CSRF_TOKEN")]
  csrf_token: Option<String>,

  /// Append tracing output to this file.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:            String,
  #[serde(default)]
  username:       String,
  #[serde(default)]
  password:       String,
  session_cookie: Option<String>,
  csrf_token:     Option<String>,
  #[serde(default)]
  widget:         WidgetConfig,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  init_tracing(args.log_file.as_deref())?;

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| "http://localhost:8080".to_string());
  let credentials = Credentials {
    username:       args
      .user
      .or_else(|| (!file_cfg.username.is_empty()).then(|| file_cfg.username.clone()))
      .unwrap_or_default(),
    password:       args
      .password
      .or_else(|| (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone()))
      .unwrap_or_default(),
    session_cookie: args.session_cookie.or(file_cfg.session_cookie),
    csrf_token:     args.csrf_token.or(file_cfg.csrf_token),
  };

  let widget_cfg = file_cfg.widget;
  let lookup = HttpLookup::new(&base_url, &widget_cfg, credentials)
    .context("configuring lookup client")?;
  tracing::info!(url = %lookup.url(), "lookup endpoint configured");
  let (handle, _driver) = Driver::spawn(SearchSelect::new(widget_cfg), Arc::new(lookup));
  let mut app = App::new(handle);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)
    .context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  app.focus().await?;
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(
    terminal.backend_mut(),
    LeaveAlternateScreen,
    DisableMouseCapture,
    DisableFocusChange
  )
  .ok();
  terminal.show_cursor().ok();

  run_result?;
  if let Some(id) = &app.committed {
    println!("{id}");
  }
  Ok(())
}

fn init_tracing(path: Option<&Path>) -> Result<()> {
  // Stderr would draw over the alternate screen; only log to a file.
  let Some(path) = path else { return Ok(()) };
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;
  tracing_subscriber::fmt()
    .with_writer(Arc::new(file))
    .with_ansi(false)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.refresh();
    let mut hits = ui::HitMap::default();
    terminal
      .draw(|f| hits = ui::draw(f, app))
      .context("drawing frame")?;
    app.hits = hits;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    match maybe_event {
      Some(Event::Key(key)) => {
        if !app.handle_key(key).await? {
          break;
        }
      }
      Some(Event::Mouse(mouse)) => app.handle_mouse(mouse).await?,
      Some(Event::FocusLost) => app.blur().await?,
      Some(Event::FocusGained) => app.focus().await?,
      // Resize: the next iteration redraws.
      _ => {}
    }
  }

  Ok(())
}
