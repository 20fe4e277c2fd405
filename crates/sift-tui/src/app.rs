//! Host-page state: owns the text field buffer and forwards terminal events
//! to the widget driver.

use crossterm::event::{
  KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Position;
use sift_client::{Command, Handle};
use sift_core::{Notification, View};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::ui::HitMap;

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Handle to the search-select driver.
  pub handle:     Handle,

  /// Last view published by the driver.
  pub view:       View,

  /// Text field contents. Emptied as soon as a pick or clear is sent, matching
  /// what the widget does with its own input.
  pub input:      String,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Screen regions from the last frame, for mouse hit-testing.
  pub hits:       HitMap,

  /// Output-field value confirmed with Enter; printed on exit.
  pub committed:  Option<String>,

  notes:          broadcast::Receiver<Notification>,
}

impl App {
  pub fn new(handle: Handle) -> Self {
    let notes = handle.subscribe();
    let view = handle.view();
    Self {
      handle,
      view,
      input: String::new(),
      status_msg: String::new(),
      hits: HitMap::default(),
      committed: None,
      notes,
    }
  }

  /// Pull the latest view and react to widget notifications.
  pub fn refresh(&mut self) {
    self.view = self.handle.view();
    loop {
      match self.notes.try_recv() {
        Ok(Notification::Selected(record)) => {
          self.status_msg = format!("Selected #{} {}", record.id, record.display_name());
        }
        Ok(Notification::Cleared) => {
          self.status_msg = "Selection cleared".into();
        }
        Err(TryRecvError::Lagged(_)) => continue,
        Err(TryRecvError::Empty | TryRecvError::Closed) => break,
      }
    }
  }

  pub async fn focus(&mut self) -> anyhow::Result<()> {
    self.handle.send(Command::Focus).await?;
    Ok(())
  }

  pub async fn blur(&mut self) -> anyhow::Result<()> {
    self.handle.send(Command::Blur).await?;
    Ok(())
  }

  /// Send a command that ends the current search and empties the input.
  async fn pick(&mut self, command: Command) -> anyhow::Result<()> {
    self.input.clear();
    self.handle.send(command).await?;
    Ok(())
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.kind == KeyEventKind::Release {
      return Ok(true);
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
      match key.code {
        KeyCode::Char('c') => return Ok(false),
        KeyCode::Char('u') => self.pick(Command::Clear).await?,
        _ => {}
      }
      return Ok(true);
    }

    match key.code {
      KeyCode::Esc if self.view.panel.is_some() => {
        self.handle.send(Command::Escape).await?;
      }
      KeyCode::Esc => return Ok(false),

      KeyCode::Enter if !self.view.items().is_empty() => {
        let cmd = if self.view.items().iter().any(|i| i.highlighted) {
          Command::SelectHighlighted
        } else {
          Command::SelectIndex(0)
        };
        self.pick(cmd).await?;
      }
      KeyCode::Enter if !self.view.output.is_empty() => {
        self.committed = Some(self.view.output.clone());
        return Ok(false);
      }

      KeyCode::Down => self.handle.send(Command::MoveHighlight(1)).await?,
      KeyCode::Up => self.handle.send(Command::MoveHighlight(-1)).await?,

      KeyCode::Tab => {
        let cmd = if self.view.input.focused { Command::Blur } else { Command::Focus };
        self.handle.send(cmd).await?;
      }

      KeyCode::Backspace => {
        self.input.pop();
        self.handle.input(self.input.clone()).await?;
      }
      KeyCode::Char(c) => {
        if !self.view.input.focused {
          self.handle.send(Command::Focus).await?;
        }
        self.input.push(c);
        self.handle.input(self.input.clone()).await?;
      }

      _ => {}
    }
    Ok(true)
  }

  // ── Mouse handling ────────────────────────────────────────────────────────

  pub async fn handle_mouse(&mut self, mouse: MouseEvent) -> anyhow::Result<()> {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
      return Ok(());
    }
    let pos = Position::new(mouse.column, mouse.row);

    if let Some(index) = self.hits.items.iter().position(|r| r.contains(pos)) {
      return self.pick(Command::SelectIndex(index)).await;
    }
    let cmd = if self.hits.widget.contains(pos) {
      Command::Focus
    } else {
      Command::PointerOutside
    };
    self.handle.send(cmd).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::{sync::Arc, time::Duration};

  use crossterm::event::KeyEventState;
  use ratatui::layout::Rect;
  use sift_client::Driver;
  use sift_core::{
    CandidateRecord, Lookup, LookupError, RecordId, SearchSelect, WidgetConfig,
  };

  use super::*;

  struct OneUser;

  impl Lookup for OneUser {
    async fn lookup(&self, _query: &str) -> Result<Vec<CandidateRecord>, LookupError> {
      Ok(vec![CandidateRecord {
        id:           RecordId::Int(7),
        first_name:   "Ali".into(),
        last_name:    "Rezaei".into(),
        phone_number: "0912".into(),
        email:        None,
      }])
    }
  }

  fn app() -> App {
    let (handle, _) = Driver::spawn(SearchSelect::new(WidgetConfig::default()), Arc::new(OneUser));
    App::new(handle)
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent {
      code,
      modifiers: KeyModifiers::NONE,
      kind: KeyEventKind::Press,
      state: KeyEventState::NONE,
    }
  }

  async fn settle(app: &mut App) {
    tokio::time::sleep(Duration::from_secs(1)).await;
    app.refresh();
  }

  async fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
      assert!(app.handle_key(key(KeyCode::Char(c))).await.unwrap());
    }
  }

  #[tokio::test(start_paused = true)]
  async fn typing_then_enter_picks_first_result() {
    let mut app = app();
    type_text(&mut app, "al").await;
    settle(&mut app).await;
    assert_eq!(app.view.items().len(), 1);
    assert!(app.view.input.focused);

    assert!(app.handle_key(key(KeyCode::Enter)).await.unwrap());
    settle(&mut app).await;
    assert_eq!(app.view.output, "7");
    assert!(app.input.is_empty());
    assert_eq!(app.status_msg, "Selected #7 Ali Rezaei");

    // Second Enter confirms and quits.
    assert!(!app.handle_key(key(KeyCode::Enter)).await.unwrap());
    assert_eq!(app.committed.as_deref(), Some("7"));
  }

  #[tokio::test(start_paused = true)]
  async fn typing_right_after_a_pick_starts_fresh() {
    let mut app = app();
    type_text(&mut app, "al").await;
    settle(&mut app).await;

    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    // No refresh in between: the notification is still queued.
    type_text(&mut app, "s").await;
    assert_eq!(app.input, "s");

    settle(&mut app).await;
    assert_eq!(app.input, "s");
    assert_eq!(app.view.input.text, "s");
    assert_eq!(app.view.output, "7");
  }

  #[tokio::test(start_paused = true)]
  async fn escape_closes_panel_then_quits() {
    let mut app = app();
    type_text(&mut app, "al").await;
    settle(&mut app).await;
    assert!(app.handle_key(key(KeyCode::Esc)).await.unwrap());
    settle(&mut app).await;
    assert!(app.view.panel.is_none());
    assert!(!app.handle_key(key(KeyCode::Esc)).await.unwrap());
    assert!(app.committed.is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn ctrl_u_clears_selection() {
    let mut app = app();
    type_text(&mut app, "al").await;
    settle(&mut app).await;
    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    settle(&mut app).await;

    let ctrl_u = KeyEvent { modifiers: KeyModifiers::CONTROL, ..key(KeyCode::Char('u')) };
    assert!(app.handle_key(ctrl_u).await.unwrap());
    settle(&mut app).await;
    assert_eq!(app.view.output, "");
    assert!(app.view.summary.is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn click_outside_dismisses() {
    let mut app = app();
    type_text(&mut app, "al").await;
    settle(&mut app).await;
    app.hits = HitMap {
      widget: Rect::new(0, 0, 40, 10),
      items:  vec![Rect::new(1, 5, 38, 1)],
    };

    let click = |column, row| MouseEvent {
      kind: MouseEventKind::Down(MouseButton::Left),
      column,
      row,
      modifiers: KeyModifiers::NONE,
    };
    app.handle_mouse(click(60, 20)).await.unwrap();
    settle(&mut app).await;
    assert!(app.view.panel.is_none());

    app.handle_mouse(click(5, 1)).await.unwrap();
    settle(&mut app).await;
    assert!(app.view.panel.is_some(), "focusing re-opens the panel");

    app.handle_mouse(click(3, 5)).await.unwrap();
    settle(&mut app).await;
    assert_eq!(app.view.output, "7");
  }
}
