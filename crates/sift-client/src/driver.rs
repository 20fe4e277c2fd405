//! Async host for one [`SearchSelect`] instance.
//!
//! The driver task is the only owner of the widget. Hosts talk to it through
//! a [`Handle`]: commands go in over an mpsc channel, rendered [`View`]s come
//! out over a `watch` channel and [`Notification`]s over a `broadcast`
//! channel.
//!
//! Lookups run on their own tasks and report back into the driver loop
//! tagged with their [`Ticket`]; the widget drops any outcome whose
//! generation is no longer current. Requests are never aborted, only
//! ignored.

use std::{sync::Arc, time::Duration};

use sift_core::{
  CandidateRecord, InputOutcome, Lookup, LookupError, Notification, SearchSelect, Ticket, View,
};
use tokio::{
  sync::{broadcast, mpsc, watch},
  task::JoinHandle,
  time::{Instant, Sleep, sleep_until},
};
use tracing::{debug, warn};

use crate::{Error, Result};

type Outcome = (Ticket, Result<Vec<CandidateRecord>, LookupError>);

// ─── Commands ────────────────────────────────────────────────────────────────

/// Events a host forwards to its widget.
#[derive(Debug, Clone)]
pub enum Command {
  /// The text field now holds this string.
  Input(String),
  Focus,
  /// Focus left the widget subtree.
  Blur,
  /// A pointer interaction landed outside the widget.
  PointerOutside,
  MoveHighlight(isize),
  SelectHighlighted,
  SelectIndex(usize),
  Select(CandidateRecord),
  Clear,
  /// Hide the result list, keeping input and selection.
  Escape,
}

// ─── Handle ──────────────────────────────────────────────────────────────────

/// Host-side handle to a running driver. Cloneable; the driver stops once
/// every handle is dropped.
#[derive(Clone)]
pub struct Handle {
  commands:      mpsc::Sender<Command>,
  view:          watch::Receiver<View>,
  notifications: broadcast::Sender<Notification>,
}

impl Handle {
  pub async fn send(&self, command: Command) -> Result<()> {
    self
      .commands
      .send(command)
      .await
      .map_err(|_| Error::DriverClosed)
  }

  pub async fn input(&self, text: impl Into<String>) -> Result<()> {
    self.send(Command::Input(text.into())).await
  }

  pub async fn select(&self, record: CandidateRecord) -> Result<()> {
    self.send(Command::Select(record)).await
  }

  pub async fn clear(&self) -> Result<()> { self.send(Command::Clear).await }

  /// The most recently published view.
  pub fn view(&self) -> View { self.view.borrow().clone() }

  /// Wait for the next view change.
  pub async fn changed(&mut self) -> Result<View> {
    self.view.changed().await.map_err(|_| Error::DriverClosed)?;
    Ok(self.view.borrow_and_update().clone())
  }

  /// Subscribe to `Selected` / `Cleared` notifications.
  pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
    self.notifications.subscribe()
  }
}

// ─── Driver ──────────────────────────────────────────────────────────────────

pub struct Driver<L> {
  widget:         SearchSelect,
  lookup:         Arc<L>,
  commands:       mpsc::Receiver<Command>,
  outcomes_tx:    mpsc::UnboundedSender<Outcome>,
  outcomes_rx:    mpsc::UnboundedReceiver<Outcome>,
  /// Armed debounce timer and the cycle it belongs to.
  debounce:       Option<(Instant, Ticket)>,
  blur_deadline:  Option<Instant>,
  view:           watch::Sender<View>,
  notifications:  broadcast::Sender<Notification>,
}

impl<L> Driver<L>
where
  L: Lookup + 'static,
{
  /// Start a driver task for `widget` and return its handle.
  pub fn spawn(widget: SearchSelect, lookup: Arc<L>) -> (Handle, JoinHandle<()>) {
    let (commands_tx, commands) = mpsc::channel(64);
    let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
    let (view, view_rx) = watch::channel(widget.render());
    let (notifications, _) = broadcast::channel(16);

    let handle = Handle {
      commands:      commands_tx,
      view:          view_rx,
      notifications: notifications.clone(),
    };
    let driver = Self {
      widget,
      lookup,
      commands,
      outcomes_tx,
      outcomes_rx,
      debounce: None,
      blur_deadline: None,
      view,
      notifications,
    };
    (handle, tokio::spawn(driver.run()))
  }

  async fn run(mut self) {
    loop {
      let debounce_at = self.debounce.as_ref().map(|(at, _)| *at);
      let blur_at = self.blur_deadline;

      tokio::select! {
        cmd = self.commands.recv() => match cmd {
          Some(cmd) => self.handle(cmd),
          None => break,
        },
        Some((ticket, outcome)) = self.outcomes_rx.recv() => {
          self.widget.complete(&ticket, outcome);
        }
        () = sleep_until_opt(debounce_at), if debounce_at.is_some() => self.fire_debounce(),
        () = sleep_until_opt(blur_at), if blur_at.is_some() => self.blur_expired(),
      }

      self.publish();
    }
    debug!("search-select driver stopped");
  }

  fn handle(&mut self, command: Command) {
    match command {
      Command::Input(text) => match self.widget.on_input(&text) {
        InputOutcome::Cleared => self.debounce = None,
        InputOutcome::Scheduled(ticket) => {
          let at = Instant::now() + self.widget.config().debounce();
          self.debounce = Some((at, ticket));
        }
      },
      Command::Focus => {
        self.blur_deadline = None;
        self.widget.focus();
      }
      Command::Blur => {
        self.widget.blur();
        self.blur_deadline = Some(Instant::now() + self.widget.config().blur_grace());
      }
      Command::PointerOutside => {
        self.blur_deadline = None;
        self.widget.pointer_outside();
      }
      Command::MoveHighlight(delta) => self.widget.move_highlight(delta),
      Command::SelectHighlighted => {
        let note = self.widget.select_highlighted();
        self.after_pick(note);
      }
      Command::SelectIndex(index) => {
        let note = self.widget.select_index(index);
        self.after_pick(note);
      }
      Command::Select(record) => {
        let note = self.widget.select(record);
        self.after_pick(Some(note));
      }
      Command::Clear => {
        let note = self.widget.clear();
        self.after_pick(Some(note));
      }
      Command::Escape => self.widget.dismiss(),
    }
  }

  fn after_pick(&mut self, note: Option<Notification>) {
    let Some(note) = note else { return };
    self.debounce = None;
    debug!(?note, "search-select notification");
    // No subscribers is fine.
    let _ = self.notifications.send(note);
  }

  fn fire_debounce(&mut self) {
    let Some((_, ticket)) = self.debounce.take() else { return };
    if !self.widget.begin_search(&ticket) {
      return;
    }

    let lookup = Arc::clone(&self.lookup);
    let tx = self.outcomes_tx.clone();
    let limit = self.widget.config().request_timeout();
    tokio::spawn(async move {
      let outcome = tokio::time::timeout(limit, lookup.lookup(&ticket.query))
        .await
        .unwrap_or(Err(LookupError::Timeout));
      if let Err(e) = &outcome {
        warn!(query = %ticket.query, error = %e, "lookup failed");
      }
      // The driver may have stopped; nothing left to update then.
      let _ = tx.send((ticket, outcome));
    });
  }

  fn blur_expired(&mut self) {
    self.blur_deadline = None;
    if !self.widget.is_focused() {
      self.widget.dismiss();
    }
  }

  fn publish(&self) {
    let next = self.widget.render();
    self.view.send_if_modified(|current| {
      if *current == next {
        return false;
      }
      *current = next;
      true
    });
  }
}

fn sleep_until_opt(at: Option<Instant>) -> Sleep {
  // Disabled branches still build their future; park it far away.
  sleep_until(at.unwrap_or_else(|| Instant::now() + Duration::from_secs(86_400)))
}
