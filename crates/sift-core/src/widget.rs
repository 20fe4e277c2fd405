//! The SearchSelect state machine.
//!
//! [`SearchSelect`] is sans-IO: it never sleeps and never talks to the
//! network. A host feeds it events and acts on what it returns:
//!
//! 1. [`SearchSelect::on_input`] returns [`InputOutcome::Scheduled`] with a
//!    [`Ticket`]; the host arms a debounce timer for that ticket, replacing
//!    any earlier one.
//! 2. When the timer fires the host calls [`SearchSelect::begin_search`]. If
//!    it returns `true` the host runs the lookup for `ticket.query`.
//! 3. The host hands the outcome back via [`SearchSelect::complete`]. Outcomes
//!    for any generation other than the current one are discarded, so a slow
//!    response can never overwrite the results of a newer query.
//!
//! Every input, selection or clear starts a new generation.

use tracing::debug;

use crate::{
  config::WidgetConfig,
  error::LookupError,
  record::CandidateRecord,
  view::{InputView, ItemView, PanelView, SummaryView, View},
};

// ─── Events in and out ───────────────────────────────────────────────────────

/// Identifies one debounce cycle and the query it will send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
  pub generation: u64,
  pub query:      String,
}

/// What the host must do after [`SearchSelect::on_input`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
  /// Query too short: drop any pending debounce timer.
  Cleared,
  /// (Re)arm the debounce timer for this ticket.
  Scheduled(Ticket),
}

/// Whether a lookup outcome was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
  Applied,
  /// A newer cycle started after this request went out.
  Superseded,
}

/// Notifications for the host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
  Selected(CandidateRecord),
  Cleared,
}

/// Where the result panel is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
  Idle,
  Querying,
  Populated,
  Empty,
  Errored(LookupError),
}

// ─── Widget ──────────────────────────────────────────────────────────────────

/// One search-select instance. Owns its state exclusively.
#[derive(Debug, Clone)]
pub struct SearchSelect {
  config:     WidgetConfig,
  input:      String,
  query:      Option<String>,
  generation: u64,
  /// Generation whose debounce timer is armed.
  pending:    Option<u64>,
  /// Generation whose request is outstanding. Only ever the current one.
  in_flight:  Option<u64>,
  results:    Vec<CandidateRecord>,
  phase:      Phase,
  panel_open: bool,
  /// Set once focus leaves or the list is dismissed; a debounce firing after
  /// that must not reopen the list.
  dismissed:  bool,
  focused:    bool,
  highlight:  Option<usize>,
  selection:  Option<CandidateRecord>,
}

impl SearchSelect {
  pub fn new(config: WidgetConfig) -> Self {
    Self {
      config,
      input: String::new(),
      query: None,
      generation: 0,
      pending: None,
      in_flight: None,
      results: Vec::new(),
      phase: Phase::Idle,
      panel_open: false,
      dismissed: false,
      focused: false,
      highlight: None,
      selection: None,
    }
  }

  // ── Accessors ─────────────────────────────────────────────────────────────

  pub fn config(&self) -> &WidgetConfig { &self.config }

  pub fn input(&self) -> &str { &self.input }

  pub fn query(&self) -> Option<&str> { self.query.as_deref() }

  pub fn phase(&self) -> &Phase { &self.phase }

  pub fn results(&self) -> &[CandidateRecord] { &self.results }

  pub fn selection(&self) -> Option<&CandidateRecord> { self.selection.as_ref() }

  pub fn highlight(&self) -> Option<usize> { self.highlight }

  pub fn is_focused(&self) -> bool { self.focused }

  pub fn is_panel_open(&self) -> bool { self.panel_open }

  /// True only while the request of the current cycle is outstanding.
  pub fn is_loading(&self) -> bool {
    self.in_flight == Some(self.generation)
  }

  /// Value of the bound output field: the selected id, or `""`.
  pub fn output_value(&self) -> String {
    self
      .selection
      .as_ref()
      .map(|r| r.id.to_string())
      .unwrap_or_default()
  }

  // ── Input & search ────────────────────────────────────────────────────────

  /// The text field changed.
  pub fn on_input(&mut self, text: &str) -> InputOutcome {
    self.input = text.to_owned();
    self.generation += 1;
    self.in_flight = None;
    self.dismissed = false;

    let trimmed = text.trim();
    if trimmed.chars().count() < self.config.min_search_length {
      self.pending = None;
      self.query = None;
      self.reset_results();
      return InputOutcome::Cleared;
    }

    // An outstanding request is now stale; keep the last accepted results on
    // screen until the new cycle fires.
    if self.phase == Phase::Querying {
      self.phase = Phase::Idle;
    }
    self.query = Some(trimmed.to_owned());
    self.pending = Some(self.generation);
    debug!(generation = self.generation, query = trimmed, "search scheduled");
    InputOutcome::Scheduled(Ticket {
      generation: self.generation,
      query:      trimmed.to_owned(),
    })
  }

  /// The debounce timer for `ticket` fired. Returns `true` if the host should
  /// now issue the lookup.
  pub fn begin_search(&mut self, ticket: &Ticket) -> bool {
    if self.pending != Some(ticket.generation) {
      debug!(generation = ticket.generation, "stale debounce timer ignored");
      return false;
    }
    self.pending = None;
    self.in_flight = Some(ticket.generation);
    self.phase = Phase::Querying;
    if !self.dismissed {
      self.panel_open = true;
    }
    self.highlight = None;
    true
  }

  /// Hand back the outcome of the lookup started for `ticket`.
  pub fn complete(
    &mut self,
    ticket: &Ticket,
    outcome: Result<Vec<CandidateRecord>, LookupError>,
  ) -> Completion {
    if self.in_flight != Some(ticket.generation) {
      debug!(
        generation = ticket.generation,
        current = self.generation,
        "superseded response discarded"
      );
      return Completion::Superseded;
    }
    self.in_flight = None;
    self.highlight = None;

    match outcome {
      Ok(users) if users.is_empty() => {
        self.results.clear();
        self.phase = Phase::Empty;
      }
      Ok(users) => {
        self.results = users;
        self.phase = Phase::Populated;
      }
      Err(e) => {
        self.results.clear();
        self.phase = Phase::Errored(e);
      }
    }
    Completion::Applied
  }

  // ── Selection ─────────────────────────────────────────────────────────────

  /// Commit `record` as the single selection.
  pub fn select(&mut self, record: CandidateRecord) -> Notification {
    self.generation += 1;
    self.pending = None;
    self.in_flight = None;
    self.input.clear();
    self.query = None;
    self.reset_results();
    self.selection = Some(record.clone());
    Notification::Selected(record)
  }

  /// Select the `index`-th visible result, if there is one.
  pub fn select_index(&mut self, index: usize) -> Option<Notification> {
    if index >= self.visible_len() {
      return None;
    }
    let record = self.results.get(index)?.clone();
    Some(self.select(record))
  }

  /// Select the keyboard-highlighted result, if any.
  pub fn select_highlighted(&mut self) -> Option<Notification> {
    if !self.panel_open {
      return None;
    }
    let index = self.highlight?;
    self.select_index(index)
  }

  /// Drop the selection and empty the input.
  pub fn clear(&mut self) -> Notification {
    self.generation += 1;
    self.pending = None;
    self.in_flight = None;
    self.input.clear();
    self.query = None;
    self.reset_results();
    self.selection = None;
    Notification::Cleared
  }

  /// Move the keyboard highlight by `delta`, wrapping at either end.
  pub fn move_highlight(&mut self, delta: isize) {
    let len = self.visible_len();
    if !self.panel_open || len == 0 {
      self.highlight = None;
      return;
    }
    let len = len as isize;
    let next = match self.highlight {
      None if delta < 0 => len - 1,
      None => 0,
      Some(i) => (i as isize).wrapping_add(delta).rem_euclid(len),
    };
    self.highlight = Some(next as usize);
  }

  // ── Focus & dismissal ─────────────────────────────────────────────────────

  pub fn focus(&mut self) {
    self.focused = true;
    self.dismissed = false;
    if self.phase != Phase::Idle || !self.results.is_empty() {
      self.panel_open = true;
    }
  }

  /// Focus left the widget. The host hides the panel with
  /// [`dismiss`](Self::dismiss) once the grace delay elapses, unless focus
  /// came back in the meantime.
  pub fn blur(&mut self) {
    self.focused = false;
    self.dismissed = true;
  }

  /// Hide the result panel. Results are kept so re-focusing shows them again.
  pub fn dismiss(&mut self) {
    self.dismissed = true;
    self.panel_open = false;
    self.highlight = None;
  }

  /// A pointer interaction happened outside the widget.
  pub fn pointer_outside(&mut self) {
    self.focused = false;
    self.dismiss();
  }

  // ── Rendering ─────────────────────────────────────────────────────────────

  /// Map the current state to a view tree.
  pub fn render(&self) -> View {
    let summary = self.selection.as_ref().map(|r| SummaryView {
      initials:  r.initials(),
      name:      r.display_name(),
      contact:   r.phone_number.clone(),
      secondary: r.email.clone(),
    });

    let panel = if self.panel_open {
      match &self.phase {
        Phase::Querying => Some(PanelView::Loading(self.config.loading_text.clone())),
        Phase::Empty => Some(PanelView::NoResults(self.config.no_results_text.clone())),
        Phase::Errored(e) => Some(PanelView::Error(e.user_message())),
        Phase::Populated => Some(PanelView::Items(self.item_views())),
        Phase::Idle if !self.results.is_empty() => Some(PanelView::Items(self.item_views())),
        Phase::Idle => None,
      }
    } else {
      None
    };

    View {
      input: InputView {
        text:        self.input.clone(),
        placeholder: self.config.placeholder.clone(),
        focused:     self.focused,
      },
      summary,
      panel,
      loading: self.is_loading(),
      output: self.output_value(),
    }
  }

  fn item_views(&self) -> Vec<ItemView> {
    self
      .results
      .iter()
      .take(self.config.max_results)
      .enumerate()
      .map(|(i, r)| ItemView {
        id:          r.id.to_string(),
        initials:    r.initials(),
        name:        r.display_name(),
        contact:     r.phone_number.clone(),
        secondary:   r.email.clone(),
        highlighted: self.highlight == Some(i),
      })
      .collect()
  }

  fn visible_len(&self) -> usize { self.results.len().min(self.config.max_results) }

  fn reset_results(&mut self) {
    self.results.clear();
    self.phase = Phase::Idle;
    self.panel_open = false;
    self.highlight = None;
  }
}
