//! View tree produced by [`SearchSelect::render`](crate::SearchSelect::render).
//!
//! Plain data: hosts decide how to draw it (terminal, HTML, test asserts).

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
  pub input:   InputView,
  /// The "selected" summary card; `None` when nothing is selected.
  pub summary: Option<SummaryView>,
  /// The result panel; `None` when hidden.
  pub panel:   Option<PanelView>,
  pub loading: bool,
  /// Bound output field: selected id or empty string.
  pub output:  String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputView {
  pub text:        String,
  pub placeholder: String,
  pub focused:     bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryView {
  pub initials:  String,
  pub name:      String,
  pub contact:   String,
  pub secondary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum PanelView {
  Loading(String),
  Items(Vec<ItemView>),
  NoResults(String),
  Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
  pub id:          String,
  pub initials:    String,
  pub name:        String,
  pub contact:     String,
  pub secondary:   Option<String>,
  pub highlighted: bool,
}

impl View {
  /// Items currently listed in the panel, if it is showing results.
  pub fn items(&self) -> &[ItemView] {
    match &self.panel {
      Some(PanelView::Items(items)) => items,
      _ => &[],
    }
  }
}
