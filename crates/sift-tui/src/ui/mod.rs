//! TUI rendering: header, the widget, status bar.

pub mod search_select;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::App;

/// Screen regions of the widget, recorded each frame for mouse hit-testing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitMap {
  /// The whole widget: input, summary and result panel.
  pub widget: Rect,
  /// One row per listed result, in list order.
  pub items:  Vec<Rect>,
}

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) -> HitMap {
  let area = f.area();

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0]);
  let hits = draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
  hits
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " sift  pick a user",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{date} "),
    Style::default().fg(Color::DarkGray),
  );

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) -> HitMap {
  // Centre a fixed-width column for the widget.
  let [column] = Layout::horizontal([Constraint::Max(72)])
    .flex(Flex::Center)
    .areas(area);
  let [widget_area] = Layout::vertical([Constraint::Min(0)])
    .vertical_margin(1)
    .areas(column);

  search_select::draw(f, widget_area, &app.view)
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = if app.view.panel.is_some() {
    ("SEARCH", "↑↓ move  Enter pick  Esc close  Ctrl-C quit")
  } else if !app.view.output.is_empty() {
    ("SELECTED", "Enter confirm  Ctrl-U clear  type to search again  Esc quit")
  } else {
    ("IDLE", "type to search  Tab focus  Esc quit")
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    format!("{}  ·  {hints}", app.status_msg)
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
