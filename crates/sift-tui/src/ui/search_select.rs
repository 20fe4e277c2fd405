//! Draws a search-select [`View`]: input box, selected summary, result panel.

use ratatui::{
  Frame,
  layout::{Constraint, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};
use sift_core::view::{ItemView, PanelView, View};

use super::HitMap;

/// Render `view` into `area` and return the regions a click can hit.
pub fn draw(f: &mut Frame, area: Rect, view: &View) -> HitMap {
  let summary_height = if view.summary.is_some() { 3 } else { 0 };
  let [input_area, summary_area, panel_area] = Layout::vertical([
    Constraint::Length(3),
    Constraint::Length(summary_height),
    Constraint::Min(0),
  ])
  .areas(area);

  draw_input(f, input_area, view);
  if view.summary.is_some() {
    draw_summary(f, summary_area, view);
  }

  let mut hits = HitMap {
    widget: Rect { height: input_area.height + summary_area.height, ..area },
    items:  Vec::new(),
  };
  if let Some(panel) = &view.panel {
    let used = draw_panel(f, panel_area, panel, &mut hits.items);
    hits.widget.height += used;
  }
  hits
}

fn draw_input(f: &mut Frame, area: Rect, view: &View) {
  let border = if view.input.focused { Color::Cyan } else { Color::DarkGray };
  let title = if view.loading { " Search users … " } else { " Search users " };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let line = if view.input.text.is_empty() {
    Line::from(Span::styled(
      view.input.placeholder.clone(),
      Style::default().fg(Color::DarkGray),
    ))
  } else if view.input.focused {
    Line::from(format!("{}_", view.input.text))
  } else {
    Line::from(view.input.text.clone())
  };

  f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_summary(f: &mut Frame, area: Rect, view: &View) {
  let Some(summary) = &view.summary else { return };

  let mut spans = vec![
    badge(&summary.initials),
    Span::styled(
      format!(" {}", summary.name),
      Style::default().add_modifier(Modifier::BOLD),
    ),
    Span::raw(format!("  {}", summary.contact)),
  ];
  if let Some(secondary) = &summary.secondary {
    spans.push(Span::styled(
      format!("  {secondary}"),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let block = Block::default()
    .title(format!(" Selected · id {} ", view.output))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Green));
  f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Draw the result panel; returns the height it used.
fn draw_panel(f: &mut Frame, area: Rect, panel: &PanelView, items: &mut Vec<Rect>) -> u16 {
  let rows = match panel {
    PanelView::Items(list) => u16::try_from(list.len()).unwrap_or(u16::MAX),
    _ => 1,
  };
  let area = Rect { height: rows.saturating_add(2).min(area.height), ..area };

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  match panel {
    PanelView::Loading(text) => message(f, inner, text, Color::Yellow),
    PanelView::NoResults(text) => message(f, inner, text, Color::DarkGray),
    PanelView::Error(text) => message(f, inner, text, Color::Red),
    PanelView::Items(list) => {
      for (item, y) in list.iter().zip(inner.y..inner.bottom()) {
        let row = Rect { y, height: 1, ..inner };
        f.render_widget(Paragraph::new(item_line(item)), row);
        items.push(row);
      }
    }
  }
  area.height
}

fn message(f: &mut Frame, area: Rect, text: &str, color: Color) {
  f.render_widget(
    Paragraph::new(text.to_string()).style(Style::default().fg(color)),
    area,
  );
}

fn item_line(item: &ItemView) -> Line<'static> {
  let base = if item.highlighted {
    Style::default()
      .bg(Color::Blue)
      .fg(Color::White)
      .add_modifier(Modifier::BOLD)
  } else {
    Style::default()
  };

  let mut spans = vec![
    badge(&item.initials),
    Span::styled(format!(" {}", item.name), base),
    Span::styled(format!("  {}", item.contact), base.fg(Color::Gray)),
  ];
  if let Some(secondary) = &item.secondary {
    spans.push(Span::styled(format!("  {secondary}"), base.fg(Color::DarkGray)));
  }
  Line::from(spans).style(base)
}

fn badge(initials: &str) -> Span<'static> {
  Span::styled(
    format!(" {initials} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  )
}
