use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::calendar::Event;
use crate::theme;

pub struct DayView;

impl DayView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        date: NaiveDate,
        events: &[Event],
        selected: usize,
    ) {
        let t = theme::current();
        let w = area.width as usize;

        let title = if w >= 30 {
            format!(" {} ", date.format("%A, %B %d, %Y"))
        } else if w >= 18 {
            format!(" {} ", date.format("%b %d, %Y"))
        } else {
            format!(" {} ", date.format("%m/%d"))
        };

        let count_str = if events.is_empty() {
            String::new()
        } else {
            let n = events.len();
            format!(" {} event{} ", n, if n == 1 { "" } else { "s" })
        };

        let block = Block::default()
            .title(title)
            .title_style(t.header)
            .title_bottom(Line::from(Span::styled(count_str, t.dim)))
            .borders(Borders::ALL)
            .border_style(t.border);

        if events.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("No events").style(t.dim);
            frame.render_widget(msg, inner);
            return;
        }

        let inner_w = area.width.saturating_sub(2) as usize;

        let items: Vec<ListItem> = events
            .iter()
            .enumerate()
            .map(|(i, ev)| {
                let item = format_event(ev, inner_w);
                if i == selected {
                    item.style(t.selected)
                } else {
                    item
                }
            })
            .collect();

        // Keep the selection on screen
        let visible = area.height.saturating_sub(2) as usize;
        let skip = selected.saturating_sub(visible.saturating_sub(1));
        let visible_items: Vec<ListItem> = items.into_iter().skip(skip).collect();

        let list = List::new(visible_items).block(block);
        frame.render_widget(list, area);
    }
}

fn format_event(ev: &Event, max_width: usize) -> ListItem<'static> {
    let kind_indicator = Span::styled("  ", Style::default().bg(ev.kind.color()));

    let time_str = format!(" {} ", ev.time_span());
    let time_span = Span::styled(
        time_str.clone(),
        Style::default().add_modifier(Modifier::DIM),
    );

    let name_span = Span::styled(ev.name.clone(), Style::default());

    let mut spans = vec![kind_indicator, time_span, name_span];

    // Only show the description if there's room
    let used = 2 + time_str.len() + ev.name.len();
    if !ev.description.is_empty() && used + 4 + ev.description.len() <= max_width {
        spans.push(Span::styled(
            format!(" · {}", ev.description),
            theme::current().dim,
        ));
    }

    ListItem::new(Line::from(spans))
}

/// Render an event detail popup overlay.
pub fn render_detail_popup(frame: &mut Frame, area: Rect, ev: &Event) {
    let t = theme::current();

    let popup_w = area.width.min(60).max(30);
    let popup_h = area.height.min(14).max(8);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let accent = ev.kind.color();
    let block = Block::default()
        .title(format!(" {} ", ev.name))
        .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("  ", Style::default().bg(accent)),
        Span::styled(format!(" {}", ev.kind.label()), Style::default()),
    ]));

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Time: ", t.dim),
        Span::styled(ev.time_span(), Style::default()),
    ]));

    lines.push(Line::from(vec![
        Span::styled("Date: ", t.dim),
        Span::styled(ev.date.format("%A, %B %d, %Y").to_string(), Style::default()),
    ]));

    if !ev.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Description:", t.dim)));
        for line in ev.description.lines() {
            lines.push(Line::from(line.to_string()));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Press Esc to close", t.dim)));

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
