use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::calendar::{Event, EventKind, SearchFilter};
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchField {
    Term,
    Kind,
    Date,
}

impl SearchField {
    pub fn next(&self) -> Self {
        match self {
            SearchField::Term => SearchField::Kind,
            SearchField::Kind => SearchField::Date,
            SearchField::Date => SearchField::Term,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchState {
    pub term: String,
    pub kind: Option<EventKind>,
    pub date: String,
    pub active_field: SearchField,
    pub selected: usize,
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            term: String::new(),
            kind: None,
            date: String::new(),
            active_field: SearchField::Term,
            selected: 0,
        }
    }

    pub fn input_char(&mut self, c: char) {
        match self.active_field {
            SearchField::Term => self.term.push(c),
            SearchField::Date => self.date.push(c),
            SearchField::Kind => {}
        }
        self.selected = 0;
    }

    pub fn backspace(&mut self) {
        match self.active_field {
            SearchField::Term => {
                self.term.pop();
            }
            SearchField::Date => {
                self.date.pop();
            }
            SearchField::Kind => {}
        }
        self.selected = 0;
    }

    /// Step the kind filter through any-kind and each kind in turn.
    pub fn cycle_kind(&mut self) {
        self.kind = match self.kind {
            None => Some(EventKind::ALL[0]),
            Some(kind) => {
                let idx = EventKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
                if idx + 1 == EventKind::ALL.len() {
                    None
                } else {
                    Some(EventKind::ALL[idx + 1])
                }
            }
        };
        self.selected = 0;
    }

    pub fn move_selection(&mut self, delta: i64, result_count: usize) {
        if result_count == 0 {
            self.selected = 0;
            return;
        }
        let last = result_count - 1;
        self.selected = match delta {
            d if d < 0 => self.selected.saturating_sub(d.unsigned_abs() as usize),
            d => (self.selected + d as usize).min(last),
        };
    }

    pub fn filter(&self) -> SearchFilter {
        SearchFilter {
            term: self.term.trim().to_string(),
            kind: self.kind,
            date: self.date.trim().to_string(),
        }
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SearchView;

impl SearchView {
    pub fn render(frame: &mut Frame, area: Rect, state: &SearchState, results: &[Event]) {
        let t = theme::current();

        let chunks = Layout::vertical([
            Constraint::Length(6), // filters
            Constraint::Min(0),    // results
        ])
        .split(area);

        // ── Filter fields ──
        let filter_block = Block::default()
            .title(" Search Events ")
            .title_style(t.header)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let filter_inner = filter_block.inner(chunks[0]);
        frame.render_widget(filter_block, chunks[0]);

        let rows = Layout::vertical([
            Constraint::Length(1), // term
            Constraint::Length(1), // kind
            Constraint::Length(1), // date
            Constraint::Length(1), // help
        ])
        .split(filter_inner);

        render_field(
            frame,
            rows[0],
            "Text:",
            &state.term,
            state.active_field == SearchField::Term,
        );
        render_kind_field(frame, rows[1], state.kind, state.active_field == SearchField::Kind);
        render_field(
            frame,
            rows[2],
            "Date:",
            &state.date,
            state.active_field == SearchField::Date,
        );

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Field ", t.dim),
            Span::styled("Space", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Kind ", t.dim),
            Span::styled("↑/↓", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Select ", t.dim),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Open ", t.dim),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Close", t.dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[3]);

        // ── Results ──
        let n = results.len();
        let results_block = Block::default()
            .title(format!(
                " {} match{} ",
                n,
                if n == 1 { "" } else { "es" }
            ))
            .title_style(t.header)
            .borders(Borders::ALL)
            .border_style(t.border);

        if results.is_empty() {
            let inner = results_block.inner(chunks[1]);
            frame.render_widget(results_block, chunks[1]);
            frame.render_widget(Paragraph::new("No matching events").style(t.dim), inner);
            return;
        }

        let items: Vec<ListItem> = results
            .iter()
            .enumerate()
            .map(|(i, ev)| {
                let item = format_result(ev);
                if i == state.selected {
                    item.style(t.selected)
                } else {
                    item
                }
            })
            .collect();

        // Keep the selection on screen
        let visible = chunks[1].height.saturating_sub(2) as usize;
        let skip = state.selected.saturating_sub(visible.saturating_sub(1));
        let visible_items: Vec<ListItem> = items.into_iter().skip(skip).collect();

        let list = List::new(visible_items).block(results_block);
        frame.render_widget(list, chunks[1]);
    }
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let cursor = if active { "_" } else { "" };

    let style = if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let spans = vec![
        Span::styled(format!("{:<7}", label), theme::current().dim),
        Span::styled(format!("{}{}", value, cursor), style),
    ];

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_kind_field(frame: &mut Frame, area: Rect, kind: Option<EventKind>, active: bool) {
    let t = theme::current();

    let mut spans = vec![Span::styled(format!("{:<7}", "Kind:"), t.dim)];
    match kind {
        Some(kind) => {
            spans.push(Span::styled("■ ", Style::default().fg(kind.color())));
            spans.push(Span::styled(
                kind.label().to_string(),
                if active {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                },
            ));
        }
        None => spans.push(Span::styled(
            "any",
            if active {
                Style::default().fg(Color::Cyan)
            } else {
                t.dim
            },
        )),
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn format_result(ev: &Event) -> ListItem<'static> {
    let kind_indicator = Span::styled("  ", Style::default().bg(ev.kind.color()));
    let date_span = Span::styled(
        format!(" {} ", ev.date.format("%Y-%m-%d")),
        Style::default().add_modifier(Modifier::DIM),
    );
    let time_span = Span::styled(
        format!("{} ", ev.time_span()),
        Style::default().add_modifier(Modifier::DIM),
    );
    let name_span = Span::styled(ev.name.clone(), Style::default());

    let mut spans = vec![kind_indicator, date_span, time_span, name_span];
    if !ev.description.is_empty() {
        spans.push(Span::styled(
            format!(" · {}", ev.description),
            theme::current().dim,
        ));
    }

    ListItem::new(Line::from(spans))
}
