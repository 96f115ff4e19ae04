use chrono::{NaiveDate, NaiveTime};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::calendar::{Event, EventKind};
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Name,
    Date,
    StartTime,
    EndTime,
    Kind,
    Description,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Name => FormField::Date,
            FormField::Date => FormField::StartTime,
            FormField::StartTime => FormField::EndTime,
            FormField::EndTime => FormField::Kind,
            FormField::Kind => FormField::Description,
            FormField::Description => FormField::Name,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Name => FormField::Description,
            FormField::Date => FormField::Name,
            FormField::StartTime => FormField::Date,
            FormField::EndTime => FormField::StartTime,
            FormField::Kind => FormField::EndTime,
            FormField::Description => FormField::Kind,
        }
    }
}

/// Whether the form creates a fresh event or rewrites an existing one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormMode {
    Add,
    Update(i64),
}

#[derive(Debug, Clone)]
pub struct EventFormState {
    pub mode: FormMode,
    pub name: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub kind: EventKind,
    pub description: String,
    pub active_field: FormField,
    pub error: Option<String>,
}

impl EventFormState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            mode: FormMode::Add,
            name: String::new(),
            date: date.format("%Y-%m-%d").to_string(),
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            kind: EventKind::Personal,
            description: String::new(),
            active_field: FormField::Name,
            error: None,
        }
    }

    /// Prefill from an existing event for editing.
    pub fn edit(event: &Event) -> Self {
        Self {
            mode: FormMode::Update(event.id),
            name: event.name.clone(),
            date: event.date.format("%Y-%m-%d").to_string(),
            start_time: event.start_time.format("%H:%M").to_string(),
            end_time: event.end_time.format("%H:%M").to_string(),
            kind: event.kind,
            description: event.description.clone(),
            active_field: FormField::Name,
            error: None,
        }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    pub fn parsed_start_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.start_time.trim(), "%H:%M").ok()
    }

    pub fn parsed_end_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.end_time.trim(), "%H:%M").ok()
    }

    pub fn input_char(&mut self, c: char) {
        match self.active_field {
            FormField::Name => self.name.push(c),
            FormField::Date => self.date.push(c),
            FormField::StartTime => self.start_time.push(c),
            FormField::EndTime => self.end_time.push(c),
            FormField::Description => self.description.push(c),
            FormField::Kind => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.active_field {
            FormField::Name => {
                self.name.pop();
            }
            FormField::Date => {
                self.date.pop();
            }
            FormField::StartTime => {
                self.start_time.pop();
            }
            FormField::EndTime => {
                self.end_time.pop();
            }
            FormField::Description => {
                self.description.pop();
            }
            FormField::Kind => {}
        }
    }

    pub fn cycle_kind(&mut self) {
        let idx = EventKind::ALL
            .iter()
            .position(|k| *k == self.kind)
            .unwrap_or(0);
        self.kind = EventKind::ALL[(idx + 1) % EventKind::ALL.len()];
    }

    /// Validate the fields and assemble the event they describe. New
    /// events may not be dated in the past; edited ones may, so that
    /// old entries stay editable.
    pub fn build_event(&self, id: i64, today: NaiveDate) -> Result<Event, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        let date = self.parsed_date().ok_or("Date must be YYYY-MM-DD")?;
        let start_time = self.parsed_start_time().ok_or("Start time must be HH:MM")?;
        let end_time = self.parsed_end_time().ok_or("End time must be HH:MM")?;
        if start_time >= end_time {
            return Err("End time must be after start time".to_string());
        }
        if self.mode == FormMode::Add && date < today {
            return Err("Date cannot be in the past".to_string());
        }

        Ok(Event {
            id,
            name: name.to_string(),
            date,
            description: self.description.trim().to_string(),
            start_time,
            end_time,
            kind: self.kind,
        })
    }
}

pub struct EventForm;

impl EventForm {
    pub fn render(frame: &mut Frame, area: Rect, state: &EventFormState) {
        let t = theme::current();

        // Center the form popup
        let form_w = area.width.min(50).max(30);
        let form_h = area.height.min(15).max(12);
        let x = area.x + (area.width.saturating_sub(form_w)) / 2;
        let y = area.y + (area.height.saturating_sub(form_h)) / 2;
        let form_area = Rect::new(x, y, form_w, form_h);

        // Clear background
        frame.render_widget(Clear, form_area);

        let title = match state.mode {
            FormMode::Add => " New Event ",
            FormMode::Update(_) => " Edit Event ",
        };

        let block = Block::default()
            .title(title)
            .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let rows = Layout::vertical([
            Constraint::Length(1), // name
            Constraint::Length(1), // date
            Constraint::Length(1), // start time
            Constraint::Length(1), // end time
            Constraint::Length(1), // kind
            Constraint::Length(1), // description
            Constraint::Length(1), // spacer
            Constraint::Length(1), // error
            Constraint::Length(1), // help
            Constraint::Min(0),
        ])
        .split(inner);

        render_field(frame, rows[0], "Name:", &state.name, state.active_field == FormField::Name);
        render_field(frame, rows[1], "Date:", &state.date, state.active_field == FormField::Date);
        render_field(
            frame,
            rows[2],
            "Start:",
            &state.start_time,
            state.active_field == FormField::StartTime,
        );
        render_field(
            frame,
            rows[3],
            "End:",
            &state.end_time,
            state.active_field == FormField::EndTime,
        );

        render_kind_field(frame, rows[4], state.kind, state.active_field == FormField::Kind);

        render_field(
            frame,
            rows[5],
            "Desc:",
            &state.description,
            state.active_field == FormField::Description,
        );

        if let Some(ref err) = state.error {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(err.clone(), t.error))),
                rows[7],
            );
        }

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Next ", t.dim),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Save ", t.dim),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Cancel", t.dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[8]);
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

fn render_kind_field(frame: &mut Frame, area: Rect, kind: EventKind, active: bool) {
    let t = theme::current();

    let mut spans = vec![
        Span::styled(format!("{:<7}", "Kind:"), t.dim),
        Span::styled("■ ", Style::default().fg(kind.color())),
        Span::styled(
            kind.label().to_string(),
            if active {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            },
        ),
    ];
    if active {
        spans.push(Span::styled("  (Space cycles)", t.dim));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> EventFormState {
        let mut state = EventFormState::new(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
        state.name = "Dentist".to_string();
        state
    }

    #[test]
    fn test_build_event_uses_the_form_fields() {
        let mut state = filled_form();
        state.description = "  bring insurance card  ".to_string();
        state.kind = EventKind::Work;

        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let event = state.build_event(42, today).unwrap();
        assert_eq!(event.id, 42);
        assert_eq!(event.name, "Dentist");
        assert_eq!(event.description, "bring insurance card");
        assert_eq!(event.kind, EventKind::Work);
        assert_eq!(event.start_time.format("%H:%M").to_string(), "09:00");
    }

    #[test]
    fn test_build_event_rejects_blank_name() {
        let mut state = filled_form();
        state.name = "   ".to_string();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(state.build_event(1, today), Err("Name is required".to_string()));
    }

    #[test]
    fn test_build_event_rejects_reversed_times() {
        let mut state = filled_form();
        state.start_time = "10:00".to_string();
        state.end_time = "09:00".to_string();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(state.build_event(1, today).is_err());

        // Zero-length events are rejected too
        state.end_time = "10:00".to_string();
        assert!(state.build_event(1, today).is_err());
    }

    #[test]
    fn test_build_event_rejects_unparseable_inputs() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let mut state = filled_form();
        state.date = "06/02/2024".to_string();
        assert_eq!(
            state.build_event(1, today),
            Err("Date must be YYYY-MM-DD".to_string())
        );

        let mut state = filled_form();
        state.start_time = "9am".to_string();
        assert_eq!(
            state.build_event(1, today),
            Err("Start time must be HH:MM".to_string())
        );
    }

    #[test]
    fn test_past_dates_rejected_only_for_new_events() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        let mut state = filled_form(); // dated 2024-06-02
        assert_eq!(
            state.build_event(1, today),
            Err("Date cannot be in the past".to_string())
        );

        state.mode = FormMode::Update(1);
        assert!(state.build_event(1, today).is_ok());
    }

    #[test]
    fn test_cycle_kind_walks_every_kind() {
        let mut state = filled_form();
        let first = state.kind;
        let mut seen = vec![first];
        for _ in 0..EventKind::ALL.len() - 1 {
            state.cycle_kind();
            seen.push(state.kind);
        }
        state.cycle_kind();
        assert_eq!(state.kind, first);
        seen.sort_by_key(|k| k.label());
        seen.dedup();
        assert_eq!(seen.len(), EventKind::ALL.len());
    }
}
