use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::calendar::EventKind;
use crate::theme;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Dots shown next to a day number, one per event kind present that day.
const MAX_MARKERS: usize = 3;

pub struct MonthView;

impl MonthView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        selected_date: NaiveDate,
        today: NaiveDate,
        day_kinds: &HashMap<u32, Vec<EventKind>>,
    ) {
        let t = theme::current();
        let year = selected_date.year();
        let month = selected_date.month();

        let title = format!(" {} {} ", month_name(month), year);

        let block = Block::default()
            .title(title)
            .title_style(t.header)
            .borders(Borders::ALL)
            .border_style(t.border);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        // Header row
        let header_cells: Vec<Span> = DAY_NAMES
            .iter()
            .map(|d| Span::styled(format!("{:^7}", d), t.header))
            .collect();
        let header = Line::from(header_cells);

        // Calculate grid
        let first_day = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(selected_date);
        let first_weekday = first_day.weekday().num_days_from_sunday() as usize;
        let days_in_month = days_in_month(year, month);

        // Build weeks
        let mut weeks: Vec<Line> = Vec::new();
        let mut current_day: i32 = 1 - first_weekday as i32;

        while current_day <= days_in_month as i32 {
            let mut cells: Vec<Span> = Vec::new();
            for _ in 0..7 {
                if current_day < 1 || current_day > days_in_month as i32 {
                    cells.push(Span::raw("       "));
                } else {
                    let day = current_day as u32;
                    let date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or(selected_date);

                    let style = if date == today && date == selected_date {
                        t.today.add_modifier(Modifier::BOLD)
                    } else if date == selected_date {
                        t.selected
                    } else if date == today {
                        t.today
                    } else {
                        Style::default()
                    };

                    cells.push(Span::styled(format!(" {:>2}", day), style));

                    // One colored dot per distinct kind, capped
                    let markers = marker_kinds(day_kinds.get(&day));
                    for kind in &markers {
                        cells.push(Span::styled("•", Style::default().fg(kind.color())));
                    }
                    cells.push(Span::raw(" ".repeat(4 - markers.len())));
                }
                current_day += 1;
            }
            weeks.push(Line::from(cells));
        }

        // Layout: header + weeks
        let mut constraints = vec![Constraint::Length(1)]; // header
        for _ in &weeks {
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Min(0)); // fill remaining

        let rows = Layout::vertical(constraints).split(inner);

        frame.render_widget(Paragraph::new(header), rows[0]);
        for (i, week) in weeks.iter().enumerate() {
            frame.render_widget(Paragraph::new(week.clone()), rows[i + 1]);
        }
    }
}

fn marker_kinds(kinds: Option<&Vec<EventKind>>) -> Vec<EventKind> {
    let mut markers: Vec<EventKind> = Vec::new();
    if let Some(kinds) = kinds {
        for kind in kinds {
            if !markers.contains(kind) {
                markers.push(*kind);
            }
            if markers.len() == MAX_MARKERS {
                break;
            }
        }
    }
    markers
}

fn days_in_month(year: i32, month: u32) -> u32 {
    if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .unwrap_or_default()
    .signed_duration_since(NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default())
    .num_days() as u32
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn test_marker_kinds_dedup_and_cap() {
        let kinds = vec![
            EventKind::Work,
            EventKind::Work,
            EventKind::Personal,
            EventKind::Social,
            EventKind::Family,
        ];
        let markers = marker_kinds(Some(&kinds));
        assert_eq!(
            markers,
            vec![EventKind::Work, EventKind::Personal, EventKind::Social]
        );
    }
}
