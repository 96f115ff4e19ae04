use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::month_view::month_name;
use crate::theme;

pub struct YearView;

impl YearView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        selected_date: NaiveDate,
        today: NaiveDate,
        counts: &[usize; 12],
    ) {
        let t = theme::current();
        let year = selected_date.year();

        let block = Block::default()
            .title(format!(" {} ", year))
            .title_style(t.header)
            .borders(Borders::ALL)
            .border_style(t.border);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.width < 24 || inner.height < 9 {
            return;
        }

        // 3 rows of 4 month tiles
        let rows = Layout::vertical([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(inner);

        for (row_idx, row) in rows.iter().enumerate() {
            let cols = Layout::horizontal([
                Constraint::Ratio(1, 4),
                Constraint::Ratio(1, 4),
                Constraint::Ratio(1, 4),
                Constraint::Ratio(1, 4),
            ])
            .split(*row);

            for (col_idx, col) in cols.iter().enumerate() {
                let month = (row_idx * 4 + col_idx + 1) as u32;
                render_month_tile(frame, *col, year, month, selected_date, today, counts);
            }
        }
    }
}

fn render_month_tile(
    frame: &mut Frame,
    area: Rect,
    year: i32,
    month: u32,
    selected_date: NaiveDate,
    today: NaiveDate,
    counts: &[usize; 12],
) {
    let t = theme::current();

    let is_selected = selected_date.month() == month;
    let is_this_month = today.year() == year && today.month() == month;

    let border_style = if is_selected {
        Style::default().fg(Color::Cyan)
    } else if is_this_month {
        Style::default().fg(Color::Yellow)
    } else {
        t.border
    };
    let title_style = if is_selected || is_this_month {
        t.header.add_modifier(Modifier::BOLD)
    } else {
        t.header
    };

    let block = Block::default()
        .title(format!(" {} ", month_name(month)))
        .title_style(title_style)
        .borders(Borders::ALL)
        .border_style(border_style);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let count = counts[(month - 1) as usize];
    let count_line = if count == 0 {
        Line::from(Span::styled("no events", t.dim))
    } else {
        Line::from(Span::styled(
            format!(" {} event{} ", count, if count == 1 { "" } else { "s" }),
            t.highlight,
        ))
    };

    frame.render_widget(Paragraph::new(count_line).centered(), inner);
}
