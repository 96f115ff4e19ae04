mod app;
mod calendar;
mod components;
mod theme;
mod tui;

use std::time::Duration;

use app::{App, InputMode, ViewMode};
use calendar::{EventStore, FileBackend};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};

use components::event_form::FormField;
use components::search_view::SearchField;

fn main() -> Result<()> {
    color_eyre::install()?;

    let path = FileBackend::default_path()
        .ok_or_else(|| eyre!("no data directory available for the event store"))?;
    let store = EventStore::open(&path);
    let mut app = App::new(store)
        .wrap_err_with(|| format!("failed to load events from {}", path.display()))?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app);
    tui::restore()?;
    result
}

fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();
            let w = area.width;

            // Main layout: content + status bar
            let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);

            let content_area = layout[0];

            // Search takes over the whole content area
            if let Some(ref search) = app.search_state {
                components::SearchView::render(frame, content_area, search, &app.search_results);
            } else {
                match app.view_mode {
                    ViewMode::Month => render_month_layout(frame, content_area, app, w),
                    ViewMode::Week => {
                        components::WeekView::render(
                            frame,
                            content_area,
                            app.selected_date,
                            app.today,
                            app.week_start(),
                            &app.week_events,
                        );
                    }
                    ViewMode::Day => {
                        components::DayView::render(
                            frame,
                            content_area,
                            app.selected_date,
                            &app.day_events,
                            app.day_selection,
                        );
                    }
                    ViewMode::Year => {
                        components::YearView::render(
                            frame,
                            content_area,
                            app.selected_date,
                            app.today,
                            &app.year_counts,
                        );
                    }
                }
            }

            // Render event form overlay
            if let Some(ref form) = app.form_state {
                components::EventForm::render(frame, area, form);
            }

            // Render detail popup overlay
            if let Some(ref event) = app.detail_event {
                components::day_view::render_detail_popup(frame, area, event);
            }

            // Render help overlay
            if app.show_help {
                render_help(frame, area);
            }

            // Status bar
            render_status_bar(frame, layout[1], app, w);
        })?;

        if let Some(key) = tui::next_key_event(Duration::from_millis(100))? {
            // Clear status message on any key
            app.clear_status();

            // Help overlay takes priority
            if app.show_help {
                if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
                    app.show_help = false;
                }
                continue;
            }

            // Detail popup takes priority
            if app.detail_event.is_some() {
                if key.code == KeyCode::Esc {
                    app.close_detail();
                }
                continue;
            }

            match app.input_mode {
                InputMode::Form => handle_form_input(app, key.code, key.modifiers),
                InputMode::Search => handle_search_input(app, key.code, key.modifiers),
                InputMode::Normal => handle_normal_input(app, key.code, key.modifiers),
            }
        }
    }

    Ok(())
}

fn handle_normal_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
        }
        (KeyCode::Char('1'), _) => app.view_mode = ViewMode::Month,
        (KeyCode::Char('2'), _) => app.view_mode = ViewMode::Week,
        (KeyCode::Char('3'), _) => app.view_mode = ViewMode::Day,
        (KeyCode::Char('4'), _) => app.view_mode = ViewMode::Year,
        (KeyCode::Char('t'), _) => app.go_to_today(),
        (KeyCode::Char('r'), _) => app.reload_events(),
        (KeyCode::Char('n'), _) => app.open_add_form(),
        (KeyCode::Char('u'), _) => app.open_edit_form(),
        (KeyCode::Char('d'), _) => app.delete_selected_event(),
        (KeyCode::Char('e'), _) => app.export_events(),
        (KeyCode::Char('/'), _) => app.open_search(),
        (KeyCode::Enter, _) => {
            // In the year view Enter drills into the month instead
            if app.view_mode == ViewMode::Year {
                app.view_mode = ViewMode::Month;
            } else {
                app.show_detail();
            }
        }
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => {
            if app.view_mode == ViewMode::Year {
                app.prev_month();
            } else {
                app.prev_day();
            }
        }
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => {
            if app.view_mode == ViewMode::Year {
                app.next_month();
            } else {
                app.next_day();
            }
        }
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => match app.view_mode {
            ViewMode::Day | ViewMode::Month => app.select_prev_event(),
            ViewMode::Week => app.prev_week(),
            ViewMode::Year => app.shift_months(-4),
        },
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => match app.view_mode {
            ViewMode::Day | ViewMode::Month => app.select_next_event(),
            ViewMode::Week => app.next_week(),
            ViewMode::Year => app.shift_months(4),
        },
        (KeyCode::Char('['), _) => {
            if app.view_mode == ViewMode::Year {
                app.prev_year();
            } else {
                app.prev_month();
            }
        }
        (KeyCode::Char(']'), _) => {
            if app.view_mode == ViewMode::Year {
                app.next_year();
            } else {
                app.next_month();
            }
        }
        (KeyCode::Char('?'), _) => app.show_help = true,
        _ => {}
    }
}

fn handle_form_input(app: &mut App, code: KeyCode, _modifiers: KeyModifiers) {
    match code {
        KeyCode::Esc => app.close_form(),
        KeyCode::Enter => app.submit_form(),
        KeyCode::Tab => app.form_tab(),
        KeyCode::BackTab => app.form_backtab(),
        KeyCode::Backspace => app.form_backspace(),
        KeyCode::Char(' ') => {
            // Space cycles the kind; elsewhere it is ordinary text
            let on_kind = app
                .form_state
                .as_ref()
                .is_some_and(|f| f.active_field == FormField::Kind);
            if on_kind {
                app.form_cycle_kind();
            } else {
                app.form_input_char(' ');
            }
        }
        KeyCode::Char(c) => app.form_input_char(c),
        _ => {}
    }
}

fn handle_search_input(app: &mut App, code: KeyCode, _modifiers: KeyModifiers) {
    match code {
        KeyCode::Esc => app.close_search(),
        KeyCode::Enter => app.open_search_result(),
        KeyCode::Tab => app.search_tab(),
        KeyCode::Up => app.search_move_selection(-1),
        KeyCode::Down => app.search_move_selection(1),
        KeyCode::Backspace => app.search_backspace(),
        KeyCode::Char(' ') => {
            let on_kind = app
                .search_state
                .as_ref()
                .is_some_and(|s| s.active_field == SearchField::Kind);
            if on_kind {
                app.search_cycle_kind();
            } else {
                app.search_input_char(' ');
            }
        }
        KeyCode::Char(c) => app.search_input_char(c),
        _ => {}
    }
}

fn render_month_layout(frame: &mut ratatui::Frame, area: Rect, app: &App, total_width: u16) {
    if total_width < 80 {
        components::MonthView::render(frame, area, app.selected_date, app.today, &app.day_kinds);
    } else {
        let content =
            Layout::horizontal([Constraint::Length(53), Constraint::Min(20)]).split(area);

        components::MonthView::render(
            frame,
            content[0],
            app.selected_date,
            app.today,
            &app.day_kinds,
        );

        components::DayView::render(
            frame,
            content[1],
            app.selected_date,
            &app.day_events,
            app.day_selection,
        );
    }
}

fn render_status_bar(frame: &mut ratatui::Frame, area: Rect, app: &App, w: u16) {
    use ratatui::text::{Line, Span};
    use ratatui::widgets::Paragraph;

    let t = theme::current();
    let w = w as usize;

    let mode_str = match app.view_mode {
        ViewMode::Month => "[1]Month",
        ViewMode::Week => "[2]Week",
        ViewMode::Day => "[3]Day",
        ViewMode::Year => "[4]Year",
    };

    let focus_indicator = match app.input_mode {
        InputMode::Form => match app.form_state.as_ref().map(|f| f.mode) {
            Some(components::event_form::FormMode::Update(_)) => " [Edit Event]",
            _ => " [New Event]",
        },
        InputMode::Search => " [Search]",
        InputMode::Normal => "",
    };

    // Show status message if present, otherwise show context-aware hints
    let right_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        match app.view_mode {
            ViewMode::Day | ViewMode::Month if w >= 100 => {
                " hjkl:Nav [/]:Mon t:Today n:New u:Edit d:Del /:Search e:Export ?:Help q:Quit"
                    .to_string()
            }
            ViewMode::Day | ViewMode::Month if w >= 60 => {
                " jk:Select Enter:Detail n:New u:Edit d:Del q:Quit".to_string()
            }
            ViewMode::Week if w >= 70 => {
                " hl:Day jk:Week [/]:Mon t:Today n:New ?:Help q:Quit".to_string()
            }
            ViewMode::Year if w >= 70 => {
                " hl:Mon jk:Row [/]:Year Enter:Open t:Today ?:Help q:Quit".to_string()
            }
            _ => " ?:Help q:Quit".to_string(),
        }
    };

    let msg_style = if app.status_is_error {
        t.status.patch(t.error)
    } else {
        t.status
    };

    let left = format!(" {}{} ", mode_str, focus_indicator);
    let padding_len = w.saturating_sub(left.len() + right_text.len());
    let padding = " ".repeat(padding_len);

    let line = Line::from(vec![
        Span::styled(left, t.status),
        Span::styled(padding, t.status),
        Span::styled(right_text, msg_style),
    ]);

    let bar = Paragraph::new(line).style(t.status);
    frame.render_widget(bar, area);
}

fn render_help(frame: &mut ratatui::Frame, area: Rect) {
    use ratatui::style::{Color, Modifier, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

    let t = theme::current();

    let popup_w = area.width.min(52).max(30);
    let popup_h = area.height.min(24).max(12);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Keybindings ")
        .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let desc_style = Style::default();
    let section_style = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let lines = vec![
        Line::from(Span::styled("Navigation", section_style)),
        Line::from(vec![
            Span::styled("  h/l ", key_style),
            Span::styled("or ", t.dim),
            Span::styled("\u{2190}/\u{2192}  ", key_style),
            Span::styled("Previous/next day (year: month)", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  j/k ", key_style),
            Span::styled("or ", t.dim),
            Span::styled("\u{2191}/\u{2193}  ", key_style),
            Span::styled("Select event; week/year: move row", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  [/]       ", key_style),
            Span::styled("Previous/next month (year view: year)", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  t         ", key_style),
            Span::styled("Jump to today", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("Views", section_style)),
        Line::from(vec![
            Span::styled("  1/2/3/4   ", key_style),
            Span::styled("Month / Week / Day / Year view", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("Actions", section_style)),
        Line::from(vec![
            Span::styled("  Enter     ", key_style),
            Span::styled("Event details (year: open month)", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  n         ", key_style),
            Span::styled("Create new event", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  u         ", key_style),
            Span::styled("Edit selected event", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  d         ", key_style),
            Span::styled("Delete selected event", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  /         ", key_style),
            Span::styled("Search events", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  e         ", key_style),
            Span::styled("Export events to a JSON file", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  r         ", key_style),
            Span::styled("Reload events from disk", desc_style),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  q", key_style),
            Span::styled(" / ", t.dim),
            Span::styled("Esc     ", key_style),
            Span::styled("Quit / close popup", desc_style),
        ]),
    ];

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
