use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{Datelike, Duration, Local, NaiveDate, Utc};
use color_eyre::Result;

use crate::calendar::{query, sort_events, Event, EventKind, EventStore};
use crate::components::event_form::{EventFormState, FormMode};
use crate::components::search_view::SearchState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewMode {
    Month,
    Week,
    Day,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Form,
    Search,
}

pub struct App {
    pub running: bool,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub selected_date: NaiveDate,
    pub today: NaiveDate,
    /// Full sorted listing, reloaded after every write.
    pub events: Vec<Event>,
    pub day_events: Vec<Event>,
    pub week_events: Vec<Event>,
    pub day_kinds: HashMap<u32, Vec<EventKind>>,
    pub year_counts: [usize; 12],
    pub day_selection: usize,
    pub form_state: Option<EventFormState>,
    pub search_state: Option<SearchState>,
    pub search_results: Vec<Event>,
    pub detail_event: Option<Event>,
    pub status_message: Option<String>,
    pub status_is_error: bool,
    pub show_help: bool,
    store: EventStore,
}

impl App {
    /// Build the app over an already constructed store. A storage
    /// payload that cannot be decoded fails here, before the terminal
    /// is taken over.
    pub fn new(store: EventStore) -> Result<Self> {
        let today = Local::now().date_naive();

        let mut app = Self {
            running: true,
            view_mode: ViewMode::Month,
            input_mode: InputMode::Normal,
            selected_date: today,
            today,
            events: Vec::new(),
            day_events: Vec::new(),
            week_events: Vec::new(),
            day_kinds: HashMap::new(),
            year_counts: [0; 12],
            day_selection: 0,
            form_state: None,
            search_state: None,
            search_results: Vec::new(),
            detail_event: None,
            status_message: None,
            status_is_error: false,
            show_help: false,
            store,
        };

        app.reload()?;
        Ok(app)
    }

    /// Refetch the listing from storage. On failure the previous cache
    /// stays in place so the session keeps working.
    fn reload(&mut self) -> crate::calendar::StoreResult<()> {
        let mut events = self.store.list_all()?;
        sort_events(&mut events);
        self.events = events;
        self.refresh_views();
        Ok(())
    }

    fn refresh_views(&mut self) {
        let year = self.selected_date.year();

        self.day_events = query::events_on(&self.events, self.selected_date);

        let start = self.week_start();
        let end = start + Duration::days(6);
        self.week_events = query::group_by_date(&self.events, start, end)
            .into_values()
            .flatten()
            .collect();

        self.day_kinds = query::kinds_by_day(&self.events, year, self.selected_date.month());
        self.year_counts = query::monthly_counts(&self.events, year);

        if self.day_selection >= self.day_events.len() {
            self.day_selection = self.day_events.len().saturating_sub(1);
        }
    }

    pub fn week_start(&self) -> NaiveDate {
        query::week_start(self.selected_date)
    }

    // ── Navigation ──

    pub fn next_day(&mut self) {
        self.selected_date = self.selected_date.succ_opt().unwrap_or(self.selected_date);
        self.on_date_changed();
    }

    pub fn prev_day(&mut self) {
        self.selected_date = self.selected_date.pred_opt().unwrap_or(self.selected_date);
        self.on_date_changed();
    }

    pub fn next_week(&mut self) {
        self.selected_date += Duration::weeks(1);
        self.on_date_changed();
    }

    pub fn prev_week(&mut self) {
        self.selected_date -= Duration::weeks(1);
        self.on_date_changed();
    }

    pub fn next_month(&mut self) {
        self.shift_months(1);
    }

    pub fn prev_month(&mut self) {
        self.shift_months(-1);
    }

    /// Move by whole months, clamping the day to the target month's
    /// length so Jan 31 lands on Feb 28/29 rather than skipping ahead.
    pub fn shift_months(&mut self, months: i32) {
        let total = self.selected_date.year() * 12 + self.selected_date.month0() as i32 + months;
        let year = total.div_euclid(12);
        let month = total.rem_euclid(12) as u32 + 1;
        let day = self.selected_date.day().min(days_in_month(year, month));
        self.selected_date = NaiveDate::from_ymd_opt(year, month, day).unwrap_or(self.selected_date);
        self.on_date_changed();
    }

    pub fn next_year(&mut self) {
        self.shift_months(12);
    }

    pub fn prev_year(&mut self) {
        self.shift_months(-12);
    }

    pub fn go_to_today(&mut self) {
        self.today = Local::now().date_naive();
        self.selected_date = self.today;
        self.on_date_changed();
    }

    fn on_date_changed(&mut self) {
        self.day_selection = 0;
        self.refresh_views();
    }

    // ── Day list selection ──

    pub fn select_next_event(&mut self) {
        if !self.day_events.is_empty() {
            self.day_selection = (self.day_selection + 1).min(self.day_events.len() - 1);
        }
    }

    pub fn select_prev_event(&mut self) {
        self.day_selection = self.day_selection.saturating_sub(1);
    }

    pub fn selected_event(&self) -> Option<&Event> {
        self.day_events.get(self.day_selection)
    }

    // ── Event form ──

    pub fn open_add_form(&mut self) {
        self.form_state = Some(EventFormState::new(self.selected_date));
        self.input_mode = InputMode::Form;
    }

    pub fn open_edit_form(&mut self) {
        match self.selected_event() {
            Some(event) => {
                self.form_state = Some(EventFormState::edit(event));
                self.input_mode = InputMode::Form;
            }
            None => self.set_status("No event selected"),
        }
    }

    pub fn close_form(&mut self) {
        self.form_state = None;
        self.input_mode = InputMode::Normal;
    }

    /// Validate the form and write through the store. A clashing slot
    /// keeps the form open with the conflict shown, so the times can be
    /// fixed without retyping everything.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form_state.clone() else {
            return;
        };

        let id = match form.mode {
            FormMode::Add => Utc::now().timestamp_millis(),
            FormMode::Update(id) => id,
        };

        let event = match form.build_event(id, self.today) {
            Ok(event) => event,
            Err(msg) => {
                self.set_form_error(msg);
                return;
            }
        };

        let result = match form.mode {
            FormMode::Add => self.store.add(event.clone()),
            FormMode::Update(id) => self.store.update(id, event.clone()),
        };

        match result {
            Ok(()) => {
                self.close_form();
                self.selected_date = event.date;
                self.on_date_changed();
                self.reload_after_write();
                if let Some(idx) = self.day_events.iter().position(|e| e.id == event.id) {
                    self.day_selection = idx;
                }
                self.set_status(match form.mode {
                    FormMode::Add => format!("Added \"{}\"", event.name),
                    FormMode::Update(_) => format!("Updated \"{}\"", event.name),
                });
            }
            Err(err) if err.is_conflict() => self.set_form_error(err.to_string()),
            Err(err) => {
                self.close_form();
                self.set_error(format!("Save failed: {}", err));
            }
        }
    }

    fn set_form_error(&mut self, msg: String) {
        if let Some(form) = self.form_state.as_mut() {
            form.error = Some(msg);
        }
    }

    pub fn form_tab(&mut self) {
        if let Some(form) = self.form_state.as_mut() {
            form.active_field = form.active_field.next();
            form.error = None;
        }
    }

    pub fn form_backtab(&mut self) {
        if let Some(form) = self.form_state.as_mut() {
            form.active_field = form.active_field.prev();
            form.error = None;
        }
    }

    pub fn form_input_char(&mut self, c: char) {
        if let Some(form) = self.form_state.as_mut() {
            form.input_char(c);
            form.error = None;
        }
    }

    pub fn form_backspace(&mut self) {
        if let Some(form) = self.form_state.as_mut() {
            form.backspace();
            form.error = None;
        }
    }

    pub fn form_cycle_kind(&mut self) {
        if let Some(form) = self.form_state.as_mut() {
            form.cycle_kind();
        }
    }

    // ── Deleting ──

    pub fn delete_selected_event(&mut self) {
        let Some(event) = self.selected_event().cloned() else {
            self.set_status("No event selected");
            return;
        };
        match self.store.remove(event.id) {
            Ok(()) => {
                self.reload_after_write();
                self.set_status(format!("Deleted \"{}\"", event.name));
            }
            Err(err) => self.set_error(format!("Delete failed: {}", err)),
        }
    }

    // ── Detail popup ──

    pub fn show_detail(&mut self) {
        if let Some(event) = self.selected_event() {
            self.detail_event = Some(event.clone());
        }
    }

    pub fn close_detail(&mut self) {
        self.detail_event = None;
    }

    // ── Search ──

    pub fn open_search(&mut self) {
        self.search_state = Some(SearchState::new());
        self.search_results = self.events.clone();
        self.input_mode = InputMode::Search;
    }

    pub fn close_search(&mut self) {
        self.search_state = None;
        self.search_results.clear();
        self.input_mode = InputMode::Normal;
    }

    fn refresh_search(&mut self) {
        if let Some(ref search) = self.search_state {
            self.search_results = query::filter_events(&self.events, &search.filter());
        }
    }

    /// Jump to the selected result's date in the day view.
    pub fn open_search_result(&mut self) {
        let Some(search) = self.search_state.as_ref() else {
            return;
        };
        let Some(event) = self.search_results.get(search.selected).cloned() else {
            return;
        };

        self.close_search();
        self.selected_date = event.date;
        self.view_mode = ViewMode::Day;
        self.on_date_changed();
        if let Some(idx) = self.day_events.iter().position(|e| e.id == event.id) {
            self.day_selection = idx;
        }
    }

    pub fn search_tab(&mut self) {
        if let Some(search) = self.search_state.as_mut() {
            search.active_field = search.active_field.next();
        }
    }

    pub fn search_input_char(&mut self, c: char) {
        if let Some(search) = self.search_state.as_mut() {
            search.input_char(c);
        }
        self.refresh_search();
    }

    pub fn search_backspace(&mut self) {
        if let Some(search) = self.search_state.as_mut() {
            search.backspace();
        }
        self.refresh_search();
    }

    pub fn search_cycle_kind(&mut self) {
        if let Some(search) = self.search_state.as_mut() {
            search.cycle_kind();
        }
        self.refresh_search();
    }

    pub fn search_move_selection(&mut self, delta: i64) {
        let count = self.search_results.len();
        if let Some(search) = self.search_state.as_mut() {
            search.move_selection(delta, count);
        }
    }

    // ── Store maintenance ──

    pub fn reload_events(&mut self) {
        match self.reload() {
            Ok(()) => self.set_status("Events reloaded"),
            Err(err) => self.set_error(format!("Reload failed: {}", err)),
        }
    }

    pub fn export_events(&mut self) {
        let dir = dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        match self.store.export(&dir) {
            Ok(Some(path)) => self.set_status(format!("Exported to {}", path.display())),
            Ok(None) => self.set_status("No events to export"),
            Err(err) => self.set_error(format!("Export failed: {}", err)),
        }
    }

    fn reload_after_write(&mut self) {
        if let Err(err) = self.reload() {
            self.set_error(format!("Reload failed: {}", err));
        }
    }

    // ── Status line ──

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_is_error = false;
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_is_error = true;
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
        self.status_is_error = false;
    }
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
