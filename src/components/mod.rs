pub mod day_view;
pub mod event_form;
pub mod month_view;
pub mod search_view;
pub mod week_view;
pub mod year_view;

pub use day_view::DayView;
pub use event_form::EventForm;
pub use month_view::MonthView;
pub use search_view::SearchView;
pub use week_view::WeekView;
pub use year_view::YearView;
