//! ICS calendar to spreadsheet conversion
//!
//! - `parser`: iCalendar text to [`CalendarEvent`]s
//! - `types`: one spreadsheet row per event
//! - `export`: XLSX and CSV writers

pub mod export;
pub mod parser;
pub mod types;

pub use export::{export_rows, SCHEDULE_COLUMNS};
pub use parser::{parse_calendar, CalendarEvent, EventTime};
pub use types::{build_schedule, ScheduleRow};
