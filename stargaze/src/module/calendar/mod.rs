//! Milky-Way calendar chart
//!
//! Turns a list of nightly windows into a horizontal bar chart, one row per
//! night, with the time of night on the X axis (18:00 to 06:00).

pub mod chart;
pub mod renderer;
pub mod sample;

pub use chart::{night_date, prepare_rows, time_to_plot_value, ChartRow};
pub use renderer::{load_windows, CalendarRenderer};
pub use sample::sample_windows;
