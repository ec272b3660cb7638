//! Monthly comet search
//!
//! Screens the MPC catalog by estimated magnitude on the 15th of each month,
//! then checks the surviving comets at fixed evening and pre-dawn slots.

pub mod finder;
pub mod report;

pub use finder::{comet_magnitude, CometFinder, SlotSample, UNKNOWN_MAGNITUDE};
pub use report::{format_summary, sort_reports, write_json_report};
