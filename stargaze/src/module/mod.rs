pub mod calendar;
pub mod comet;
pub mod ics;
pub mod json;
pub mod milkyway;
