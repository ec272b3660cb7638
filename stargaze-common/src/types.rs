use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One night's Milky-Way shooting window, in local time.
///
/// Field names are capitalised on the wire so that datasets written by the
/// generator can be pasted straight into the calendar renderer's input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightWindow {
    /// Local date of the first visible sample, "YYYY-MM-DD"
    #[serde(rename = "Date")]
    pub date: String,
    /// Local start time, "HH:MM"
    #[serde(rename = "Start")]
    pub start: String,
    /// Local end time, "HH:MM"
    #[serde(rename = "End")]
    pub end: String,
}

impl NightWindow {
    pub fn new(date: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            start: start.into(),
            end: end.into(),
        }
    }

    /// Parse the `Date` field.
    pub fn parse_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// Render as a single line in the dataset listing layout.
    pub fn to_listing_line(&self) -> String {
        format!(
            r#"    {{"Date": "{}", "Start": "{}", "End": "{}"}},"#,
            self.date, self.start, self.end
        )
    }
}

impl std::fmt::Display for NightWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}-{}", self.date, self.start, self.end)
    }
}

/// Date and distance of a comet's closest approach to Earth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosestApproach {
    /// Local date, "YYYY-MM-DD"
    pub date: String,
    /// Geocentric distance in AU, rounded to 4 decimals
    pub distance_au: f64,
}

/// A comet confirmed as photographable in a given month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CometReport {
    pub month: u32,
    pub year: i32,
    pub name: String,
    /// Estimated total magnitude, 2 decimals
    pub magnitude: f64,
    /// Best altitude among the qualifying check slots, 2 decimals
    pub altitude_max: f64,
    /// Azimuth at the best slot, 2 decimals
    pub azimuth: f64,
    /// Label of the best slot, e.g. "Evening (20:00)"
    pub visibility_period: String,
    /// Local time of the best slot, "%Y-%m-%d %H:%M:%S"
    pub check_date_local: String,
    pub closest_approach: ClosestApproach,
}

/// Round to a fixed number of decimals, as the reports do.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_night_window_wire_names() {
        let w = NightWindow::new("2026-10-01", "19:00", "21:10");
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r#"{"Date":"2026-10-01","Start":"19:00","End":"21:10"}"#);

        let back: NightWindow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, w);
    }

    #[test]
    fn test_listing_line() {
        let w = NightWindow::new("2026-03-02", "03:40", "05:10");
        assert_eq!(
            w.to_listing_line(),
            r#"    {"Date": "2026-03-02", "Start": "03:40", "End": "05:10"},"#
        );
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(11.23456, 2), 11.23);
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(-3.005, 0), -3.0);
    }

    #[test]
    fn test_comet_report_serialization() {
        let report = CometReport {
            month: 1,
            year: 2026,
            name: "C/2025 A1 (Test)".to_string(),
            magnitude: 10.5,
            altitude_max: 42.1,
            azimuth: 280.0,
            visibility_period: "Evening (20:00)".to_string(),
            check_date_local: "2026-01-15 20:00:00".to_string(),
            closest_approach: ClosestApproach {
                date: "2026-02-03".to_string(),
                distance_au: 0.8123,
            },
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["closest_approach"]["distance_au"], 0.8123);
        assert_eq!(value["visibility_period"], "Evening (20:00)");
    }
}
