use chrono_tz::Tz;
use regex::Regex;
use std::sync::LazyLock;

use super::parser::{CalendarEvent, EventTime};

static LATITUDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Lat\s*([\d.]+)").expect("valid latitude regex"));
static LONGITUDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Lon\s*([\d.]+)").expect("valid longitude regex"));
static MAX_ALTITUDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"MaxAlt\s*~?(\d+)").expect("valid altitude regex"));

/// One spreadsheet row
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRow {
    /// Sort key, "%Y-%m-%d %H:%M:%S" or "YYYY-MM-DD"
    pub start_time: String,
    pub end_time: String,
    pub date: String,
    pub time_start: String,
    pub time_end: String,
    pub duration_minutes: Option<i64>,
    pub max_altitude: Option<i64>,
    pub event_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub raw_description: String,
}

fn capture<T: std::str::FromStr>(re: &Regex, text: &str) -> Option<T> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

impl ScheduleRow {
    /// Build a row in time zone `tz`; None when the event has no start.
    pub fn from_event(event: &CalendarEvent, tz: &Tz) -> Option<Self> {
        let start = event.start?;

        let (start_time, date, time_start) = match start {
            EventTime::DateTime(t) => {
                let local = t.with_timezone(tz);
                (
                    local.format("%Y-%m-%d %H:%M:%S").to_string(),
                    local.format("%Y-%m-%d").to_string(),
                    local.format("%H:%M").to_string(),
                )
            }
            EventTime::Date(d) => {
                let text = d.format("%Y-%m-%d").to_string();
                (text.clone(), text, "All Day".to_string())
            }
        };

        let (end_time, time_end, duration_minutes) = match (event.end, start) {
            (Some(EventTime::DateTime(end)), start) => {
                let local = end.with_timezone(tz);
                let duration = match start {
                    EventTime::DateTime(s) => Some((end - s).num_seconds() / 60),
                    EventTime::Date(_) => None,
                };
                (
                    local.format("%Y-%m-%d %H:%M:%S").to_string(),
                    local.format("%H:%M").to_string(),
                    duration,
                )
            }
            (Some(EventTime::Date(d)), _) => (d.format("%Y-%m-%d").to_string(), String::new(), Some(0)),
            (None, _) => (String::new(), String::new(), Some(0)),
        };

        let description = event.description.clone().unwrap_or_default();

        Some(Self {
            start_time,
            end_time,
            date,
            time_start,
            time_end,
            duration_minutes,
            max_altitude: capture(&MAX_ALTITUDE_RE, &description),
            event_name: event.summary.clone().unwrap_or_default(),
            latitude: capture(&LATITUDE_RE, &description),
            longitude: capture(&LONGITUDE_RE, &description),
            raw_description: description,
        })
    }
}

/// Rows for every event with a start, ordered by start time.
pub fn build_schedule(events: &[CalendarEvent], tz: &Tz) -> Vec<ScheduleRow> {
    let mut rows: Vec<ScheduleRow> = events
        .iter()
        .filter_map(|e| ScheduleRow::from_event(e, tz))
        .collect();
    rows.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::Asia::Bangkok;

    fn at(h: u32, m: u32) -> EventTime {
        EventTime::DateTime(Utc.with_ymd_and_hms(2026, 3, 15, h, m, 0).unwrap())
    }

    fn event(start: Option<EventTime>, end: Option<EventTime>, description: Option<&str>) -> CalendarEvent {
        CalendarEvent {
            start,
            end,
            summary: Some("MW".to_string()),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn test_timed_event_row() {
        let e = event(Some(at(13, 0)), Some(at(15, 5)), Some("Lat 14.439 Lon 101.3725 MaxAlt ~42"));
        let row = ScheduleRow::from_event(&e, &Bangkok).unwrap();
        assert_eq!(row.start_time, "2026-03-15 20:00:00");
        assert_eq!(row.date, "2026-03-15");
        assert_eq!(row.time_start, "20:00");
        assert_eq!(row.end_time, "2026-03-15 22:05:00");
        assert_eq!(row.time_end, "22:05");
        assert_eq!(row.duration_minutes, Some(125));
        assert_eq!(row.latitude, Some(14.439));
        assert_eq!(row.longitude, Some(101.3725));
        assert_eq!(row.max_altitude, Some(42));
    }

    #[test]
    fn test_duration_truncates() {
        let end = EventTime::DateTime(Utc.with_ymd_and_hms(2026, 3, 15, 13, 10, 59).unwrap());
        let row = ScheduleRow::from_event(&event(Some(at(13, 0)), Some(end), None), &Bangkok).unwrap();
        assert_eq!(row.duration_minutes, Some(10));
        assert_eq!(row.latitude, None);
        assert_eq!(row.raw_description, "");
    }

    #[test]
    fn test_all_day_rows() {
        let day = EventTime::Date(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());
        let next = EventTime::Date(NaiveDate::from_ymd_opt(2026, 5, 2).unwrap());

        let row = ScheduleRow::from_event(&event(Some(day), Some(next), None), &Bangkok).unwrap();
        assert_eq!(row.start_time, "2026-05-01");
        assert_eq!(row.time_start, "All Day");
        assert_eq!(row.end_time, "2026-05-02");
        assert_eq!(row.time_end, "");
        assert_eq!(row.duration_minutes, Some(0));

        // all-day start with a timed end leaves the duration blank
        let row = ScheduleRow::from_event(&event(Some(day), Some(at(13, 0)), None), &Bangkok).unwrap();
        assert_eq!(row.time_end, "20:00");
        assert_eq!(row.duration_minutes, None);
    }

    #[test]
    fn test_missing_end_and_start() {
        let row = ScheduleRow::from_event(&event(Some(at(13, 0)), None, None), &Bangkok).unwrap();
        assert_eq!(row.end_time, "");
        assert_eq!(row.time_end, "");
        assert_eq!(row.duration_minutes, Some(0));

        assert!(ScheduleRow::from_event(&event(None, Some(at(13, 0)), None), &Bangkok).is_none());
    }

    #[test]
    fn test_schedule_sorted_by_start() {
        let events = vec![
            event(Some(at(15, 0)), None, None),
            event(Some(EventTime::Date(NaiveDate::from_ymd_opt(2026, 3, 15).unwrap())), None, None),
            event(Some(at(13, 0)), None, None),
            event(None, None, None),
        ];
        let rows = build_schedule(&events, &Bangkok);
        let starts: Vec<_> = rows.iter().map(|r| r.start_time.as_str()).collect();
        assert_eq!(starts, ["2026-03-15", "2026-03-15 20:00:00", "2026-03-15 22:00:00"]);
    }
}
