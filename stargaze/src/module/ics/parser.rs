use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::config::parse_time_zone;
use crate::error::{Result, StargazeError};

/// Start or end of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    /// A point in time; floating times are read as UTC
    DateTime(DateTime<Utc>),
    /// An all-day date
    Date(NaiveDate),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarEvent {
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub summary: Option<String>,
    pub description: Option<String>,
}

/// One unfolded `NAME;PARAM=VALUE:value` line
#[derive(Debug, Clone, PartialEq)]
struct ContentLine {
    name: String,
    params: Vec<(String, String)>,
    value: String,
}

impl ContentLine {
    fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Join folded lines (continuations start with a space or tab).
fn unfold(text: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if let Some(rest) = raw.strip_prefix([' ', '\t']) {
            if let Some((_, last)) = lines.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        if !raw.is_empty() {
            lines.push((index + 1, raw.to_string()));
        }
    }
    lines
}

fn parse_content_line(line: &str, line_no: usize) -> Result<ContentLine> {
    let mut in_quotes = false;
    let mut colon = None;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => {
                colon = Some(i);
                break;
            }
            _ => {}
        }
    }
    let colon = colon.ok_or_else(|| StargazeError::Ics {
        line: line_no,
        reason: "missing ':'".to_string(),
    })?;

    let (head, value) = (&line[..colon], &line[colon + 1..]);
    let mut parts = split_unquoted(head, ';').into_iter();
    let name = parts.next().unwrap_or_default().trim().to_ascii_uppercase();
    if name.is_empty() {
        return Err(StargazeError::Ics {
            line: line_no,
            reason: "empty property name".to_string(),
        });
    }

    let params = parts
        .filter_map(|p| {
            let (k, v) = p.split_once('=')?;
            Some((k.trim().to_ascii_uppercase(), v.trim().trim_matches('"').to_string()))
        })
        .collect();

    Ok(ContentLine {
        name,
        params,
        value: value.to_string(),
    })
}

fn split_unquoted(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in text.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        }
        if c == separator && !in_quotes {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}

/// Undo TEXT escaping: `\n`, `\,`, `\;`, `\\`.
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn parse_event_time(line: &ContentLine, line_no: usize) -> Result<EventTime> {
    let value = line.value.trim();
    let bad = |reason: String| StargazeError::Ics { line: line_no, reason };

    let is_date = line
        .param("VALUE")
        .is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
        || (value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()));
    if is_date {
        return NaiveDate::parse_from_str(value, "%Y%m%d")
            .map(EventTime::Date)
            .map_err(|_| bad(format!("invalid date '{}'", value)));
    }

    let (digits, utc) = match value.strip_suffix(['Z', 'z']) {
        Some(rest) => (rest, true),
        None => (value, false),
    };
    let naive = NaiveDateTime::parse_from_str(digits, "%Y%m%dT%H%M%S")
        .map_err(|_| bad(format!("invalid date-time '{}'", value)))?;

    if utc {
        return Ok(EventTime::DateTime(naive.and_utc()));
    }
    match line.param("TZID") {
        Some(tzid) => {
            let tz = parse_time_zone(tzid)?;
            let local = tz
                .from_local_datetime(&naive)
                .earliest()
                .ok_or_else(|| bad(format!("{} does not exist in {}", naive, tzid)))?;
            Ok(EventTime::DateTime(local.with_timezone(&Utc)))
        }
        None => Ok(EventTime::DateTime(naive.and_utc())),
    }
}

/// Parse iCalendar text and return every VEVENT, wherever it is nested.
///
/// Events with an unreadable start or end are skipped with a warning, as are
/// lines without a `:`. Unbalanced BEGIN/END blocks are an error.
pub fn parse_calendar(text: &str) -> Result<Vec<CalendarEvent>> {
    let mut stack: Vec<String> = Vec::new();
    let mut events = Vec::new();
    let mut current: Option<(CalendarEvent, bool)> = None;

    for (line_no, raw) in unfold(text) {
        let line = match parse_content_line(&raw, line_no) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Skipping line: {}", e);
                continue;
            }
        };

        match line.name.as_str() {
            "BEGIN" => {
                let component = line.value.trim().to_ascii_uppercase();
                if component == "VEVENT" {
                    current = Some((CalendarEvent::default(), true));
                }
                stack.push(component);
                continue;
            }
            "END" => {
                let component = line.value.trim().to_ascii_uppercase();
                match stack.pop() {
                    Some(open) if open == component => {}
                    Some(open) => {
                        return Err(StargazeError::Ics {
                            line: line_no,
                            reason: format!("END:{} closes BEGIN:{}", component, open),
                        });
                    }
                    None => {
                        return Err(StargazeError::Ics {
                            line: line_no,
                            reason: format!("END:{} without BEGIN", component),
                        });
                    }
                }
                if component == "VEVENT" {
                    if let Some((event, valid)) = current.take() {
                        if valid {
                            events.push(event);
                        }
                    }
                }
                continue;
            }
            _ => {}
        }

        // Only properties that belong directly to a VEVENT
        if stack.last().map(String::as_str) != Some("VEVENT") {
            continue;
        }
        let Some((event, valid)) = current.as_mut() else {
            continue;
        };

        match line.name.as_str() {
            "DTSTART" | "DTEND" => match parse_event_time(&line, line_no) {
                Ok(time) if line.name == "DTSTART" => event.start = Some(time),
                Ok(time) => event.end = Some(time),
                Err(e) => {
                    tracing::warn!("Skipping event: {}", e);
                    *valid = false;
                }
            },
            "SUMMARY" => event.summary = Some(unescape_text(&line.value)),
            "DESCRIPTION" => event.description = Some(unescape_text(&line.value)),
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(StargazeError::Ics {
            line: 0,
            reason: format!("BEGIN:{} is never closed", open),
        });
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//EN\r\n\
BEGIN:VEVENT\r\n\
DTSTART:20260315T130000Z\r\n\
DTEND:20260315T150500Z\r\n\
SUMMARY:Milky Way\\, core\r\n\
DESCRIPTION:Lat 14.439 Lon 101.3725\\nMaxAlt ~42 deg\r\n\
BEGIN:VALARM\r\n\
DESCRIPTION:alarm text\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_parse_basic_event() {
        let events = parse_calendar(SAMPLE).unwrap();
        assert_eq!(events.len(), 1);
        let e = &events[0];
        assert_eq!(e.summary.as_deref(), Some("Milky Way, core"));
        assert_eq!(e.description.as_deref(), Some("Lat 14.439 Lon 101.3725\nMaxAlt ~42 deg"));
        let start = Utc.with_ymd_and_hms(2026, 3, 15, 13, 0, 0).unwrap();
        assert_eq!(e.start, Some(EventTime::DateTime(start)));
    }

    #[test]
    fn test_unfold_and_params() {
        let text = "BEGIN:VEVENT\nDTSTART;TZID=\"Asia/Bangkok\":20260401T200000\nSUMMARY:Long\n  title\nEND:VEVENT\n";
        let events = parse_calendar(text).unwrap();
        assert_eq!(events[0].summary.as_deref(), Some("Long title"));
        let start = Utc.with_ymd_and_hms(2026, 4, 1, 13, 0, 0).unwrap();
        assert_eq!(events[0].start, Some(EventTime::DateTime(start)));
    }

    #[test]
    fn test_date_and_floating_values() {
        let text = "BEGIN:VEVENT\nDTSTART;VALUE=DATE:20260501\nDTEND:20260502\nEND:VEVENT\n\
BEGIN:VEVENT\nDTSTART:20260601T010203\nEND:VEVENT\n";
        let events = parse_calendar(text).unwrap();
        assert_eq!(events[0].start, Some(EventTime::Date(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap())));
        assert_eq!(events[0].end, Some(EventTime::Date(NaiveDate::from_ymd_opt(2026, 5, 2).unwrap())));
        let floating = Utc.with_ymd_and_hms(2026, 6, 1, 1, 2, 3).unwrap();
        assert_eq!(events[1].start, Some(EventTime::DateTime(floating)));
        assert_eq!(events[1].end, None);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape_text(r"a\,b\;c\\d\Ne"), "a,b;c\\d\ne");
        assert_eq!(unescape_text("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_bad_event_skipped() {
        let text = "BEGIN:VEVENT\nDTSTART:not-a-date\nEND:VEVENT\nBEGIN:VEVENT\nDTSTART;TZID=Nowhere/Land:20260101T000000\nEND:VEVENT\nBEGIN:VEVENT\nSUMMARY:ok\nEND:VEVENT\n";
        let events = parse_calendar(text).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary.as_deref(), Some("ok"));
    }

    #[test]
    fn test_unbalanced_components() {
        assert!(parse_calendar("BEGIN:VCALENDAR\nBEGIN:VEVENT\nEND:VCALENDAR\n").is_err());
        assert!(parse_calendar("BEGIN:VCALENDAR\n").is_err());
        assert!(parse_calendar("END:VEVENT\n").is_err());
    }

    #[test]
    fn test_line_without_colon_is_skipped() {
        let text = "BEGIN:VCALENDAR\n\
BEGIN:VEVENT\n\
DTSTART:20260315T130000Z\n\
garbage without a separator\n\
SUMMARY:still parsed\n\
END:VEVENT\n\
BEGIN:VEVENT\n\
SUMMARY:second\n\
END:VEVENT\n\
END:VCALENDAR\n";
        let events = parse_calendar(text).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].summary.as_deref(), Some("still parsed"));
        assert!(events[0].start.is_some());
        assert_eq!(events[1].summary.as_deref(), Some("second"));

        assert!(parse_calendar("no colon here\n").unwrap().is_empty());
    }
}
