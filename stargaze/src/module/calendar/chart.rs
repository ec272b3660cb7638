use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use stargaze_common::NightWindow;

/// Hours past midnight of the evening date; morning times continue past 24.
pub fn time_to_plot_value(time: &str) -> Result<f64> {
    let (h, m) = time
        .split_once(':')
        .with_context(|| format!("Invalid time '{}'", time))?;
    let h: u32 = h.trim().parse().with_context(|| format!("Invalid hour in '{}'", time))?;
    let m: u32 = m.trim().parse().with_context(|| format!("Invalid minute in '{}'", time))?;
    if h > 23 || m > 59 {
        anyhow::bail!("Time out of range '{}'", time);
    }

    let value = h as f64 + m as f64 / 60.0;
    Ok(if value < 12.0 { value + 24.0 } else { value })
}

/// Evening a window belongs to: windows starting before noon count for the previous date.
pub fn night_date(window: &NightWindow) -> Result<NaiveDate> {
    let date = window
        .parse_date()
        .with_context(|| format!("Invalid date '{}'", window.date))?;
    let hour: u32 = window
        .start
        .split(':')
        .next()
        .and_then(|h| h.trim().parse().ok())
        .with_context(|| format!("Invalid start time '{}'", window.start))?;

    Ok(if hour < 12 { date - Duration::days(1) } else { date })
}

/// One bar of the chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub night_date: NaiveDate,
    pub start: f64,
    pub end: f64,
}

impl ChartRow {
    pub fn duration_hours(&self) -> f64 {
        self.end - self.start
    }

    /// "{minutes} mins", rounded to the nearest minute
    pub fn duration_label(&self) -> String {
        format!("{} mins", (self.duration_hours() * 60.0).round() as i64)
    }

    /// Y axis label, e.g. "01 Oct"
    pub fn date_label(&self) -> String {
        self.night_date.format("%d %b").to_string()
    }
}

/// Convert and sort windows by night date (stable for equal dates).
pub fn prepare_rows(windows: &[NightWindow]) -> Result<Vec<ChartRow>> {
    let mut rows = windows
        .iter()
        .map(|w| {
            Ok(ChartRow {
                night_date: night_date(w)?,
                start:      time_to_plot_value(&w.start)?,
                end:        time_to_plot_value(&w.end)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    rows.sort_by_key(|r| r.night_date);
    Ok(rows)
}

/// Indices `i` where the month changes between row `i` and row `i + 1`.
pub fn month_boundaries(rows: &[ChartRow]) -> Vec<usize> {
    rows.windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0].night_date.month() != pair[1].night_date.month())
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_time_to_plot_value() {
        assert_abs_diff_eq!(time_to_plot_value("19:30").unwrap(), 19.5);
        assert_abs_diff_eq!(time_to_plot_value("12:00").unwrap(), 12.0);
        assert_abs_diff_eq!(time_to_plot_value("00:00").unwrap(), 24.0);
        assert_abs_diff_eq!(time_to_plot_value("04:40").unwrap(), 28.0 + 40.0 / 60.0);
        assert!(time_to_plot_value("7pm").is_err());
        assert!(time_to_plot_value("25:00").is_err());
    }

    #[test]
    fn test_night_date_rolls_back_after_midnight() {
        let evening = NightWindow::new("2026-03-02", "19:10", "21:00");
        assert_eq!(night_date(&evening).unwrap(), NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());

        let morning = NightWindow::new("2026-03-01", "03:40", "05:10");
        assert_eq!(night_date(&morning).unwrap(), NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    }

    #[test]
    fn test_rows_sorted_with_labels() {
        let windows = vec![
            NightWindow::new("2026-10-02", "19:00", "21:10"),
            NightWindow::new("2026-10-01", "23:20", "01:30"),
            NightWindow::new("2026-10-01", "03:00", "04:00"),
        ];
        let rows = prepare_rows(&windows).unwrap();
        let labels: Vec<_> = rows.iter().map(|r| r.date_label()).collect();
        assert_eq!(labels, ["30 Sep", "01 Oct", "02 Oct"]);

        assert_eq!(rows[1].duration_label(), "130 mins");
        assert_eq!(rows[2].duration_label(), "130 mins");
        assert_eq!(rows[0].duration_label(), "60 mins");
    }

    #[test]
    fn test_month_boundaries() {
        let windows = vec![
            NightWindow::new("2026-09-29", "19:00", "20:00"),
            NightWindow::new("2026-09-30", "19:00", "20:00"),
            NightWindow::new("2026-10-01", "19:00", "20:00"),
            NightWindow::new("2026-11-01", "19:00", "20:00"),
        ];
        let rows = prepare_rows(&windows).unwrap();
        assert_eq!(month_boundaries(&rows), vec![1, 2]);
    }
}
