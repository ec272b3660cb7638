use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

use super::types::ScheduleRow;

pub const SCHEDULE_COLUMNS: [&str; 9] = [
    "Date",
    "Time Start",
    "Time End",
    "Duration (Minutes)",
    "Max Altitude (deg)",
    "Event Name",
    "Latitude",
    "Longitude",
    "Raw Description",
];

/// A spreadsheet cell; `Empty` stays blank
#[derive(Debug, Clone, PartialEq)]
enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Empty,
}

impl Cell<'_> {
    fn to_csv_field(&self) -> String {
        match self {
            Cell::Text(s) => s.to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

fn number<T: Into<f64>>(value: Option<T>) -> Cell<'static> {
    value.map_or(Cell::Empty, |v| Cell::Number(v.into()))
}

fn cells(row: &ScheduleRow) -> [Cell<'_>; 9] {
    [
        Cell::Text(&row.date),
        Cell::Text(&row.time_start),
        Cell::Text(&row.time_end),
        number(row.duration_minutes.map(|m| m as f64)),
        number(row.max_altitude.map(|a| a as f64)),
        Cell::Text(&row.event_name),
        number(row.latitude),
        number(row.longitude),
        Cell::Text(&row.raw_description),
    ]
}

/// Write rows to `path`; the extension picks the format (`.xlsx` or `.csv`).
pub fn export_rows(rows: &[ScheduleRow], path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" => write_xlsx(rows, path),
        "csv" => write_csv(rows, path),
        other => anyhow::bail!("Unsupported output format '{}' (use .xlsx or .csv)", other),
    }
}

fn write_csv(rows: &[ScheduleRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(SCHEDULE_COLUMNS)?;
    for row in rows {
        writer.write_record(cells(row).iter().map(Cell::to_csv_field))?;
    }
    writer.flush().context("Failed to flush CSV")?;
    Ok(())
}

fn write_xlsx(rows: &[ScheduleRow], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    for (col, title) in SCHEDULE_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        for (col, cell) in cells(row).iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(s) => {
                    worksheet.write_string(r, col, *s)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(r, col, *n)?;
                }
                Cell::Empty => {}
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(())
}
