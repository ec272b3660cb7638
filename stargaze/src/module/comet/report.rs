use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use stargaze_common::CometReport;

use crate::module::json::write_json_file;

/// Order by month, then brightest first.
pub fn sort_reports(reports: &mut [CometReport]) {
    reports.sort_by(|a, b| {
        a.month
            .cmp(&b.month)
            .then(a.magnitude.total_cmp(&b.magnitude))
    });
}

/// Console summary of a finished search.
pub fn format_summary(reports: &[CometReport], year: i32, start_month: u32, end_month: u32) -> String {
    let rule = "=".repeat(70);
    let mut out = format!(
        "\n{}\nComet search summary {} (months {}-{})\n{}\n",
        rule, year, start_month, end_month, rule
    );

    if reports.is_empty() {
        out.push_str("No photographable comets found in this period\n");
        return out;
    }

    for r in reports {
        out.push_str(&format!("Month {}: {}\n", r.month, r.name));
        out.push_str(&format!(
            "    Mag: {} | Alt: {}° | {}\n",
            r.magnitude, r.altitude_max, r.visibility_period
        ));
        out.push_str(&format!(
            "    (closest to Earth: {} @ {} AU)\n",
            r.closest_approach.date, r.closest_approach.distance_au
        ));
        out.push_str(&format!("{}\n", "-".repeat(30)));
    }
    out
}

/// Write the reports to `dir/file_name`; returns the written path.
pub async fn write_json_report(reports: &[CometReport], dir: &Path, file_name: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(file_name);
    write_json_file(reports, &path).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stargaze_common::ClosestApproach;

    fn report(month: u32, name: &str, magnitude: f64) -> CometReport {
        CometReport {
            month,
            year: 2026,
            name: name.to_string(),
            magnitude,
            altitude_max: 32.5,
            azimuth: 290.12,
            visibility_period: "Evening (20:00)".to_string(),
            check_date_local: "2026-01-15 20:00:00".to_string(),
            closest_approach: ClosestApproach {
                date:        "2026-02-01".to_string(),
                distance_au: 0.8123,
            },
        }
    }

    #[test]
    fn test_sort_by_month_then_magnitude() {
        let mut reports = vec![
            report(2, "B", 9.0),
            report(1, "C", 11.0),
            report(1, "A", 8.5),
        ];
        sort_reports(&mut reports);
        let names: Vec<_> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["A", "C", "B"]);
    }

    #[test]
    fn test_summary_lines() {
        let text = format_summary(&[report(1, "C/2025 A1 (Test)", 8.5)], 2026, 1, 3);
        assert!(text.contains("Comet search summary 2026 (months 1-3)"));
        assert!(text.contains("Month 1: C/2025 A1 (Test)"));
        assert!(text.contains("Mag: 8.5 | Alt: 32.5° | Evening (20:00)"));
        assert!(text.contains("2026-02-01 @ 0.8123 AU"));

        let empty = format_summary(&[], 2026, 1, 1);
        assert!(empty.contains("No photographable comets"));
    }

    #[tokio::test]
    async fn test_json_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json_report(&[report(1, "C/2025 Ω1", 8.5)], dir.path(), "comets_2026_month_01-01.json")
            .await
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n    {\n        \"month\": 1,"));
        assert!(text.contains("C/2025 Ω1"));

        let back: Vec<CometReport> = serde_json::from_str(&text).unwrap();
        assert_eq!(back[0].closest_approach.distance_au, 0.8123);
    }
}
