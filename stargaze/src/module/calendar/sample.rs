use stargaze_common::NightWindow;

const SAMPLE_OCTOBER_2026: &[(&str, &str, &str)] = &[
    ("2026-10-01", "19:00", "21:10"),
    ("2026-10-02", "19:00", "21:10"),
    ("2026-10-03", "19:00", "21:00"),
    ("2026-10-04", "19:00", "21:00"),
    ("2026-10-05", "19:00", "21:00"),
    ("2026-10-06", "19:00", "20:50"),
    ("2026-10-07", "19:00", "20:50"),
    ("2026-10-08", "19:00", "20:40"),
    ("2026-10-09", "19:00", "20:40"),
    ("2026-10-10", "19:00", "20:40"),
    ("2026-10-11", "19:00", "20:30"),
    ("2026-10-12", "18:50", "20:30"),
    ("2026-10-13", "18:50", "20:20"),
    ("2026-10-14", "18:50", "20:20"),
    ("2026-10-28", "18:50", "19:20"),
    ("2026-10-29", "18:50", "19:20"),
    ("2026-10-30", "18:50", "19:20"),
];

/// October 2026 windows for the default site, used when no dataset is given.
pub fn sample_windows() -> Vec<NightWindow> {
    SAMPLE_OCTOBER_2026
        .iter()
        .map(|(date, start, end)| NightWindow::new(*date, *start, *end))
        .collect()
}
