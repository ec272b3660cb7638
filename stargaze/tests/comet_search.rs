use stargaze::cli::run_comets;
use stargaze::config::CometConfig;
use stargaze_common::CometReport;

// Two synthetic comets reaching perihelion on 2026-01-20, listed fainter first,
// followed by 1P/Halley (far too faint in 2026) and a malformed line.
const CATALOG: &str = "    CK26A020  2026 01 20.0000  0.900000  0.990000  180.0000  330.0000   30.0000  20251201   8.0  4.0  C/2026 A2 (Dawn Test)                                    MPC 00002
    CK26A010  2026 01 20.0000  0.900000  0.990000    0.0000   90.0000   90.0000  20251201   5.0  4.0  C/2026 A1 (Evening Test)                                 MPC 00001
0001P         1986 02  9.4589  0.574914  0.967143  111.8657   59.3987  162.1877  19860205   4.0  6.0  1P/Halley                                                98, 1086
not a comet line
";

fn config(dir: &std::path::Path) -> CometConfig {
    let catalog = dir.join("CometEls.txt");
    std::fs::write(&catalog, CATALOG).unwrap();
    CometConfig {
        start_month: 1,
        end_month: 3,
        catalog_path: Some(catalog),
        output_dir: dir.join("reports"),
        ..CometConfig::default()
    }
}

#[tokio::test]
async fn test_local_catalog_search_writes_sorted_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());

    run_comets(&config, dir.path()).await.unwrap();

    let path = dir.path().join("reports").join("comets_2026_month_01-03.json");
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("[\n    {"), "{}", &text[..20.min(text.len())]);
    let reports: Vec<CometReport> = serde_json::from_str(&text).unwrap();

    let january: Vec<&CometReport> = reports.iter().filter(|r| r.month == 1).collect();
    assert_eq!(january.len(), 2);
    assert_eq!(january[0].name, "C/2026 A1 (Evening Test)");
    assert_eq!(january[0].visibility_period, "Evening (20:00)");
    assert_eq!(january[1].name, "C/2026 A2 (Dawn Test)");
    assert_eq!(january[1].visibility_period, "Pre-dawn (04:00)");

    assert!(reports.iter().all(|r| (1..=3).contains(&r.month) && r.year == 2026));
    assert!(reports.iter().all(|r| r.name != "1P/Halley"));
    for pair in reports.windows(2) {
        assert!(
            pair[0].month < pair[1].month
                || (pair[0].month == pair[1].month && pair[0].magnitude <= pair[1].magnitude)
        );
    }
}

#[tokio::test]
async fn test_no_json_flag_skips_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = CometConfig {
        save_json: false,
        ..config(dir.path())
    };

    run_comets(&config, dir.path()).await.unwrap();
    assert!(!dir.path().join("reports").exists());
}

#[tokio::test]
async fn test_missing_local_catalog_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = CometConfig {
        catalog_path: Some(dir.path().join("missing.txt")),
        output_dir: dir.path().join("reports"),
        ..CometConfig::default()
    };
    assert!(run_comets(&config, dir.path()).await.is_err());
}
