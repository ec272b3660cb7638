//! Calendar chart renderer
//!
//! Builds the chart as SVG from `resources/calendar_template.svg` and
//! rasterises it with resvg.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use resvg::tiny_skia;
use resvg::usvg::{fontdb, Options, Tree};
use fontdb::Database;
use stargaze_common::NightWindow;

use super::chart::{month_boundaries, prepare_rows, ChartRow};
use crate::config::CalendarConfig;

const BUILTIN_TEMPLATE: &str = include_str!("../../../resources/calendar_template.svg");

const X_MIN: f64 = 18.0;
const X_MAX: f64 = 30.5;
const X_TICKS: [(f64, &str); 13] = [
    (18.0, "18:00"),
    (19.0, "19:00"),
    (20.0, "20:00"),
    (21.0, "21:00"),
    (22.0, "22:00"),
    (23.0, "23:00"),
    (24.0, "00:00"),
    (25.0, "01:00"),
    (26.0, "02:00"),
    (27.0, "03:00"),
    (28.0, "04:00"),
    (29.0, "05:00"),
    (30.0, "06:00"),
];
const MIDNIGHT: f64 = 24.0;
const LABEL_OFFSET_HOURS: f64 = 0.1;
const PLAIN_BACKGROUND: &str = "#1a1a2e";

/// Pixel layout of the chart
#[derive(Debug, Clone, Copy)]
struct ChartGeometry {
    width:  f64,
    height: f64,
    plot_x: f64,
    plot_y: f64,
    plot_w: f64,
    plot_h: f64,
    rows:   usize,
}

impl ChartGeometry {
    const DPI: f64 = 150.0;
    const WIDTH_IN: f64 = 15.0;
    const MIN_HEIGHT_IN: f64 = 8.0;
    const ROW_HEIGHT_IN: f64 = 0.4;
    const BAR_HEIGHT: f64 = 0.6;

    const MARGIN_LEFT: f64 = 120.0;
    const MARGIN_RIGHT: f64 = 40.0;
    const MARGIN_TOP: f64 = 110.0;
    const MARGIN_BOTTOM: f64 = 30.0;

    fn new(rows: usize) -> Self {
        let width = Self::WIDTH_IN * Self::DPI;
        let height = (rows as f64 * Self::ROW_HEIGHT_IN).max(Self::MIN_HEIGHT_IN) * Self::DPI;
        Self {
            width,
            height,
            plot_x: Self::MARGIN_LEFT,
            plot_y: Self::MARGIN_TOP,
            plot_w: width - Self::MARGIN_LEFT - Self::MARGIN_RIGHT,
            plot_h: height - Self::MARGIN_TOP - Self::MARGIN_BOTTOM,
            rows,
        }
    }

    fn x(&self, value: f64) -> f64 {
        self.plot_x + (value - X_MIN) / (X_MAX - X_MIN) * self.plot_w
    }

    /// Height of one row band; row 0 is at the top
    fn band(&self) -> f64 {
        self.plot_h / self.rows.max(1) as f64
    }

    fn row_center(&self, index: usize) -> f64 {
        self.plot_y + (index as f64 + 0.5) * self.band()
    }

    fn bottom(&self) -> f64 {
        self.plot_y + self.plot_h
    }
}

/// Read a JSON array of nightly windows.
pub async fn load_windows(path: &Path) -> Result<Vec<NightWindow>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse dataset {}", path.display()))
}

pub struct CalendarRenderer {
    template_path:    PathBuf,
    fonts_dir:        PathBuf,
    font_family:      String,
    background_image: PathBuf,
}

impl CalendarRenderer {
    pub fn new(config: &CalendarConfig) -> Self {
        Self {
            template_path:    config.template_path.clone(),
            fonts_dir:        config.fonts_dir.clone(),
            font_family:      config.font_family.clone(),
            background_image: config.background_image.clone(),
        }
    }

    /// Render `windows` to a PNG at `output_path`.
    pub async fn render(&self, windows: &[NightWindow], output_path: &Path) -> Result<PathBuf> {
        if windows.is_empty() {
            anyhow::bail!("No nightly windows to plot");
        }

        let rows = prepare_rows(windows).context("Invalid dataset row")?;
        let background = self.background().await;
        let svg = self.build_svg(&rows, background.as_deref()).await?;

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create output directory")?;
        }

        let resources_dir = background
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf);
        render_svg_to_png(&svg, output_path, &self.fonts_dir, &self.font_family, resources_dir).await?;

        tracing::info!("Generated Milky Way calendar: {:?} ({} rows)", output_path, rows.len());
        Ok(output_path.to_path_buf())
    }

    /// Absolute path of the background image, or None (with a warning) when it is missing.
    async fn background(&self) -> Option<PathBuf> {
        match tokio::fs::canonicalize(&self.background_image).await {
            Ok(path) => Some(path),
            Err(_) => {
                tracing::warn!(
                    "Image file '{}' not found. Using dark background.",
                    self.background_image.display()
                );
                None
            }
        }
    }

    async fn template(&self) -> String {
        match tokio::fs::read_to_string(&self.template_path).await {
            Ok(text) => text,
            Err(_) => {
                tracing::debug!(
                    "Template {} not readable, using built-in copy",
                    self.template_path.display()
                );
                BUILTIN_TEMPLATE.to_string()
            }
        }
    }

    async fn build_svg(&self, rows: &[ChartRow], background: Option<&Path>) -> Result<String> {
        let g = ChartGeometry::new(rows.len());

        let svg = self
            .template()
            .await
            .replace("{{WIDTH}}",           &format!("{:.0}", g.width))
            .replace("{{HEIGHT}}",          &format!("{:.0}", g.height))
            .replace("{{PLOT_BACKGROUND}}", &Self::plot_background(&g, background))
            .replace("{{GRID}}",            &Self::grid_lines(&g))
            .replace("{{SEPARATORS}}",      &Self::separators(&g, rows))
            .replace("{{MIDNIGHT}}",        &Self::midnight_line(&g))
            .replace("{{BARS}}",            &Self::bars(&g, rows))
            .replace("{{BAR_LABELS}}",      &Self::bar_labels(&g, rows))
            .replace("{{PLOT_X}}",          &format!("{:.1}", g.plot_x))
            .replace("{{PLOT_Y}}",          &format!("{:.1}", g.plot_y))
            .replace("{{PLOT_W}}",          &format!("{:.1}", g.plot_w))
            .replace("{{PLOT_H}}",          &format!("{:.1}", g.plot_h))
            .replace("{{X_TICKS}}",         &Self::x_ticks(&g))
            .replace("{{Y_TICKS}}",         &Self::y_ticks(&g, rows))
            .replace("{{TITLE_X}}",         &format!("{:.1}", g.plot_x + g.plot_w / 2.0))
            .replace("{{TITLE_Y}}",         &format!("{:.1}", g.plot_y - 62.0));

        Ok(svg)
    }

    fn plot_background(g: &ChartGeometry, background: Option<&Path>) -> String {
        match background {
            Some(path) => format!(
                r#"<image x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" preserveAspectRatio="none" opacity="0.5" xlink:href="{href}"/>"#,
                x    = g.plot_x,
                y    = g.plot_y,
                w    = g.plot_w,
                h    = g.plot_h,
                href = escape_xml(&path.to_string_lossy()),
            ),
            None => format!(
                r#"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="{fill}"/>"#,
                x    = g.plot_x,
                y    = g.plot_y,
                w    = g.plot_w,
                h    = g.plot_h,
                fill = PLAIN_BACKGROUND,
            ),
        }
    }

    fn grid_lines(g: &ChartGeometry) -> String {
        X_TICKS
            .iter()
            .map(|(value, _)| {
                let x = g.x(*value);
                format!(
                    r#"<line x1="{x:.1}" y1="{top:.1}" x2="{x:.1}" y2="{bottom:.1}"/>"#,
                    top    = g.plot_y,
                    bottom = g.bottom(),
                )
            })
            .collect()
    }

    fn separators(g: &ChartGeometry, rows: &[ChartRow]) -> String {
        month_boundaries(rows)
            .into_iter()
            .map(|i| {
                let y = g.plot_y + (i + 1) as f64 * g.band();
                format!(
                    r#"<line x1="{left:.1}" y1="{y:.1}" x2="{right:.1}" y2="{y:.1}"/>"#,
                    left  = g.plot_x,
                    right = g.plot_x + g.plot_w,
                )
            })
            .collect()
    }

    fn midnight_line(g: &ChartGeometry) -> String {
        let x = g.x(MIDNIGHT);
        format!(
            r##"<line x1="{x:.1}" y1="{top:.1}" x2="{x:.1}" y2="{bottom:.1}" stroke="#00BFFF" stroke-opacity="0.8" stroke-width="3"/>"##,
            top    = g.plot_y,
            bottom = g.bottom(),
        )
    }

    fn bars(g: &ChartGeometry, rows: &[ChartRow]) -> String {
        let height = g.band() * ChartGeometry::BAR_HEIGHT;
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                let x = g.x(row.start);
                let width = (g.x(row.end) - x).max(0.0);
                format!(
                    r#"<rect x="{x:.1}" y="{y:.1}" width="{width:.1}" height="{height:.1}"/>"#,
                    y = g.row_center(i) - height / 2.0,
                )
            })
            .collect()
    }

    fn bar_labels(g: &ChartGeometry, rows: &[ChartRow]) -> String {
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                format!(
                    r#"<text x="{x:.1}" y="{y:.1}">{label}</text>"#,
                    x     = g.x(row.end + LABEL_OFFSET_HOURS),
                    y     = g.row_center(i),
                    label = escape_xml(&row.duration_label()),
                )
            })
            .collect()
    }

    fn x_ticks(g: &ChartGeometry) -> String {
        X_TICKS
            .iter()
            .map(|(value, label)| {
                format!(
                    r#"<text x="{x:.1}" y="{y:.1}">{label}</text>"#,
                    x = g.x(*value),
                    y = g.plot_y - 14.0,
                )
            })
            .collect()
    }

    fn y_ticks(g: &ChartGeometry, rows: &[ChartRow]) -> String {
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                format!(
                    r#"<text x="{x:.1}" y="{y:.1}">{label}</text>"#,
                    x     = g.plot_x - 12.0,
                    y     = g.row_center(i),
                    label = escape_xml(&row.date_label()),
                )
            })
            .collect()
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Render SVG to PNG
async fn render_svg_to_png(
    svg_content: &str,
    output_path: &Path,
    fonts_dir: &Path,
    font_family: &str,
    resources_dir: Option<PathBuf>,
) -> Result<()> {
    let mut fontdb = Database::new();
    fontdb.load_system_fonts();
    if fonts_dir.is_dir() {
        fontdb.load_fonts_dir(fonts_dir);
    }
    tracing::debug!("Loaded {} font faces", fontdb.len());

    let mut options = Options::default();
    options.font_family = font_family.to_string();
    options.resources_dir = resources_dir;
    options.fontdb = Arc::new(fontdb);

    let tree = Tree::from_str(svg_content, &options)
        .context("Failed to parse SVG")?;

    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .context("Failed to create pixmap")?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap.save_png(output_path)
        .context("Failed to save PNG")?;

    Ok(())
}
