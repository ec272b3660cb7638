//! Configuration loaded from `stargaze.toml`
//!
//! Every field has a serde default, so a missing file or a partial file both
//! yield a usable configuration. Command-line flags are applied on top by
//! `main` before the configuration is frozen in [`CONFIG`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono_tz::Tz;

use crate::error::StargazeError;
use crate::model::ephemeris::Observer;

pub const DEFAULT_CONFIG_PATH: &str = "stargaze.toml";

/// Observing site: coordinates plus the civil time zone used for reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Degrees, north positive
    pub latitude: f64,
    /// Degrees, east positive
    pub longitude: f64,

    #[serde(default)]
    pub elevation_m: f64,

    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_true")]
    pub refraction: bool,
}

impl SiteConfig {
    fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation_m: 0.0,
            timezone: default_timezone(),
            refraction: true,
        }
    }

    pub fn observer(&self) -> Observer {
        Observer {
            latitude:    self.latitude,
            longitude:   self.longitude,
            elevation_m: self.elevation_m,
            refraction:  self.refraction,
        }
    }

    pub fn time_zone(&self) -> Result<Tz, StargazeError> {
        parse_time_zone(&self.timezone)
    }
}

pub fn parse_time_zone(name: &str) -> Result<Tz, StargazeError> {
    name.parse::<Tz>()
        .map_err(|_| StargazeError::UnknownTimeZone(name.to_string()))
}

/// One observing slot on the night of the 15th
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSlot {
    pub label: String,
    /// Days after the 15th (0 = the 15th itself)
    #[serde(default)]
    pub day_offset: i64,
    /// Local clock time, "HH:MM"
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CometConfig {
    #[serde(default = "default_year")]
    pub year: i32,

    #[serde(default = "default_month")]
    pub start_month: u32,

    #[serde(default = "default_month")]
    pub end_month: u32,

    #[serde(default = "default_max_magnitude")]
    pub max_magnitude: f64,

    #[serde(default = "default_comet_min_altitude")]
    pub min_altitude: f64,

    #[serde(default = "default_comet_sun_limit")]
    pub sun_altitude_limit: f64,

    #[serde(default = "default_check_slots")]
    pub check_slots: Vec<CheckSlot>,

    #[serde(default = "default_true")]
    pub save_json: bool,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Local catalog file; when unset the MPC catalog is downloaded
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    #[serde(default = "default_comet_site")]
    pub observer: SiteConfig,
}

impl CometConfig {
    /// `comets_{year}_month_{start:02}-{end:02}.json`
    pub fn json_file_name(&self) -> String {
        format!(
            "comets_{}_month_{:02}-{:02}.json",
            self.year, self.start_month, self.end_month
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilkyWayConfig {
    #[serde(default = "default_year")]
    pub year: i32,

    #[serde(default = "default_milkyway_min_altitude")]
    pub min_altitude: f64,

    #[serde(default = "default_milkyway_sun_limit")]
    pub sun_altitude_limit: f64,

    #[serde(default = "default_moon_illumination_limit")]
    pub moon_illumination_limit: f64,

    #[serde(default = "default_step_minutes")]
    pub step_minutes: i64,

    /// Windows must be strictly longer than this
    #[serde(default = "default_min_window_minutes")]
    pub min_window_minutes: i64,

    #[serde(default)]
    pub output_json: Option<PathBuf>,

    #[serde(default = "default_milkyway_site")]
    pub observer: SiteConfig,
}

impl MilkyWayConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output_json
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("milkyway_{}.json", self.year)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// JSON dataset; the built-in sample is used when unset
    #[serde(default)]
    pub input_json: Option<PathBuf>,

    #[serde(default = "default_background")]
    pub background_image: PathBuf,

    #[serde(default = "default_calendar_output")]
    pub output_png: PathBuf,

    #[serde(default = "default_template")]
    pub template_path: PathBuf,

    #[serde(default = "default_fonts_dir")]
    pub fonts_dir: PathBuf,

    #[serde(default = "default_font_family")]
    pub font_family: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcsConfig {
    #[serde(default = "default_ics_input")]
    pub input: PathBuf,

    #[serde(default = "default_ics_output")]
    pub output: PathBuf,

    #[serde(default = "default_timezone")]
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StargazeConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Downloaded catalog copies live here
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub comet: CometConfig,

    #[serde(default)]
    pub milkyway: MilkyWayConfig,

    #[serde(default)]
    pub calendar: CalendarConfig,

    #[serde(default)]
    pub ics: IcsConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_timezone() -> String {
    "Asia/Bangkok".to_string()
}

fn default_true() -> bool {
    true
}

fn default_year() -> i32 {
    2026
}

fn default_month() -> u32 {
    1
}

fn default_max_magnitude() -> f64 {
    12.0
}

fn default_comet_min_altitude() -> f64 {
    15.0
}

fn default_comet_sun_limit() -> f64 {
    -12.0
}

fn default_check_slots() -> Vec<CheckSlot> {
    vec![
        CheckSlot {
            label:      "Evening (20:00)".to_string(),
            day_offset: 0,
            time:       "20:00".to_string(),
        },
        CheckSlot {
            label:      "Pre-dawn (04:00)".to_string(),
            day_offset: 1,
            time:       "04:00".to_string(),
        },
    ]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Doi Inthanon
fn default_comet_site() -> SiteConfig {
    SiteConfig::at(18.5558, 98.4822)
}

fn default_milkyway_min_altitude() -> f64 {
    10.0
}

fn default_milkyway_sun_limit() -> f64 {
    -18.0
}

fn default_moon_illumination_limit() -> f64 {
    0.2
}

fn default_step_minutes() -> i64 {
    10
}

fn default_min_window_minutes() -> i64 {
    20
}

fn default_milkyway_site() -> SiteConfig {
    SiteConfig::at(14.4390, 101.3725)
}

fn default_background() -> PathBuf {
    PathBuf::from("background_.jpg")
}

fn default_calendar_output() -> PathBuf {
    PathBuf::from("milkyway_.png")
}

fn default_template() -> PathBuf {
    PathBuf::from("resources/calendar_template.svg")
}

fn default_fonts_dir() -> PathBuf {
    PathBuf::from("fonts")
}

fn default_font_family() -> String {
    "DejaVu Sans".to_string()
}

fn default_ics_input() -> PathBuf {
    PathBuf::from("StarGazing.ics")
}

fn default_ics_output() -> PathBuf {
    PathBuf::from("StarGazing_Schedule.xlsx")
}

impl Default for CometConfig {
    fn default() -> Self {
        Self {
            year:               default_year(),
            start_month:        default_month(),
            end_month:          default_month(),
            max_magnitude:      default_max_magnitude(),
            min_altitude:       default_comet_min_altitude(),
            sun_altitude_limit: default_comet_sun_limit(),
            check_slots:        default_check_slots(),
            save_json:          true,
            output_dir:         default_output_dir(),
            catalog_path:       None,
            observer:           default_comet_site(),
        }
    }
}

impl Default for MilkyWayConfig {
    fn default() -> Self {
        Self {
            year:                    default_year(),
            min_altitude:            default_milkyway_min_altitude(),
            sun_altitude_limit:      default_milkyway_sun_limit(),
            moon_illumination_limit: default_moon_illumination_limit(),
            step_minutes:            default_step_minutes(),
            min_window_minutes:      default_min_window_minutes(),
            output_json:             None,
            observer:                default_milkyway_site(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            input_json:       None,
            background_image: default_background(),
            output_png:       default_calendar_output(),
            template_path:    default_template(),
            fonts_dir:        default_fonts_dir(),
            font_family:      default_font_family(),
        }
    }
}

impl Default for IcsConfig {
    fn default() -> Self {
        Self {
            input:    default_ics_input(),
            output:   default_ics_output(),
            timezone: default_timezone(),
        }
    }
}

impl Default for StargazeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir:   default_log_dir(),
            data_dir:  default_data_dir(),
            comet:     CometConfig::default(),
            milkyway:  MilkyWayConfig::default(),
            calendar:  CalendarConfig::default(),
            ics:       IcsConfig::default(),
        }
    }
}

impl StargazeConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: StargazeConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path`, falling back to defaults when the file does not exist.
    /// A file that exists but does not parse is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<(Self, bool)> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok((Self::default(), false));
        }
        let config = Self::from_file(path).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file {}: {}", path.display(), e)
        })?;
        Ok((config, true))
    }
}

pub static CONFIG: OnceLock<StargazeConfig> = OnceLock::new();

/// Freeze the final configuration for the rest of the process.
pub fn set_config(config: StargazeConfig) -> &'static StargazeConfig {
    CONFIG.get_or_init(|| config)
}
