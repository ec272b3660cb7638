//! Parser for the MPC one-line comet element format (`CometEls.txt`).
//!
//! Column layout (0-based, end exclusive):
//!
//! | field                | columns  |
//! |----------------------|----------|
//! | periodic number      | 0..4     |
//! | orbit type           | 4..5     |
//! | packed designation   | 5..12    |
//! | perihelion y / m / d | 14..18, 19..21, 22..29 |
//! | q, e                 | 30..39, 41..49 |
//! | ω, Ω, i (J2000)      | 51..59, 61..69, 71..79 |
//! | epoch y m d          | 81..85, 85..87, 87..89 |
//! | g, k                 | 91..95, 96..100 |
//! | designation          | 102..158 |
//! | reference            | 159..    |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{Result, StargazeError};
use crate::model::ephemeris::CometOrbit;

const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// One comet's osculating elements as published by the MPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CometElements {
    pub number: Option<u32>,
    pub orbit_type: String,
    pub designation_packed: String,
    pub perihelion_year: i32,
    pub perihelion_month: u32,
    /// Day of month with fraction, TT
    pub perihelion_day: f64,
    pub perihelion_distance_au: f64,
    pub eccentricity: f64,
    pub argument_of_perihelion_degrees: f64,
    pub longitude_of_ascending_node_degrees: f64,
    pub inclination_degrees: f64,
    pub perturbed_epoch: Option<NaiveDate>,
    /// Absolute total magnitude
    pub magnitude_g: Option<f64>,
    /// Activity slope parameter
    pub magnitude_k: Option<f64>,
    pub designation: String,
    pub reference: String,
}

impl CometElements {
    /// Display name: the readable designation, or the packed one if absent.
    pub fn name(&self) -> &str {
        if self.designation.is_empty() {
            &self.designation_packed
        } else {
            &self.designation
        }
    }

    /// Perihelion passage as a TT Julian date.
    pub fn perihelion_jd_tt(&self) -> Result<f64> {
        let first = NaiveDate::from_ymd_opt(self.perihelion_year, self.perihelion_month, 1)
            .ok_or_else(|| {
                StargazeError::InvalidTime(format!(
                    "perihelion {}-{:02}",
                    self.perihelion_year, self.perihelion_month
                ))
            })?;
        let days_since_epoch = first.signed_duration_since(unix_epoch()).num_days() as f64;
        Ok(UNIX_EPOCH_JD + days_since_epoch + (self.perihelion_day - 1.0))
    }

    pub fn orbit(&self) -> Result<CometOrbit> {
        CometOrbit::new(
            self.perihelion_distance_au,
            self.eccentricity,
            self.inclination_degrees,
            self.longitude_of_ascending_node_degrees,
            self.argument_of_perihelion_degrees,
            self.perihelion_jd_tt()?,
        )
    }

    /// Parse one catalog line. `line_no` is only used for error messages.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self> {
        let chars: Vec<char> = line.chars().collect();
        let field = |start: usize, end: usize| -> String {
            if start >= chars.len() {
                return String::new();
            }
            chars[start..end.min(chars.len())].iter().collect::<String>().trim().to_string()
        };
        let required = |start: usize, end: usize, name: &str| -> Result<f64> {
            let raw = field(start, end);
            raw.parse::<f64>().map_err(|_| StargazeError::CatalogLine {
                line: line_no,
                reason: format!("bad {} '{}'", name, raw),
            })
        };
        let optional = |start: usize, end: usize| -> Option<f64> {
            let raw = field(start, end);
            if raw.is_empty() { None } else { raw.parse::<f64>().ok() }
        };

        let perihelion_year: i32 = parse_integer(&field(14, 18), "perihelion year", line_no)?;
        let perihelion_month: u32 = parse_integer(&field(19, 21), "perihelion month", line_no)?;
        if !(1..=12).contains(&perihelion_month) {
            return Err(StargazeError::CatalogLine {
                line: line_no,
                reason: format!("perihelion month {} out of range", perihelion_month),
            });
        }

        let perturbed_epoch = {
            let (y, m, d) = (field(81, 85), field(85, 87), field(87, 89));
            match (y.parse::<i32>(), m.parse::<u32>(), d.parse::<u32>()) {
                (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d),
                _ => None,
            }
        };

        Ok(Self {
            number: field(0, 4).trim_start_matches('0').parse().ok(),
            orbit_type: field(4, 5),
            designation_packed: field(5, 12),
            perihelion_year,
            perihelion_month,
            perihelion_day: required(22, 29, "perihelion day")?,
            perihelion_distance_au: required(30, 39, "perihelion distance")?,
            eccentricity: required(41, 49, "eccentricity")?,
            argument_of_perihelion_degrees: required(51, 59, "argument of perihelion")?,
            longitude_of_ascending_node_degrees: required(61, 69, "ascending node")?,
            inclination_degrees: required(71, 79, "inclination")?,
            perturbed_epoch,
            magnitude_g: optional(91, 95),
            magnitude_k: optional(96, 100),
            designation: field(102, 158),
            reference: field(159, chars.len().max(159)),
        })
    }
}

fn parse_integer<T: FromStr>(raw: &str, name: &str, line_no: usize) -> Result<T> {
    raw.parse::<T>().map_err(|_| StargazeError::CatalogLine {
        line: line_no,
        reason: format!("bad {} '{}'", name, raw),
    })
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Parse a whole catalog, skipping (and logging) malformed lines.
pub fn parse_comet_catalog(text: &str) -> Vec<CometElements> {
    let mut comets = Vec::new();
    let mut skipped = 0;

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match CometElements::parse_line(line, index + 1) {
            Ok(elements) => comets.push(elements),
            Err(e) => {
                skipped += 1;
                warn!("Skipping catalog line: {}", e);
            }
        }
    }

    debug!("Parsed {} comets, skipped {} lines", comets.len(), skipped);
    comets
}
