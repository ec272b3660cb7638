//! Nightly Milky-Way core visibility dataset
//!
//! For each evening of a year, samples the sky from 18:00 to 06:00 local
//! time and records the span during which the galactic centre is up, the
//! sky is astronomically dark and the Moon is either down or a thin crescent.

pub mod scanner;

pub use scanner::{format_listing, window_from_samples, MilkyWayScanner, SkyConditions};
