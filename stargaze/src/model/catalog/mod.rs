//! Minor Planet Center comet catalog
//!
//! - `mpc`: fixed-column parser for `CometEls.txt`
//! - `fetch`: download with an on-disk fallback copy

pub mod fetch;
pub mod mpc;

pub use fetch::{load_comet_catalog, CatalogSource, MPC_COMET_URL};
pub use mpc::{parse_comet_catalog, CometElements};
