pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod module;

pub use error::{Result, StargazeError};
