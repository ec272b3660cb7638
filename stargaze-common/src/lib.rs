pub mod types;

pub use types::{round_to, ClosestApproach, CometReport, NightWindow};
