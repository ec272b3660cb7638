pub mod catalog;
pub mod ephemeris;
