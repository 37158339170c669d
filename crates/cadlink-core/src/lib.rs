//! cadlink Core Pipeline
//!
//! This crate contains the CSV-to-geometry import pipeline:
//! - Unit: declared length units and millimeter conversion
//! - CsvPointParser: lazy, restartable parsing of `x,y,z` rows
//! - create_points: per-row point creation with an ordered report
//! - Export of document points back to CSV
//! - CadlinkConfig: RON configuration file

pub mod config;
pub mod constants;
pub mod export;
pub mod import;
pub mod units;

pub use config::*;
pub use constants::*;
pub use export::*;
pub use import::*;
pub use units::*;
