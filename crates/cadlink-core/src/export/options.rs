//! Export options for point tables

use crate::constants::DEFAULT_DELIMITER;
use crate::units::Unit;

/// Export options for point tables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Unit written to the file (points are stored in millimeters)
    pub unit: Unit,
    /// Field delimiter byte
    pub delimiter: u8,
    /// Whether to write an `x,y,z` header row
    pub write_header: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            unit: Unit::Millimeter,
            delimiter: DEFAULT_DELIMITER,
            write_header: true,
        }
    }
}
