//! Import options for CSV point loading

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DELIMITER;
use crate::units::Unit;

/// How the first row of a CSV source is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeaderMode {
    /// Skip the first row when none of its fields is a number
    #[default]
    Detect,
    /// Always skip the first row
    Present,
    /// Never skip the first row
    Absent,
}

/// Options controlling how rows are split and the header is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Field delimiter byte
    pub delimiter: u8,
    /// Header handling for the first non-blank row
    pub header: HeaderMode,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            header: HeaderMode::Detect,
        }
    }
}

/// Import options for CSV point loading
///
/// There is no default unit: the caller always declares the unit the
/// coordinates are written in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportOptions {
    /// Unit the CSV coordinates are expressed in
    pub unit: Unit,
    /// Row splitting and header handling
    pub parse: ParseOptions,
}

impl ImportOptions {
    /// Create import options for coordinates in `unit`
    pub fn new(unit: Unit) -> Self {
        Self {
            unit,
            parse: ParseOptions::default(),
        }
    }

    /// Use a different field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.parse.delimiter = delimiter;
        self
    }

    /// Use a different header mode
    pub fn with_header(mut self, header: HeaderMode) -> Self {
        self.parse.header = header;
        self
    }
}
