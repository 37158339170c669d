//! CSV point parsing
//!
//! Turns delimiter-separated `x,y,z` rows into millimeter coordinate records.
//! Bad rows become [`RowError`]s in the output sequence instead of stopping
//! the parse.

use std::iter::Enumerate;
use std::str::Lines;

use cadlink_host::CreationError;
use csv::StringRecord;
use glam::DVec3;

use super::options::{HeaderMode, ParseOptions};
use crate::constants::COORDINATE_COLUMNS;
use crate::units::Unit;

/// A validated point row, scaled to millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateRecord {
    row: usize,
    line: usize,
    position: DVec3,
    unit: Unit,
}

impl CoordinateRecord {
    /// 0-based data row index (header and blank lines not counted)
    pub fn row(&self) -> usize {
        self.row
    }

    /// 1-based line number in the source text
    pub fn line(&self) -> usize {
        self.line
    }

    /// Position in millimeters
    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn z(&self) -> f64 {
        self.position.z
    }

    /// Unit the row was declared in
    pub fn unit(&self) -> Unit {
        self.unit
    }
}

/// Why a row produced no point
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowErrorKind {
    #[error("expected 3 fields, found {found}")]
    MalformedRow { found: usize },

    #[error("invalid number '{token}' in column {column}")]
    InvalidNumber { column: usize, token: String },

    #[error("point creation failed: {0}")]
    CreationFailed(CreationError),

    /// The line could not be split into fields (e.g. a delimiter byte
    /// that cuts a multi-byte character)
    #[error("unreadable row: {0}")]
    Unreadable(String),
}

/// A per-row failure, reported rather than raised
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("row {row} (line {line}): {kind}")]
pub struct RowError {
    /// 0-based data row index
    pub row: usize,
    /// 1-based line number in the source text
    pub line: usize,
    pub kind: RowErrorKind,
}

impl RowError {
    pub fn new(row: usize, line: usize, kind: RowErrorKind) -> Self {
        Self { row, line, kind }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self.kind, RowErrorKind::MalformedRow { .. })
    }

    pub fn is_invalid_number(&self) -> bool {
        matches!(self.kind, RowErrorKind::InvalidNumber { .. })
    }

    pub fn is_creation_failure(&self) -> bool {
        matches!(self.kind, RowErrorKind::CreationFailed(_))
    }
}

/// Parser over a borrowed CSV source
///
/// Every call to [`CsvPointParser::records`] starts from the beginning of the
/// source and yields the same sequence.
#[derive(Debug, Clone, Copy)]
pub struct CsvPointParser<'a> {
    source: &'a str,
    unit: Unit,
    options: ParseOptions,
}

impl<'a> CsvPointParser<'a> {
    /// Create a parser with default options (comma, header detection)
    pub fn new(source: &'a str, unit: Unit) -> Self {
        Self::with_options(source, unit, ParseOptions::default())
    }

    /// Create a parser with custom options
    pub fn with_options(source: &'a str, unit: Unit, options: ParseOptions) -> Self {
        Self {
            source: source.strip_prefix('\u{feff}').unwrap_or(source),
            unit,
            options,
        }
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Lazy sequence of parsed rows
    pub fn records(&self) -> Records<'a> {
        Records {
            lines: self.source.lines().enumerate(),
            unit: self.unit,
            options: self.options,
            header_checked: false,
            next_row: 0,
        }
    }

    /// Check whether the first non-blank row is skipped as a header
    pub fn has_header(&self) -> bool {
        let Some(first) = self.source.lines().find(|l| !is_blank(l)) else {
            return false;
        };
        match self.options.header {
            HeaderMode::Present => true,
            HeaderMode::Absent => false,
            HeaderMode::Detect => split_fields(first, self.options.delimiter)
                .is_ok_and(|fields| looks_like_header(&fields)),
        }
    }
}

impl<'a> IntoIterator for &CsvPointParser<'a> {
    type Item = Result<CoordinateRecord, RowError>;
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.records()
    }
}

/// Iterator returned by [`CsvPointParser::records`]
#[derive(Debug, Clone)]
pub struct Records<'a> {
    lines: Enumerate<Lines<'a>>,
    unit: Unit,
    options: ParseOptions,
    header_checked: bool,
    next_row: usize,
}

impl Records<'_> {
    fn take_row(&mut self) -> usize {
        let row = self.next_row;
        self.next_row += 1;
        row
    }
}

impl Iterator for Records<'_> {
    type Item = Result<CoordinateRecord, RowError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, raw) = self.lines.next()?;
            if is_blank(raw) {
                continue;
            }
            let line = index + 1;

            let fields = match split_fields(raw, self.options.delimiter) {
                Ok(fields) => fields,
                Err(e) => {
                    self.header_checked = true;
                    let row = self.take_row();
                    return Some(Err(RowError::new(
                        row,
                        line,
                        RowErrorKind::Unreadable(e.to_string()),
                    )));
                }
            };

            if !self.header_checked {
                self.header_checked = true;
                let skip = match self.options.header {
                    HeaderMode::Present => true,
                    HeaderMode::Absent => false,
                    HeaderMode::Detect => looks_like_header(&fields),
                };
                if skip {
                    tracing::debug!("Skipping CSV header on line {}: {:?}", line, raw);
                    continue;
                }
            }

            let row = self.take_row();
            return Some(parse_row(row, line, &fields, self.unit));
        }
    }
}

/// Whitespace-only lines are not rows
fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Split one source line into trimmed fields
///
/// Quotes carry no meaning; the delimiter is the only separator.
fn split_fields(line: &str, delimiter: u8) -> csv::Result<StringRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());

    let mut record = StringRecord::new();
    reader.read_record(&mut record)?;
    Ok(record)
}

/// A header row has no field that reads as a number
fn looks_like_header(fields: &StringRecord) -> bool {
    fields.iter().all(|f| f.parse::<f64>().is_err())
}

fn parse_row(
    row: usize,
    line: usize,
    fields: &StringRecord,
    unit: Unit,
) -> Result<CoordinateRecord, RowError> {
    if fields.len() != COORDINATE_COLUMNS {
        return Err(RowError::new(
            row,
            line,
            RowErrorKind::MalformedRow {
                found: fields.len(),
            },
        ));
    }

    let scale = unit.scale_to_millimeters();
    let mut values = [0.0_f64; COORDINATE_COLUMNS];
    for (column, (field, value)) in fields.iter().zip(values.iter_mut()).enumerate() {
        // Scaling can overflow a finite token (1e305 miles)
        let scaled = field
            .parse::<f64>()
            .ok()
            .map(|v| v * scale)
            .filter(|v| v.is_finite());

        *value = match scaled {
            Some(v) => v,
            None => {
                return Err(RowError::new(
                    row,
                    line,
                    RowErrorKind::InvalidNumber {
                        column,
                        token: field.to_string(),
                    },
                ));
            }
        };
    }

    Ok(CoordinateRecord {
        row,
        line,
        position: DVec3::from_array(values),
        unit,
    })
}
