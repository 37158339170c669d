//! CSV point import
//!
//! Parses coordinate tables and materializes them as points in a host
//! document.

mod batch;
mod options;
mod parser;

use std::path::Path;

use cadlink_host::Document;

pub use batch::{ImportResult, RowOutcome, create_points};
pub use options::{HeaderMode, ImportOptions, ParseOptions};
pub use parser::{CoordinateRecord, CsvPointParser, Records, RowError, RowErrorKind};

/// Errors that abort an import before any row is processed
#[derive(Debug, Clone, thiserror::Error)]
pub enum ImportError {
    #[error("IO error reading '{path}': {reason}")]
    Io { path: String, reason: String },
}

/// Import points from CSV text into `document`
pub fn import_csv_str<D>(document: &mut D, source: &str, options: &ImportOptions) -> ImportResult
where
    D: Document + ?Sized,
{
    let parser = CsvPointParser::with_options(source, options.unit, options.parse);
    create_points(document, parser.records())
}

/// Import points from a CSV file into `document`
///
/// Only failing to read the file is fatal; bad rows are reported in the
/// returned [`ImportResult`].
pub fn import_csv_file<D>(
    document: &mut D,
    path: impl AsRef<Path>,
    options: &ImportOptions,
) -> Result<ImportResult, ImportError>
where
    D: Document + ?Sized,
{
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|e| ImportError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    tracing::info!(
        "Importing {:?} into '{}' (unit: {})",
        path,
        document.name(),
        options.unit
    );
    Ok(import_csv_str(document, &source, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Unit;
    use cadlink_host::{Application, DocumentKind, OfflineApplication};
    use glam::DVec3;
    use tempfile::tempdir;

    #[test]
    fn test_import_csv_file_semicolon() {
        let temp = tempdir().unwrap();
        let csv = temp.path().join("points.csv");
        std::fs::write(&csv, "x;y;z\n1;2;3\n0.5;0.25;0\n").unwrap();

        let app = OfflineApplication::new();
        let mut conn = app.connect().unwrap();
        let mut doc = conn.new_document(DocumentKind::Part).unwrap();

        let options = ImportOptions::new(Unit::Meter).with_delimiter(b';');
        let result = import_csv_file(doc.as_mut(), &csv, &options).unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.is_complete_success());
        let handles: Vec<_> = result.created().collect();
        assert_eq!(
            doc.point_coordinates(handles[1]).unwrap(),
            DVec3::new(500.0, 250.0, 0.0)
        );
    }

    #[test]
    fn test_import_missing_file() {
        let app = OfflineApplication::new();
        let mut conn = app.connect().unwrap();
        let mut doc = conn.new_document(DocumentKind::Part).unwrap();

        let result = import_csv_file(
            doc.as_mut(),
            "no/such/points.csv",
            &ImportOptions::new(Unit::Millimeter),
        );
        assert!(matches!(result, Err(ImportError::Io { .. })));
        assert_eq!(doc.point_count().unwrap(), 0);
    }

    #[test]
    fn test_import_into_read_only_document_reports_every_row() {
        let temp = tempdir().unwrap();
        let part = temp.path().join("locked.ron");
        cadlink_host::DocumentFile::new(DocumentKind::Part)
            .with_read_only(true)
            .save(&part)
            .unwrap();

        let app = OfflineApplication::new();
        let mut conn = app.connect().unwrap();
        let mut doc = conn.open_document(&part).unwrap();

        let result = import_csv_str(
            doc.as_mut(),
            "1,2,3\n4,5,6",
            &ImportOptions::new(Unit::Millimeter),
        );
        assert_eq!(result.len(), 2);
        assert!(result.errors().all(RowError::is_creation_failure));
    }
}
