//! File I/O action handlers

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::bail;
use cadlink_core::{ImportResult, Unit, delimiter_byte, export_points_csv, import_csv_file};
use cadlink_host::{DocumentKind, DocumentScope, with_session};
use glam::DVec3;

use super::ActionContext;

/// Outcome of an import command
#[derive(Debug)]
pub struct ImportReport {
    pub result: ImportResult,
    /// One line per failed row
    pub failures: Vec<String>,
    pub summary: String,
}

/// Import a CSV file into a document and save it
///
/// With `new`, a fresh part document is created and saved to `document`
/// (or `save_as`). Otherwise `document` is opened and saved in place unless
/// `save_as` is given.
pub fn handle_import(
    ctx: &ActionContext,
    document: &Path,
    csv: &Path,
    unit: Option<Unit>,
    delimiter: Option<char>,
    new: bool,
    save_as: Option<PathBuf>,
) -> anyhow::Result<ImportReport> {
    let mut options = ctx.config.import_options(unit)?;
    if let Some(delimiter) = delimiter {
        options.parse.delimiter = delimiter_byte(delimiter)?;
    }

    let scope = if new {
        DocumentScope::create(DocumentKind::Part)
    } else {
        DocumentScope::open(document)?
    };
    let save_path = save_as.or_else(|| new.then(|| document.to_path_buf()));

    with_session(ctx.application, |conn| {
        scope.run(conn, |doc| -> anyhow::Result<ImportReport> {
            let result = import_csv_file(doc, csv, &options)?;

            match &save_path {
                Some(path) => doc.save_as(path)?,
                None => doc.save()?,
            }

            let failures = result.errors().map(|e| e.to_string()).collect();
            let summary = format!(
                "Imported {} of {} rows into '{}' ({} failed)",
                result.success_count(),
                result.len(),
                doc.name(),
                result.failure_count()
            );

            Ok(ImportReport {
                result,
                failures,
                summary,
            })
        })
    })
}

/// Export the points of a document, returns the number of rows written
pub fn handle_export(
    ctx: &ActionContext,
    document: &Path,
    csv: &Path,
    unit: Option<Unit>,
    delimiter: Option<char>,
    no_header: bool,
) -> anyhow::Result<usize> {
    let mut options = ctx.config.export_options(unit)?;
    if let Some(delimiter) = delimiter {
        options.delimiter = delimiter_byte(delimiter)?;
    }
    if no_header {
        options.write_header = false;
    }

    let scope = DocumentScope::open(document)?;
    with_session(ctx.application, |conn| {
        scope.run(conn, |doc| -> anyhow::Result<usize> {
            Ok(export_points_csv(&*doc, csv, &options)?)
        })
    })
}

/// Summary of a document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub name: String,
    pub kind: DocumentKind,
    pub read_only: bool,
    pub point_count: usize,
    /// Axis-aligned bounds of all points (millimeters)
    pub bounds: Option<(DVec3, DVec3)>,
}

impl fmt::Display for DocumentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name:      {}", self.name)?;
        writeln!(f, "Kind:      {}", self.kind.name())?;
        writeln!(f, "Read-only: {}", self.read_only)?;
        write!(f, "Points:    {}", self.point_count)?;
        if let Some((min, max)) = self.bounds {
            write!(f, "\nBounds:    {} .. {} mm", min, max)?;
        }
        Ok(())
    }
}

/// Open a document and measure its points
pub fn handle_info(ctx: &ActionContext, document: &Path) -> anyhow::Result<DocumentInfo> {
    let scope = DocumentScope::open(document)?;
    with_session(ctx.application, |conn| {
        scope.run(conn, |doc| -> anyhow::Result<DocumentInfo> {
            let handles = doc.points()?;
            let mut bounds: Option<(DVec3, DVec3)> = None;
            for handle in &handles {
                let p = doc.point_coordinates(*handle)?;
                bounds = Some(match bounds {
                    Some((min, max)) => (min.min(p), max.max(p)),
                    None => (p, p),
                });
            }

            Ok(DocumentInfo {
                name: doc.name().to_string(),
                kind: doc.kind(),
                read_only: doc.is_read_only(),
                point_count: handles.len(),
                bounds,
            })
        })
    })
}

/// Create an empty document of `kind` at `document`
pub fn handle_new(ctx: &ActionContext, document: &Path, kind: DocumentKind) -> anyhow::Result<()> {
    if document.exists() {
        bail!("{} already exists", document.display());
    }

    with_session(ctx.application, |conn| {
        DocumentScope::create(kind).run(conn, |doc| -> anyhow::Result<()> {
            doc.save_as(document)?;
            Ok(())
        })
    })
}
