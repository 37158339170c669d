//! Point table export

mod options;

use std::path::Path;

use cadlink_host::{Document, HostError, write_points_csv};
use glam::DVec3;

use crate::units::convert_from_millimeters;

pub use options::ExportOptions;

/// Collect every point position of `document`, converted to the export unit
fn collect_positions<D>(document: &D, options: &ExportOptions) -> Result<Vec<DVec3>, ExportError>
where
    D: Document + ?Sized,
{
    let positions = document
        .points()?
        .into_iter()
        .map(|handle| {
            document.point_coordinates(handle).map(|p| {
                DVec3::new(
                    convert_from_millimeters(p.x, options.unit),
                    convert_from_millimeters(p.y, options.unit),
                    convert_from_millimeters(p.z, options.unit),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(positions)
}

/// Export the points of `document` to a CSV file, returns the number of rows
pub fn export_points_csv<D>(
    document: &D,
    path: impl AsRef<Path>,
    options: &ExportOptions,
) -> Result<usize, ExportError>
where
    D: Document + ?Sized,
{
    let path = path.as_ref();
    let positions = collect_positions(document, options)?;

    let file = std::fs::File::create(path).map_err(|e| ExportError::Io(e.to_string()))?;
    let mut writer = std::io::BufWriter::new(file);
    write_points_csv(
        &mut writer,
        &positions,
        options.delimiter,
        options.write_header,
    )
    .map_err(|e| ExportError::Io(e.to_string()))?;

    tracing::info!(
        "Exported {} points from '{}' to {:?} ({})",
        positions.len(),
        document.name(),
        path,
        options.unit
    );
    Ok(positions.len())
}

/// Export the points of `document` to a CSV string (no file I/O)
pub fn points_to_csv_string<D>(document: &D, options: &ExportOptions) -> Result<String, ExportError>
where
    D: Document + ?Sized,
{
    let positions = collect_positions(document, options)?;
    let mut out = Vec::new();
    write_points_csv(&mut out, &positions, options.delimiter, options.write_header)
        .map_err(|e| ExportError::Io(e.to_string()))?;
    String::from_utf8(out).map_err(|e| ExportError::Io(e.to_string()))
}

/// Export-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("IO error: {0}")]
    Io(String),
}
