//! Point table writer shared by document exports

use std::io::Write;

use glam::DVec3;

/// Column names written as the header row
pub const CSV_HEADER: [&str; 3] = ["x", "y", "z"];

/// Write one `x<d>y<d>z` row per position, optionally preceded by a header
///
/// Values are written with the shortest representation that round-trips.
pub fn write_points_csv<W: Write>(
    writer: &mut W,
    positions: &[DVec3],
    delimiter: u8,
    header: bool,
) -> std::io::Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    if header {
        csv_writer.write_record(CSV_HEADER)?;
    }

    for p in positions {
        csv_writer.write_record([p.x.to_string(), p.y.to_string(), p.z.to_string()])?;
    }

    csv_writer.flush()
}
