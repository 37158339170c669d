//! Host application abstraction
//!
//! These traits describe the CAD host object model. Backends:
//! - [`OfflineApplication`]: file-backed emulation (RON documents)
//! - [`NullApplication`]: never reachable

mod csv;
mod offline;
mod traits;

pub use csv::{CSV_HEADER, write_points_csv};
pub use offline::{
    ConnectionStats, DocumentFile, OfflineApplication, OfflineConnection, OfflineDocument,
    PointRecord,
};
pub use traits::*;
