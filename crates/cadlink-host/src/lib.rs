//! CAD Host Abstraction and Session Lifecycle
//!
//! This crate provides:
//! - Abstract host traits for the CAD application object model
//! - A file-backed offline host and a null host
//! - Scoped sessions that always release the host connection
//! - Scoped documents that are always closed

pub mod host;
pub mod session;

// Re-exports for convenience
pub use host::{
    Application, CSV_HEADER, Connection, ConnectionStats, CreationError, Document, DocumentFile,
    DocumentKind, HostError, HostResult, NullApplication, ObjectModel, OfflineApplication,
    OpenError, PointHandle, PointRecord, write_points_csv,
};
pub use session::{DocumentScope, DocumentSource, SessionContext, SessionState, with_session};
