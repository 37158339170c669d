//! Host application trait definitions
//!
//! These traits define the object model that every CAD host backend must expose
//! to the automation client.

use std::path::Path;
use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::csv::write_points_csv;

/// Opaque reference to a point owned by a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointHandle {
    /// ID of the document that owns the point
    pub document_id: Uuid,
    /// ID of the point within the document
    pub point_id: Uuid,
}

impl PointHandle {
    /// Create a new point handle
    pub fn new(document_id: Uuid, point_id: Uuid) -> Self {
        Self {
            document_id,
            point_id,
        }
    }
}

/// Kind of document the host can create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Part document (geometry container)
    #[default]
    Part,
    /// Product document (assembly)
    Product,
    /// Drawing document
    Drawing,
}

impl DocumentKind {
    pub fn name(&self) -> &'static str {
        match self {
            DocumentKind::Part => "Part",
            DocumentKind::Product => "Product",
            DocumentKind::Drawing => "Drawing",
        }
    }

    pub const ALL: &'static [DocumentKind] = &[
        DocumentKind::Part,
        DocumentKind::Product,
        DocumentKind::Drawing,
    ];
}

impl FromStr for DocumentKind {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "part" => Ok(DocumentKind::Part),
            "product" => Ok(DocumentKind::Product),
            "drawing" => Ok(DocumentKind::Drawing),
            _ => Err(HostError::UnknownDocumentKind(s.to_string())),
        }
    }
}

/// Errors raised when opening a document
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OpenError {
    #[error("Could not find file: {0}")]
    NotFound(String),

    #[error("Failed to read document '{path}': {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Document already open: {0}")]
    AlreadyOpen(String),
}

/// Errors raised by the point-creation primitive
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CreationError {
    #[error("Document is read-only: {0}")]
    ReadOnly(String),

    #[error("Geometry rejected: {0}")]
    Rejected(String),

    #[error("Document is closed: {0}")]
    Closed(String),

    #[error("Host call failed: {0}")]
    Host(String),
}

/// Error type for host application operations
#[derive(Debug, Clone, Error)]
pub enum HostError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Session already closed")]
    AlreadyClosed,

    #[error("Session already open")]
    AlreadyOpen,

    #[error("Not connected to the host application")]
    NotConnected,

    #[error(transparent)]
    Open(#[from] OpenError),

    #[error(transparent)]
    Creation(#[from] CreationError),

    #[error("Document is closed: {0}")]
    DocumentClosed(String),

    #[error("Document is read-only: {0}")]
    ReadOnly(String),

    #[error("Document '{0}' has no file path, use save_as")]
    NoPath(String),

    #[error("Point not found: {0}")]
    PointNotFound(String),

    #[error("Unknown document kind: {0}")]
    UnknownDocumentKind(String),

    #[error("File I/O error: {0}")]
    FileIo(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;

/// Entry point into a CAD host application
///
/// Implementations decide how a live connection is established (COM
/// dispatch, IPC socket, file-backed emulation, ...).
pub trait Application {
    /// Get the name of this host
    fn name(&self) -> &str;

    /// Establish a connection to the host
    ///
    /// Fails with [`HostError::Connection`] if the host is unreachable or
    /// refuses the connection (e.g. licensing).
    fn connect(&self) -> HostResult<Box<dyn Connection>>;
}

/// A live connection to the host application
pub trait Connection {
    /// Name of the connected host
    fn application_name(&self) -> &str;

    /// Check if the connection is still usable
    fn is_connected(&self) -> bool;

    /// Open an existing document from disk
    fn open_document(&mut self, path: &Path) -> HostResult<Box<dyn Document>>;

    /// Create a new, unsaved document
    fn new_document(&mut self, kind: DocumentKind) -> HostResult<Box<dyn Document>>;

    /// Number of documents currently open through this connection
    fn document_count(&self) -> usize;

    /// Release the connection
    fn disconnect(&mut self) -> HostResult<()>;
}

/// Name lookup and activation toggles on host objects
pub trait ObjectModel {
    /// Find a point by its host-visible name
    fn find_by_name(&self, name: &str) -> Option<PointHandle>;

    /// Activate a point
    fn activate(&mut self, handle: PointHandle) -> HostResult<()>;

    /// Deactivate a point
    fn deactivate(&mut self, handle: PointHandle) -> HostResult<()>;

    /// Check if a point is deactivated
    fn is_inactive(&self, handle: PointHandle) -> HostResult<bool>;
}

/// A document opened through a host connection
pub trait Document: ObjectModel {
    /// Host-visible document name
    fn name(&self) -> &str;

    /// Kind of this document
    fn kind(&self) -> DocumentKind;

    /// File path, if the document has been saved or was opened from disk
    fn path(&self) -> Option<&Path>;

    /// Check if the document rejects modifications
    fn is_read_only(&self) -> bool;

    /// Check if the document has been closed
    fn is_closed(&self) -> bool;

    /// Create a point at the given position (millimeters)
    fn create_point(&mut self, position: DVec3) -> Result<PointHandle, CreationError>;

    /// Measure the position of a point (millimeters)
    fn point_coordinates(&self, handle: PointHandle) -> HostResult<DVec3>;

    /// All points in the document, in creation order
    fn points(&self) -> HostResult<Vec<PointHandle>>;

    /// Number of points in the document
    fn point_count(&self) -> HostResult<usize> {
        Ok(self.points()?.len())
    }

    /// Save the document to its current path
    fn save(&mut self) -> HostResult<()>;

    /// Save the document to a new path, which becomes its current path
    fn save_as(&mut self, path: &Path) -> HostResult<()>;

    /// Close the document
    fn close(&mut self) -> HostResult<()>;

    /// Export every point as `x,y,z` rows in millimeters
    fn export_csv(&self, path: &Path) -> HostResult<()> {
        let positions = self
            .points()?
            .into_iter()
            .map(|handle| self.point_coordinates(handle))
            .collect::<HostResult<Vec<_>>>()?;

        let file = std::fs::File::create(path).map_err(|e| HostError::FileIo(e.to_string()))?;
        let mut writer = std::io::BufWriter::new(file);
        write_points_csv(&mut writer, &positions, b',', true)
            .map_err(|e| HostError::FileIo(e.to_string()))
    }
}

/// A host that is never reachable (used when no CAD application is available)
#[derive(Debug, Default)]
pub struct NullApplication;

impl Application for NullApplication {
    fn name(&self) -> &str {
        "null"
    }

    fn connect(&self) -> HostResult<Box<dyn Connection>> {
        Err(HostError::Connection("No CAD application available".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_application_refuses_connection() {
        let result = NullApplication.connect();
        assert!(matches!(result, Err(HostError::Connection(_))));
    }

    #[test]
    fn test_document_kind_from_str() {
        assert_eq!("Part".parse::<DocumentKind>().unwrap(), DocumentKind::Part);
        assert_eq!(
            " drawing ".parse::<DocumentKind>().unwrap(),
            DocumentKind::Drawing
        );
        assert!(matches!(
            "sketch".parse::<DocumentKind>(),
            Err(HostError::UnknownDocumentKind(_))
        ));
    }

    #[test]
    fn test_creation_error_converts_to_host_error() {
        let err: HostError = CreationError::ReadOnly("Part1".into()).into();
        assert_eq!(err.to_string(), "Document is read-only: Part1");
    }
}
