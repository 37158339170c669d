//! File-backed host implementation
//!
//! Emulates the host object model without a running CAD process. Documents
//! are persisted as RON files, which makes this backend usable both for the
//! command line tool and as a deterministic test double.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::DVec3;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::traits::{
    Application, Connection, CreationError, Document, DocumentKind, HostError, HostResult,
    ObjectModel, OpenError, PointHandle,
};

/// Current on-disk format version
const FORMAT_VERSION: u32 = 1;

/// A point stored in an offline document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointRecord {
    pub id: Uuid,
    pub name: String,
    /// Position in millimeters
    pub position: DVec3,
    pub active: bool,
}

/// On-disk representation of an offline document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFile {
    pub version: u32,
    pub id: Uuid,
    pub kind: DocumentKind,
    pub read_only: bool,
    pub points: Vec<PointRecord>,
    /// Number used for the next `Point.N` name
    pub next_point_number: u32,
}

impl DocumentFile {
    /// Create an empty document of the given kind
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            version: FORMAT_VERSION,
            id: Uuid::new_v4(),
            kind,
            read_only: false,
            points: Vec::new(),
            next_point_number: 1,
        }
    }

    /// Mark the document read-only
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> HostResult<Vec<u8>> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| HostError::Serialize(e.to_string()))?;
        Ok(content.into_bytes())
    }

    /// Save to a file
    pub fn save(&self, path: impl AsRef<Path>) -> HostResult<()> {
        let content = self.to_bytes()?;
        std::fs::write(path.as_ref(), content).map_err(|e| HostError::FileIo(e.to_string()))
    }

    /// Load from a file
    pub fn load(path: impl AsRef<Path>) -> HostResult<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| HostError::FileIo(e.to_string()))?;
        ron::from_str(&content).map_err(|e| HostError::Deserialize(e.to_string()))
    }
}

/// Connection counters observed by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Successful connections made
    pub connects: usize,
    /// Connections released
    pub disconnects: usize,
    /// Connections currently held
    pub live: usize,
}

#[derive(Debug, Default)]
struct HostState {
    unreachable: bool,
    stats: ConnectionStats,
    /// IDs of documents currently open
    open_documents: HashSet<Uuid>,
    /// Counter used to name new documents (`Part1`, `Part2`, ...)
    untitled: HashMap<DocumentKind, u32>,
}

/// File-backed host application
#[derive(Debug, Clone, Default)]
pub struct OfflineApplication {
    state: Arc<Mutex<HostState>>,
}

impl OfflineApplication {
    /// Create a reachable offline host
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host that refuses every connection
    pub fn unreachable() -> Self {
        let app = Self::default();
        app.state.lock().unreachable = true;
        app
    }

    /// Connection counters since creation
    pub fn stats(&self) -> ConnectionStats {
        self.state.lock().stats
    }

    /// Number of documents open across all connections
    pub fn open_document_count(&self) -> usize {
        self.state.lock().open_documents.len()
    }
}

impl Application for OfflineApplication {
    fn name(&self) -> &str {
        "offline"
    }

    fn connect(&self) -> HostResult<Box<dyn Connection>> {
        let mut state = self.state.lock();
        if state.unreachable {
            return Err(HostError::Connection(
                "offline host is configured as unreachable".into(),
            ));
        }
        state.stats.connects += 1;
        state.stats.live += 1;
        tracing::debug!("Offline host connected ({} live)", state.stats.live);

        Ok(Box::new(OfflineConnection {
            state: Arc::clone(&self.state),
            alive: Arc::new(AtomicBool::new(true)),
            documents: HashSet::new(),
        }))
    }
}

/// A connection to the offline host
pub struct OfflineConnection {
    state: Arc<Mutex<HostState>>,
    /// Shared with every document opened through this connection
    alive: Arc<AtomicBool>,
    documents: HashSet<Uuid>,
}

impl OfflineConnection {
    fn ensure_connected(&self) -> HostResult<()> {
        if self.alive.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(HostError::NotConnected)
        }
    }

    fn register(&mut self, id: Uuid, name: &str) -> HostResult<()> {
        let mut state = self.state.lock();
        if !state.open_documents.insert(id) {
            return Err(OpenError::AlreadyOpen(name.to_string()).into());
        }
        self.documents.insert(id);
        Ok(())
    }
}

impl Connection for OfflineConnection {
    fn application_name(&self) -> &str {
        "offline"
    }

    fn is_connected(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn open_document(&mut self, path: &Path) -> HostResult<Box<dyn Document>> {
        self.ensure_connected()?;

        if !path.is_file() {
            return Err(OpenError::NotFound(path.display().to_string()).into());
        }

        let data = DocumentFile::load(path).map_err(|e| OpenError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let name = document_name_from_path(path);
        self.register(data.id, &name)?;
        tracing::info!("Opened document '{}' from {:?}", name, path);

        Ok(Box::new(OfflineDocument {
            name,
            path: Some(path.to_path_buf()),
            data,
            closed: false,
            alive: Arc::clone(&self.alive),
            state: Arc::clone(&self.state),
        }))
    }

    fn new_document(&mut self, kind: DocumentKind) -> HostResult<Box<dyn Document>> {
        self.ensure_connected()?;

        let number = {
            let mut state = self.state.lock();
            let counter = state.untitled.entry(kind).or_insert(0);
            *counter += 1;
            *counter
        };
        let name = format!("{}{}", kind.name(), number);
        let data = DocumentFile::new(kind);
        self.register(data.id, &name)?;
        tracing::info!("Created new {} document '{}'", kind.name(), name);

        Ok(Box::new(OfflineDocument {
            name,
            path: None,
            data,
            closed: false,
            alive: Arc::clone(&self.alive),
            state: Arc::clone(&self.state),
        }))
    }

    fn document_count(&self) -> usize {
        let state = self.state.lock();
        self.documents
            .iter()
            .filter(|id| state.open_documents.contains(id))
            .count()
    }

    fn disconnect(&mut self) -> HostResult<()> {
        if !self.alive.swap(false, Ordering::SeqCst) {
            return Err(HostError::NotConnected);
        }

        let mut state = self.state.lock();
        for id in self.documents.drain() {
            state.open_documents.remove(&id);
        }
        state.stats.disconnects += 1;
        state.stats.live = state.stats.live.saturating_sub(1);
        tracing::debug!("Offline host disconnected ({} live)", state.stats.live);
        Ok(())
    }
}

/// A document held by the offline host
pub struct OfflineDocument {
    name: String,
    path: Option<PathBuf>,
    data: DocumentFile,
    closed: bool,
    alive: Arc<AtomicBool>,
    state: Arc<Mutex<HostState>>,
}

impl OfflineDocument {
    fn ensure_usable(&self) -> HostResult<()> {
        if self.closed {
            return Err(HostError::DocumentClosed(self.name.clone()));
        }
        if !self.alive.load(Ordering::SeqCst) {
            return Err(HostError::NotConnected);
        }
        Ok(())
    }

    fn handle(&self, point: &PointRecord) -> PointHandle {
        PointHandle::new(self.data.id, point.id)
    }

    fn point(&self, handle: PointHandle) -> HostResult<&PointRecord> {
        self.data
            .points
            .iter()
            .find(|p| handle.document_id == self.data.id && p.id == handle.point_id)
            .ok_or_else(|| HostError::PointNotFound(handle.point_id.to_string()))
    }

    fn point_mut(&mut self, handle: PointHandle) -> HostResult<&mut PointRecord> {
        let document_id = self.data.id;
        self.data
            .points
            .iter_mut()
            .find(|p| handle.document_id == document_id && p.id == handle.point_id)
            .ok_or_else(|| HostError::PointNotFound(handle.point_id.to_string()))
    }

    fn set_active(&mut self, handle: PointHandle, active: bool) -> HostResult<()> {
        self.ensure_usable()?;
        if self.data.read_only {
            return Err(HostError::ReadOnly(self.name.clone()));
        }
        self.point_mut(handle)?.active = active;
        Ok(())
    }
}

impl ObjectModel for OfflineDocument {
    fn find_by_name(&self, name: &str) -> Option<PointHandle> {
        self.data
            .points
            .iter()
            .find(|p| p.name == name)
            .map(|p| self.handle(p))
    }

    fn activate(&mut self, handle: PointHandle) -> HostResult<()> {
        self.set_active(handle, true)
    }

    fn deactivate(&mut self, handle: PointHandle) -> HostResult<()> {
        self.set_active(handle, false)
    }

    fn is_inactive(&self, handle: PointHandle) -> HostResult<bool> {
        self.ensure_usable()?;
        Ok(!self.point(handle)?.active)
    }
}

impl Document for OfflineDocument {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> DocumentKind {
        self.data.kind
    }

    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn is_read_only(&self) -> bool {
        self.data.read_only
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn create_point(&mut self, position: DVec3) -> Result<PointHandle, CreationError> {
        if self.closed {
            return Err(CreationError::Closed(self.name.clone()));
        }
        if !self.alive.load(Ordering::SeqCst) {
            return Err(CreationError::Host("not connected".into()));
        }
        if self.data.read_only {
            return Err(CreationError::ReadOnly(self.name.clone()));
        }
        if !position.is_finite() {
            return Err(CreationError::Rejected(format!(
                "non-finite coordinates {position}"
            )));
        }

        let point = PointRecord {
            id: Uuid::new_v4(),
            name: format!("Point.{}", self.data.next_point_number),
            position,
            active: true,
        };
        self.data.next_point_number += 1;
        let handle = self.handle(&point);
        self.data.points.push(point);
        Ok(handle)
    }

    fn point_coordinates(&self, handle: PointHandle) -> HostResult<DVec3> {
        self.ensure_usable()?;
        Ok(self.point(handle)?.position)
    }

    fn points(&self) -> HostResult<Vec<PointHandle>> {
        self.ensure_usable()?;
        Ok(self.data.points.iter().map(|p| self.handle(p)).collect())
    }

    fn save(&mut self) -> HostResult<()> {
        self.ensure_usable()?;
        if self.data.read_only {
            return Err(HostError::ReadOnly(self.name.clone()));
        }
        let path = self
            .path
            .clone()
            .ok_or_else(|| HostError::NoPath(self.name.clone()))?;
        self.data.save(&path)?;
        tracing::info!("Saved document '{}' to {:?}", self.name, path);
        Ok(())
    }

    fn save_as(&mut self, path: &Path) -> HostResult<()> {
        self.ensure_usable()?;
        self.data.save(path)?;
        self.path = Some(path.to_path_buf());
        self.name = document_name_from_path(path);
        tracing::info!("Saved document '{}' as {:?}", self.name, path);
        Ok(())
    }

    fn close(&mut self) -> HostResult<()> {
        if self.closed {
            return Err(HostError::DocumentClosed(self.name.clone()));
        }
        self.closed = true;
        self.state.lock().open_documents.remove(&self.data.id);
        tracing::debug!("Closed document '{}'", self.name);
        Ok(())
    }
}

impl Drop for OfflineDocument {
    fn drop(&mut self) {
        if !self.closed {
            self.state.lock().open_documents.remove(&self.data.id);
            tracing::debug!("Released document '{}' without close", self.name);
        }
    }
}

fn document_name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
        .to_string()
}
