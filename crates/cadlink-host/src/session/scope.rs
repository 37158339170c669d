//! Scoped document handling
//!
//! Opens an existing document or creates a new one, hands it to a body, and
//! closes it on exit.

use std::path::{Path, PathBuf};

use crate::host::{Connection, Document, DocumentKind, HostError, OpenError};

/// Where the scoped document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Open an existing file
    Existing(PathBuf),
    /// Create a new document of the given kind
    New(DocumentKind),
}

/// Opens or creates one document and guarantees it is closed afterwards
#[derive(Debug, Clone)]
pub struct DocumentScope {
    source: DocumentSource,
}

impl DocumentScope {
    /// Scope over an existing file
    ///
    /// Fails immediately if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(OpenError::NotFound(path.display().to_string()).into());
        }
        Ok(Self {
            source: DocumentSource::Existing(path.to_path_buf()),
        })
    }

    /// Scope over a new document of the given kind
    pub fn create(kind: DocumentKind) -> Self {
        Self {
            source: DocumentSource::New(kind),
        }
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// Acquire the document, run `body`, then close the document
    ///
    /// If `body` already closed the document, a warning is logged instead.
    pub fn run<T, E, F>(&self, connection: &mut dyn Connection, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn Document) -> Result<T, E>,
        E: From<HostError>,
    {
        let mut document = match &self.source {
            DocumentSource::Existing(path) => connection.open_document(path)?,
            DocumentSource::New(kind) => connection.new_document(*kind)?,
        };

        let result = body(document.as_mut());

        if document.is_closed() {
            tracing::warn!("The document scope could not detect a document to close");
        } else if let Err(e) = document.close() {
            tracing::warn!("Failed to close document '{}': {}", document.name(), e);
            if result.is_ok() {
                return Err(e.into());
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Application, DocumentFile, HostResult, OfflineApplication};
    use glam::DVec3;
    use tempfile::tempdir;

    #[test]
    fn test_scope_rejects_missing_file() {
        let result = DocumentScope::open("missing/part.ron");
        assert!(matches!(
            result,
            Err(HostError::Open(OpenError::NotFound(_)))
        ));
    }

    #[test]
    fn test_scope_closes_new_document() {
        let app = OfflineApplication::new();
        let mut conn = app.connect().unwrap();

        let name = DocumentScope::create(DocumentKind::Part)
            .run(conn.as_mut(), |doc| -> HostResult<String> {
                doc.create_point(DVec3::ZERO)?;
                Ok(doc.name().to_string())
            })
            .unwrap();

        assert_eq!(name, "Part1");
        assert_eq!(app.open_document_count(), 0);
    }

    #[test]
    fn test_scope_closes_on_error() {
        let app = OfflineApplication::new();
        let mut conn = app.connect().unwrap();

        let result: HostResult<()> =
            DocumentScope::create(DocumentKind::Drawing).run(conn.as_mut(), |doc| doc.save());

        assert!(matches!(result, Err(HostError::NoPath(_))));
        assert_eq!(app.open_document_count(), 0);
    }

    #[test]
    fn test_scope_opens_existing_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("fixture.ron");
        DocumentFile::new(DocumentKind::Part).save(&path).unwrap();

        let app = OfflineApplication::new();
        let mut conn = app.connect().unwrap();
        let scope = DocumentScope::open(&path).unwrap();
        assert_eq!(scope.source(), &DocumentSource::Existing(path.clone()));

        let count = scope
            .run(conn.as_mut(), |doc| -> HostResult<usize> {
                doc.create_point(DVec3::X)?;
                doc.save()?;
                doc.point_count()
            })
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(DocumentFile::load(&path).unwrap().points.len(), 1);
    }

    #[test]
    fn test_scope_releases_document_when_body_panics() {
        let app = OfflineApplication::new();
        let mut conn = app.connect().unwrap();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = DocumentScope::create(DocumentKind::Part)
                .run(conn.as_mut(), |_doc| -> HostResult<()> { panic!("body failed") });
        }));

        assert!(outcome.is_err());
        assert_eq!(app.open_document_count(), 0);
    }

    #[test]
    fn test_scope_tolerates_body_closing_document() {
        let app = OfflineApplication::new();
        let mut conn = app.connect().unwrap();

        let result: HostResult<()> =
            DocumentScope::create(DocumentKind::Part).run(conn.as_mut(), |doc| doc.close());

        assert!(result.is_ok());
        assert_eq!(app.open_document_count(), 0);
    }
}
