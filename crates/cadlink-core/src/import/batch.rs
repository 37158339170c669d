//! Point batch creation
//!
//! Drives a host document to create one point per parsed row. Every input
//! row yields exactly one outcome, in input order.

use cadlink_host::{Document, PointHandle};

use super::parser::{CoordinateRecord, RowError, RowErrorKind};

/// Outcome of importing a single row
pub type RowOutcome = Result<PointHandle, RowError>;

/// Ordered per-row report of a batch import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportResult {
    outcomes: Vec<RowOutcome>,
}

impl ImportResult {
    /// Number of rows covered
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcome for the given data row
    pub fn get(&self, row: usize) -> Option<&RowOutcome> {
        self.outcomes.get(row)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RowOutcome> {
        self.outcomes.iter()
    }

    pub fn outcomes(&self) -> &[RowOutcome] {
        &self.outcomes
    }

    /// Handles of the points created, in row order
    pub fn created(&self) -> impl Iterator<Item = PointHandle> + '_ {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok().copied())
    }

    /// Row failures, in row order
    pub fn errors(&self) -> impl Iterator<Item = &RowError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    /// Check that every row produced a point
    pub fn is_complete_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.is_ok())
    }

    pub fn into_outcomes(self) -> Vec<RowOutcome> {
        self.outcomes
    }
}

impl IntoIterator for ImportResult {
    type Item = RowOutcome;
    type IntoIter = std::vec::IntoIter<RowOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ImportResult {
    type Item = &'a RowOutcome;
    type IntoIter = std::slice::Iter<'a, RowOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

/// Create one point per parsed record in `document`
///
/// Rows that failed parsing are passed through without a host call. A
/// failure raised by the document is recorded for that row and the batch
/// continues. Nothing is rolled back, and importing the same rows twice
/// into one document creates duplicate points.
pub fn create_points<D, I>(document: &mut D, records: I) -> ImportResult
where
    D: Document + ?Sized,
    I: IntoIterator<Item = Result<CoordinateRecord, RowError>>,
{
    let outcomes: Vec<RowOutcome> = records
        .into_iter()
        .map(|parsed| {
            let record = match parsed {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("Skipping {}", e);
                    return Err(e);
                }
            };

            match document.create_point(record.position()) {
                Ok(handle) => {
                    tracing::debug!(
                        "Row {} -> point at {} mm in '{}'",
                        record.row(),
                        record.position(),
                        document.name()
                    );
                    Ok(handle)
                }
                Err(e) => {
                    let error = RowError::new(
                        record.row(),
                        record.line(),
                        RowErrorKind::CreationFailed(e),
                    );
                    tracing::warn!("Document '{}' rejected {}", document.name(), error);
                    Err(error)
                }
            }
        })
        .collect();

    let result = ImportResult { outcomes };
    tracing::info!(
        "Imported {} of {} rows into '{}' ({} failed)",
        result.success_count(),
        result.len(),
        document.name(),
        result.failure_count()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::CsvPointParser;
    use crate::units::Unit;
    use cadlink_host::{
        CreationError, DocumentKind, HostError, HostResult, ObjectModel, PointHandle,
    };
    use glam::DVec3;
    use std::path::Path;
    use uuid::Uuid;

    /// Records every creation call and fails on selected call numbers
    struct FakeDocument {
        id: Uuid,
        created: Vec<(PointHandle, DVec3)>,
        calls: usize,
        fail_on_calls: Vec<usize>,
    }

    impl FakeDocument {
        fn new() -> Self {
            Self {
                id: Uuid::new_v4(),
                created: Vec::new(),
                calls: 0,
                fail_on_calls: Vec::new(),
            }
        }

        fn failing_on(calls: &[usize]) -> Self {
            Self {
                fail_on_calls: calls.to_vec(),
                ..Self::new()
            }
        }
    }

    impl ObjectModel for FakeDocument {
        fn find_by_name(&self, _name: &str) -> Option<PointHandle> {
            None
        }

        fn activate(&mut self, _handle: PointHandle) -> HostResult<()> {
            Ok(())
        }

        fn deactivate(&mut self, _handle: PointHandle) -> HostResult<()> {
            Ok(())
        }

        fn is_inactive(&self, _handle: PointHandle) -> HostResult<bool> {
            Ok(false)
        }
    }

    impl Document for FakeDocument {
        fn name(&self) -> &str {
            "Fake"
        }

        fn kind(&self) -> DocumentKind {
            DocumentKind::Part
        }

        fn path(&self) -> Option<&Path> {
            None
        }

        fn is_read_only(&self) -> bool {
            false
        }

        fn is_closed(&self) -> bool {
            false
        }

        fn create_point(&mut self, position: DVec3) -> Result<PointHandle, CreationError> {
            let call = self.calls;
            self.calls += 1;
            if self.fail_on_calls.contains(&call) {
                return Err(CreationError::Rejected("degenerate geometry".into()));
            }
            let handle = PointHandle::new(self.id, Uuid::new_v4());
            self.created.push((handle, position));
            Ok(handle)
        }

        fn point_coordinates(&self, handle: PointHandle) -> HostResult<DVec3> {
            self.created
                .iter()
                .find(|(h, _)| *h == handle)
                .map(|(_, p)| *p)
                .ok_or_else(|| HostError::PointNotFound(handle.point_id.to_string()))
        }

        fn points(&self) -> HostResult<Vec<PointHandle>> {
            Ok(self.created.iter().map(|(h, _)| *h).collect())
        }

        fn save(&mut self) -> HostResult<()> {
            Ok(())
        }

        fn save_as(&mut self, _path: &Path) -> HostResult<()> {
            Ok(())
        }

        fn close(&mut self) -> HostResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_mixed_rows_in_order() {
        let mut doc = FakeDocument::new();
        let parser = CsvPointParser::new("x,y,z\n1,2,3\nfoo,5,6\n7,8,9", Unit::Centimeter);
        let result = create_points(&mut doc, parser.records());

        assert_eq!(result.len(), 3);
        assert_eq!(doc.calls, 2);

        let first = *result.get(0).unwrap().as_ref().unwrap();
        assert_eq!(
            doc.point_coordinates(first).unwrap(),
            DVec3::new(10.0, 20.0, 30.0)
        );

        let second = result.get(1).unwrap().as_ref().unwrap_err();
        assert_eq!(second.row, 1);
        assert!(second.is_invalid_number());

        let third = *result.get(2).unwrap().as_ref().unwrap();
        assert_eq!(
            doc.point_coordinates(third).unwrap(),
            DVec3::new(70.0, 80.0, 90.0)
        );
    }

    #[test]
    fn test_header_only_makes_no_calls() {
        let mut doc = FakeDocument::new();
        let parser = CsvPointParser::new("x,y,z", Unit::Meter);
        let result = create_points(&mut doc, parser.records());

        assert!(result.is_empty());
        assert_eq!(doc.calls, 0);
    }

    #[test]
    fn test_invalid_rows_never_reach_document() {
        let mut doc = FakeDocument::new();
        let parser = CsvPointParser::new("a,b,c\n1,x,3\n1,2\n4,5,6e", Unit::Millimeter);
        let result = create_points(&mut doc, parser.records());

        assert_eq!(result.len(), 3);
        assert_eq!(result.failure_count(), 3);
        assert_eq!(doc.calls, 0);
    }

    #[test]
    fn test_creation_failure_does_not_abort_batch() {
        let mut doc = FakeDocument::failing_on(&[1]);
        let parser = CsvPointParser::new("1,1,1\n2,2,2\n3,3,3", Unit::Millimeter);
        let result = create_points(&mut doc, parser.records());

        assert_eq!(result.len(), 3);
        assert_eq!(doc.calls, 3);
        assert_eq!(result.success_count(), 2);

        let error = result.errors().next().unwrap();
        assert_eq!(error.row, 1);
        assert_eq!(
            error.kind,
            RowErrorKind::CreationFailed(CreationError::Rejected("degenerate geometry".into()))
        );
        assert!(!result.is_complete_success());
    }

    #[test]
    fn test_outcome_count_matches_rows() {
        let source: String = (0..50)
            .map(|i| {
                if i % 7 == 0 {
                    format!("{i},oops,{i}\n")
                } else {
                    format!("{i},{i},{i}\n")
                }
            })
            .collect();

        let mut doc = FakeDocument::new();
        let result = create_points(&mut doc, CsvPointParser::new(&source, Unit::Millimeter).records());

        assert_eq!(result.len(), 50);
        for (row, outcome) in result.iter().enumerate() {
            match outcome {
                Ok(handle) => {
                    let p = doc.point_coordinates(*handle).unwrap();
                    assert_eq!(p, DVec3::splat(row as f64));
                }
                Err(e) => {
                    assert_eq!(e.row, row);
                    assert_eq!(row % 7, 0);
                }
            }
        }
    }

    #[test]
    fn test_reimport_duplicates_points() {
        let mut doc = FakeDocument::new();
        let parser = CsvPointParser::new("1,2,3\n4,5,6", Unit::Millimeter);

        create_points(&mut doc, parser.records());
        create_points(&mut doc, parser.records());

        assert_eq!(doc.points().unwrap().len(), 4);
    }

    #[test]
    fn test_created_handles_in_row_order() {
        let mut doc = FakeDocument::new();
        let parser = CsvPointParser::new("1,0,0\nbad,0,0\n2,0,0", Unit::Millimeter);
        let result = create_points(&mut doc, parser.records());

        let created: Vec<_> = result.created().collect();
        assert_eq!(created, doc.points().unwrap());
    }
}
