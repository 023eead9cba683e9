//! Publication point between the writer and concurrent queriers.

use std::ops::Deref;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Result, ShrikeError};
use crate::index::searcher::IndexSearcher;

/// Holds the current searcher snapshot and hands out leases on it.
///
/// Publication is a pointer swap under a short-lived lock, so readers never
/// block on the writer. A [`SearcherLease`] pins its snapshot: swapping in
/// a new snapshot leaves outstanding leases on the old one intact, and the
/// superseded snapshot is released when its last lease drops.
#[derive(Default)]
pub struct SearcherHolder {
    current: RwLock<Option<Arc<IndexSearcher>>>,
}

impl SearcherHolder {
    /// Create an empty holder.
    pub fn new() -> Self {
        SearcherHolder {
            current: RwLock::new(None),
        }
    }

    /// Publish a new snapshot (or none, at teardown). Leases taken before
    /// this call keep observing the snapshot they were issued against.
    pub fn set_snapshot(&self, snapshot: Option<Arc<IndexSearcher>>) {
        *self.current.write() = snapshot;
    }

    /// Lease the current snapshot. The lease releases on drop, on every
    /// exit path.
    pub fn lease(&self) -> Result<SearcherLease> {
        let current = self.current.read();
        match current.as_ref() {
            Some(searcher) => Ok(SearcherLease {
                searcher: Arc::clone(searcher),
            }),
            None => Err(ShrikeError::index("no searcher snapshot is available")),
        }
    }

    /// Whether a snapshot is currently published.
    pub fn has_snapshot(&self) -> bool {
        self.current.read().is_some()
    }
}

impl std::fmt::Debug for SearcherHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearcherHolder")
            .field("has_snapshot", &self.has_snapshot())
            .finish()
    }
}

/// A reference-counted lease on one searcher snapshot.
pub struct SearcherLease {
    searcher: Arc<IndexSearcher>,
}

impl Deref for SearcherLease {
    type Target = IndexSearcher;

    fn deref(&self) -> &IndexSearcher {
        &self.searcher
    }
}

impl std::fmt::Debug for SearcherLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearcherLease").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::StopAnalyzer;
    use crate::analysis::PerFieldAnalyzer;
    use crate::document::Document;
    use crate::index::reader::IndexReader;
    use crate::index::writer::IndexWriter;
    use crate::storage::RamDirectory;

    fn snapshot_with_docs(count: usize) -> Arc<IndexSearcher> {
        let mut writer =
            IndexWriter::open(Arc::new(RamDirectory::new()), Arc::new(StopAnalyzer::new()))
                .unwrap();
        let analyzer = PerFieldAnalyzer::new(Arc::new(StopAnalyzer::new()));
        for i in 0..count {
            writer
                .add_document(Document::with_id(format!("docs/{i}")), &analyzer)
                .unwrap();
        }
        Arc::new(IndexSearcher::new(IndexReader::from_writer(&writer)))
    }

    #[test]
    fn test_lease_without_snapshot_fails() {
        let holder = SearcherHolder::new();
        assert!(holder.lease().is_err());
    }

    #[test]
    fn test_lease_pins_superseded_snapshot() {
        let holder = SearcherHolder::new();
        holder.set_snapshot(Some(snapshot_with_docs(1)));

        let old_lease = holder.lease().unwrap();
        holder.set_snapshot(Some(snapshot_with_docs(2)));

        // The old lease still reads its original snapshot.
        assert_eq!(old_lease.reader().doc_count(), 1);

        // New leases observe the published snapshot.
        let new_lease = holder.lease().unwrap();
        assert_eq!(new_lease.reader().doc_count(), 2);
    }

    #[test]
    fn test_teardown_keeps_outstanding_leases_valid() {
        let holder = SearcherHolder::new();
        holder.set_snapshot(Some(snapshot_with_docs(3)));

        let lease = holder.lease().unwrap();
        holder.set_snapshot(None);

        assert!(holder.lease().is_err());
        assert_eq!(lease.reader().doc_count(), 3);
    }
}
