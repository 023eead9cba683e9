//! Immutable point-in-time readers over a segment.

use std::sync::Arc;

use crate::document::Document;
use crate::error::Result;
use crate::index::writer::{IndexWriter, Posting, SegmentState, SEGMENT_FILE};
use crate::storage::Directory;

/// A read-only view of an index at a point in time.
///
/// Readers are created either cold from a directory (first open, no writer
/// yet) or near-real-time from the live writer, in which case uncommitted
/// documents are visible. Once constructed a reader never changes.
pub struct IndexReader {
    state: SegmentState,
    directory: Arc<dyn Directory>,
}

impl IndexReader {
    /// Open a reader over the committed segment in `directory`. An empty
    /// directory yields an empty reader.
    pub fn open(directory: Arc<dyn Directory>) -> Result<Self> {
        let state = if directory.file_exists(SEGMENT_FILE) {
            let bytes = directory.read_file(SEGMENT_FILE)?;
            serde_json::from_slice(&bytes)?
        } else {
            SegmentState::default()
        };
        Ok(IndexReader { state, directory })
    }

    /// Open a near-real-time reader over the writer's current state,
    /// including uncommitted documents.
    pub fn from_writer(writer: &IndexWriter) -> Self {
        IndexReader {
            state: writer.snapshot_state(),
            directory: Arc::clone(writer.directory()),
        }
    }

    /// The directory this reader was opened against.
    pub fn directory(&self) -> &Arc<dyn Directory> {
        &self.directory
    }

    /// Number of live documents.
    pub fn doc_count(&self) -> u64 {
        self.state.docs.iter().filter(|d| d.is_some()).count() as u64
    }

    /// One past the highest document id.
    pub fn max_doc(&self) -> u64 {
        self.state.docs.len() as u64
    }

    /// The stored fields of a document, or `None` when deleted or out of
    /// range.
    pub fn document(&self, doc_id: u64) -> Option<&Document> {
        self.state.docs.get(doc_id as usize)?.as_ref()
    }

    /// The postings of `term` in `field`, ordered by doc id.
    pub fn postings(&self, field: &str, term: &str) -> Option<&[Posting]> {
        self.state
            .postings
            .get(field)?
            .get(term)
            .map(|p| p.as_slice())
    }

    /// All terms of `field` starting with `prefix`, with their postings.
    pub fn postings_with_prefix<'a>(
        &'a self,
        field: &str,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a [Posting]> {
        self.state
            .postings
            .get(field)
            .into_iter()
            .flat_map(move |terms| {
                terms
                    .iter()
                    .filter(move |(term, _)| term.starts_with(prefix))
                    .map(|(_, postings)| postings.as_slice())
            })
    }

    /// Iterate over live documents in doc-id order.
    pub fn live_doc_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.state
            .docs
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_some())
            .map(|(id, _)| id as u64)
    }
}

impl std::fmt::Debug for IndexReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexReader")
            .field("docs", &self.state.docs.len())
            .field("in_memory", &self.directory.is_in_memory())
            .finish()
    }
}
