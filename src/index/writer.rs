//! The exclusive mutator over an index directory.
//!
//! The writer buffers the whole segment in memory: postings, stored
//! fields, and the key map. `commit` serializes the segment to the
//! directory; opening a writer over a directory that already holds a
//! segment resumes from it. The searcher holder obtains near-real-time
//! snapshots from the live writer state, so uncommitted documents become
//! visible on refresh without a commit.

use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::analysis::{Analyzer, PerFieldAnalyzer};
use crate::document::Document;
use crate::error::{Result, ShrikeError};
use crate::storage::Directory;

/// File the serialized segment lives in.
pub(crate) const SEGMENT_FILE: &str = "segment.json";

/// One posting: a document and how often the term occurs in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// The document id.
    pub doc_id: u64,
    /// Term frequency within the document.
    pub freq: u32,
}

/// The full in-memory segment: the inverted index plus stored documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct SegmentState {
    /// field -> term -> postings ordered by doc id.
    pub postings: AHashMap<String, AHashMap<String, Vec<Posting>>>,

    /// Stored documents by doc id; `None` marks a deletion.
    pub docs: Vec<Option<Document>>,

    /// Document key -> doc id, for delete-by-key and upserts.
    pub keys: AHashMap<String, u64>,
}

impl SegmentState {
    fn live_docs(&self) -> u64 {
        self.docs.iter().filter(|d| d.is_some()).count() as u64
    }
}

/// The index writer. Exclusively owned by the index core and only touched
/// under its write lock.
pub struct IndexWriter {
    directory: Arc<dyn Directory>,
    default_analyzer: Arc<dyn Analyzer>,
    state: SegmentState,
    ram_bytes: u64,
    pending_docs: u64,
    closed: bool,
}

impl IndexWriter {
    /// Open a writer over `directory`, resuming any committed segment.
    pub fn open(directory: Arc<dyn Directory>, default_analyzer: Arc<dyn Analyzer>) -> Result<Self> {
        let state = if directory.file_exists(SEGMENT_FILE) {
            let bytes = directory.read_file(SEGMENT_FILE)?;
            serde_json::from_slice(&bytes)?
        } else {
            SegmentState::default()
        };

        let ram_bytes = state
            .docs
            .iter()
            .flatten()
            .map(|d| d.estimated_size() as u64)
            .sum();

        Ok(IndexWriter {
            directory,
            default_analyzer,
            state,
            ram_bytes,
            pending_docs: 0,
            closed: false,
        })
    }

    fn check_closed(&self) -> Result<()> {
        if self.closed {
            Err(ShrikeError::index("writer is closed"))
        } else {
            Ok(())
        }
    }

    /// The directory this writer publishes to.
    pub fn directory(&self) -> &Arc<dyn Directory> {
        &self.directory
    }

    /// The analyzer the writer was opened with.
    pub fn default_analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.default_analyzer
    }

    /// Add one indexable record, replacing any record with the same
    /// document key.
    pub fn add_document(&mut self, doc: Document, analyzer: &PerFieldAnalyzer) -> Result<u64> {
        self.check_closed()?;

        if let Some(key) = doc.document_key() {
            let key = key.to_string();
            self.delete_documents(std::slice::from_ref(&key))?;
        }

        let doc_id = self.state.docs.len() as u64;

        // Term frequencies for this document, per field.
        let mut freqs: AHashMap<String, AHashMap<String, u32>> = AHashMap::new();
        for field in doc.fields() {
            if !field.indexed {
                continue;
            }
            let Some(text) = field.value.index_text() else {
                continue;
            };
            let field_freqs = freqs.entry(field.name.clone()).or_default();
            if field.analyzed {
                for token in analyzer.analyze_field(&field.name, &text)? {
                    *field_freqs.entry(token.text).or_insert(0) += 1;
                }
            } else {
                *field_freqs.entry(text).or_insert(0) += 1;
            }
        }

        for (field, terms) in freqs {
            let field_postings = self.state.postings.entry(field).or_default();
            for (term, freq) in terms {
                field_postings
                    .entry(term)
                    .or_default()
                    .push(Posting { doc_id, freq });
            }
        }

        if let Some(key) = doc.document_key() {
            self.state.keys.insert(key.to_string(), doc_id);
        }

        self.ram_bytes += doc.estimated_size() as u64;

        // Only stored fields are retained for retrieval.
        let mut stored = Document::new();
        for field in doc.fields() {
            if field.stored {
                stored.push(field.clone());
            }
        }
        self.state.docs.push(Some(stored));
        self.pending_docs += 1;

        Ok(doc_id)
    }

    /// Delete documents by key. Returns how many were removed.
    pub fn delete_documents(&mut self, keys: &[String]) -> Result<u64> {
        self.check_closed()?;

        let mut deleted = 0;
        for key in keys {
            let Some(doc_id) = self.state.keys.remove(key) else {
                continue;
            };
            if let Some(slot) = self.state.docs.get_mut(doc_id as usize) {
                if let Some(doc) = slot.take() {
                    self.ram_bytes = self.ram_bytes.saturating_sub(doc.estimated_size() as u64);
                    deleted += 1;
                }
            }
            for field_postings in self.state.postings.values_mut() {
                for postings in field_postings.values_mut() {
                    postings.retain(|p| p.doc_id != doc_id);
                }
            }
        }
        if deleted > 0 {
            self.pending_docs += deleted;
        }
        Ok(deleted)
    }

    /// Serialize the segment to the directory.
    pub fn commit(&mut self) -> Result<()> {
        self.check_closed()?;
        let bytes = serde_json::to_vec(&self.state)?;
        self.directory.write_file(SEGMENT_FILE, &bytes)?;
        self.pending_docs = 0;
        Ok(())
    }

    /// The number of live documents.
    pub fn doc_count(&self) -> u64 {
        self.state.live_docs()
    }

    /// Documents touched since the last commit.
    pub fn pending_docs(&self) -> u64 {
        self.pending_docs
    }

    /// Estimated heap footprint of the buffered segment. Drives the
    /// temp-index promotion check.
    pub fn ram_bytes_used(&self) -> u64 {
        self.ram_bytes
    }

    /// An owned copy of the current segment, for near-real-time readers.
    pub(crate) fn snapshot_state(&self) -> SegmentState {
        self.state.clone()
    }

    /// Close the writer. Buffered but uncommitted changes are dropped.
    pub fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    /// Whether the writer is closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl std::fmt::Debug for IndexWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexWriter")
            .field("docs", &self.state.docs.len())
            .field("pending_docs", &self.pending_docs)
            .field("closed", &self.closed)
            .finish()
    }
}
