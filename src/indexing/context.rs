//! The work context an indexing batch runs under.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Configuration an index batch consults.
#[derive(Debug, Clone)]
pub struct IndexingConfig {
    /// Cap on records produced by a single indexing batch.
    pub max_number_of_items_to_index_in_single_batch: usize,

    /// Byte threshold past which a RAM-resident temp index is promoted to
    /// a filesystem directory.
    pub temp_index_in_memory_max_bytes: u64,

    /// When set, indexes never leave memory and promotion is disabled.
    pub run_in_memory: bool,

    /// Root path promoted indexes are materialized under.
    pub index_storage_path: PathBuf,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        IndexingConfig {
            max_number_of_items_to_index_in_single_batch: 128 * 1024,
            temp_index_in_memory_max_bytes: 25 * 1024 * 1024,
            run_in_memory: false,
            index_storage_path: PathBuf::from("indexes"),
        }
    }
}

/// An error recorded against a document while indexing.
#[derive(Debug, Clone)]
pub struct IndexingError {
    /// The index the error belongs to.
    pub index: String,

    /// The document key, when one could be derived.
    pub document_key: Option<String>,

    /// Human-readable error message.
    pub message: String,

    /// When the error was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Shared state carried through an indexing run: configuration, the error
/// sink, and the cancellation signal.
///
/// A single `WorkContext` is shared by the scheduler across many indexes;
/// the error sink tags every entry with the index name.
#[derive(Debug, Default)]
pub struct WorkContext {
    /// Configuration for this run.
    pub config: IndexingConfig,

    errors: Mutex<Vec<IndexingError>>,
    cancelled: AtomicBool,
}

impl WorkContext {
    /// Create a work context with the given configuration.
    pub fn new(config: IndexingConfig) -> Self {
        WorkContext {
            config,
            errors: Mutex::new(Vec::new()),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Record an error against `index`, optionally keyed by document.
    pub fn add_error(
        &self,
        index: impl Into<String>,
        document_key: Option<String>,
        message: impl Into<String>,
    ) {
        self.errors.lock().push(IndexingError {
            index: index.into(),
            document_key,
            message: message.into(),
            timestamp: Utc::now(),
        });
    }

    /// A snapshot of all recorded errors.
    pub fn errors(&self) -> Vec<IndexingError> {
        self.errors.lock().clone()
    }

    /// Signal cancellation; in-flight batches stop producing new items.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_sink_records_entries() {
        let context = WorkContext::default();
        context.add_error("users/search", Some("users/3".to_string()), "boom");
        context.add_error("users/search", None, "general failure");

        let errors = context.errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].document_key.as_deref(), Some("users/3"));
        assert_eq!(errors[1].document_key, None);
    }

    #[test]
    fn test_cancellation_flag() {
        let context = WorkContext::default();
        assert!(!context.is_cancelled());
        context.cancel();
        assert!(context.is_cancelled());
    }
}
