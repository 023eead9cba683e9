//! The thread-safe core owning one index.
//!
//! An [`IndexCore`] mediates a single serialized writer and many lock-free
//! readers. All mutating operations serialize on one write lock; queries go
//! through [`SearcherHolder`] leases and never touch that lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard, RwLock};
use tracing::{debug, warn};

use crate::analysis::analyzer::StopAnalyzer;
use crate::analysis::factory::AnalyzerFactory;
use crate::analysis::{Analyzer, PerFieldAnalyzer};
use crate::document::Document;
use crate::error::{Result, ShrikeError};
use crate::index::definition::IndexDefinition;
use crate::index::reader::IndexReader;
use crate::index::searcher::IndexSearcher;
use crate::index::searcher_holder::{SearcherHolder, SearcherLease};
use crate::index::writer::IndexWriter;
use crate::indexing::context::WorkContext;
use crate::indexing::robust::{indexing_hooks, RobustIterator};
use crate::indexing::stats::IndexingStatistics;
use crate::plugins::{
    source_document_key, AnalyzerGenerator, IndexExtension, SourceDocument, ViewGenerator,
};
use crate::storage::{Directory, FsDirectory};

/// Mutable state guarded by the write lock.
struct WriteState {
    /// The writer, opened lazily on the first write.
    writer: Option<IndexWriter>,

    /// Deep copies of the records indexed by the batch in progress, handed
    /// to extensions when the write completes.
    batch_buffer: Vec<Document>,
}

/// The core of one named index.
pub struct IndexCore {
    definition: IndexDefinition,
    view_generator: Arc<dyn ViewGenerator>,
    directory: RwLock<Arc<dyn Directory>>,
    write_state: Mutex<WriteState>,
    searcher_holder: Arc<SearcherHolder>,
    extensions: RwLock<AHashMap<String, Arc<dyn IndexExtension>>>,
    analyzer_generators: Vec<Arc<dyn AnalyzerGenerator>>,
    last_indexed_at: RwLock<Option<DateTime<Utc>>>,
    disposed: AtomicBool,
}

impl IndexCore {
    /// Create the core over `directory`, publishing an initial snapshot of
    /// whatever the directory already holds.
    pub fn new(
        definition: IndexDefinition,
        directory: Arc<dyn Directory>,
        view_generator: Arc<dyn ViewGenerator>,
    ) -> Result<Self> {
        Self::with_analyzer_generators(definition, directory, view_generator, Vec::new())
    }

    /// Create the core with an ordered list of analyzer generators
    /// consulted on every write and query.
    pub fn with_analyzer_generators(
        definition: IndexDefinition,
        directory: Arc<dyn Directory>,
        view_generator: Arc<dyn ViewGenerator>,
        analyzer_generators: Vec<Arc<dyn AnalyzerGenerator>>,
    ) -> Result<Self> {
        let searcher_holder = Arc::new(SearcherHolder::new());
        let reader = IndexReader::open(Arc::clone(&directory))?;
        searcher_holder.set_snapshot(Some(Arc::new(IndexSearcher::new(reader))));

        Ok(IndexCore {
            definition,
            view_generator,
            directory: RwLock::new(directory),
            write_state: Mutex::new(WriteState {
                writer: None,
                batch_buffer: Vec::new(),
            }),
            searcher_holder,
            extensions: RwLock::new(AHashMap::new()),
            analyzer_generators,
            last_indexed_at: RwLock::new(None),
            disposed: AtomicBool::new(false),
        })
    }

    /// The index name.
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// The index definition.
    pub fn definition(&self) -> &IndexDefinition {
        &self.definition
    }

    /// The view generator behind this index. Doubles as the field schema
    /// queries are validated against.
    pub fn view_generator(&self) -> &Arc<dyn ViewGenerator> {
        &self.view_generator
    }

    /// The directory currently backing the index.
    pub fn directory(&self) -> Arc<dyn Directory> {
        Arc::clone(&self.directory.read())
    }

    /// The analyzer generators consulted by writes and queries.
    pub fn analyzer_generators(&self) -> &[Arc<dyn AnalyzerGenerator>] {
        &self.analyzer_generators
    }

    /// When the index last completed an indexing batch.
    pub fn last_indexed_at(&self) -> Option<DateTime<Utc>> {
        *self.last_indexed_at.read()
    }

    /// Whether the index has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn ensure_not_disposed(&self) -> Result<()> {
        if self.is_disposed() {
            Err(ShrikeError::AlreadyDisposed(self.name().to_string()))
        } else {
            Ok(())
        }
    }

    /// Lease the current searcher snapshot.
    ///
    /// In-flight leases survive writer refreshes and even dispose; taking a
    /// new lease after dispose is an error.
    pub fn searcher(&self) -> Result<SearcherLease> {
        self.ensure_not_disposed()?;
        self.searcher_holder.lease()
    }

    /// Register an extension under `key` unless one is already present.
    pub fn set_extension(&self, key: impl Into<String>, extension: Arc<dyn IndexExtension>) {
        let mut extensions = self.extensions.write();
        extensions.entry(key.into()).or_insert(extension);
    }

    /// Look up an extension by key.
    pub fn get_extension(&self, key: &str) -> Option<Arc<dyn IndexExtension>> {
        self.extensions.read().get(key).cloned()
    }

    /// Run `view`'s map functions over `documents` and index the produced
    /// records as one batch.
    ///
    /// Per-document transform failures are counted, recorded in `context`'s
    /// error sink, and skipped; the batch carries on. Analyzer construction
    /// failures and write failures are recorded and propagated.
    pub fn index_documents(
        &self,
        view: &dyn ViewGenerator,
        documents: &[SourceDocument],
        context: &WorkContext,
        stats: Arc<dyn IndexingStatistics>,
        minimum_timestamp: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_not_disposed()?;
        let max_items = context.config.max_number_of_items_to_index_in_single_batch;

        self.write(context, |core, writer, analyzer, batch_buffer| {
            let hooks = indexing_hooks(
                core.name(),
                Arc::clone(&stats),
                context,
                source_document_key,
            );
            let records = RobustIterator::with_transforms(
                documents,
                view.indexing_functions(),
                hooks,
            )
            .with_cancellation(context)
            .with_max_items(max_items);

            let mut indexed = 0u64;
            for record in records {
                let record_analyzer = core.analyzer_for_record(analyzer, &record);
                batch_buffer.push(record.deep_clone());
                writer.add_document(record, &record_analyzer)?;
                indexed += 1;
            }

            debug!(index = core.name(), indexed, "indexing batch drained");
            Ok(indexed > 0)
        })?;

        let mut last = self.last_indexed_at.write();
        if last.map_or(true, |t| t < minimum_timestamp) {
            *last = Some(minimum_timestamp);
        }
        Ok(())
    }

    /// Fold the analyzer generators over the batch analyzer for one record.
    ///
    /// A generator returning a replacement swaps the default analyzer of
    /// the composite for this record; the replaced instance is dropped
    /// unless it is the batch default.
    fn analyzer_for_record(
        &self,
        batch_analyzer: &PerFieldAnalyzer,
        record: &Document,
    ) -> PerFieldAnalyzer {
        let mut current = batch_analyzer.clone();
        for generator in &self.analyzer_generators {
            let active = Arc::clone(current.default_analyzer());
            if let Some(replacement) =
                generator.generate_for_indexing(self.name(), record, &active)
            {
                if !Arc::ptr_eq(&replacement, &active) {
                    let superseded = current.set_default_analyzer(replacement);
                    drop(superseded);
                }
            }
        }
        current
    }

    /// Delete documents by key.
    pub fn remove(&self, keys: &[String], context: &WorkContext) -> Result<()> {
        self.ensure_not_disposed()?;
        self.write(context, |core, writer, _analyzer, _batch| {
            let deleted = writer.delete_documents(keys)?;
            debug!(index = core.name(), deleted, "removed documents");
            Ok(true)
        })
    }

    /// Commit the writer. A no-op when disposed or when no writer exists.
    pub fn flush(&self) -> Result<()> {
        if self.is_disposed() {
            return Ok(());
        }
        let mut state = self.write_state.lock();
        if let Some(writer) = state.writer.as_mut() {
            writer.commit()?;
        }
        Ok(())
    }

    /// Tear down extensions, searcher, writer, and directory, in that
    /// order. Idempotent; teardown failures are logged and the remaining
    /// steps still run.
    pub fn dispose(&self) {
        let mut state = self.write_state.lock();
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        let drained: Vec<(String, Arc<dyn IndexExtension>)> =
            self.extensions.write().drain().collect();
        for (key, extension) in drained {
            if let Err(error) = extension.dispose() {
                warn!(index = self.name(), extension = %key, %error, "extension dispose failed");
            }
        }

        self.searcher_holder.set_snapshot(None);

        if let Some(mut writer) = state.writer.take() {
            if let Err(error) = writer.close() {
                warn!(index = self.name(), %error, "writer close failed");
            }
        }

        if let Err(error) = self.directory.read().close() {
            warn!(index = self.name(), %error, "directory close failed");
        }
    }

    /// The write protocol: build the batch analyzer, ensure a writer,
    /// run `action`, notify extensions, consider RAM-to-disk promotion,
    /// release analyzers, and refresh the searcher when asked to.
    fn write<F>(&self, context: &WorkContext, action: F) -> Result<()>
    where
        F: FnOnce(&IndexCore, &mut IndexWriter, &PerFieldAnalyzer, &mut Vec<Document>) -> Result<bool>,
    {
        let mut state = self.write_state.lock();
        self.ensure_not_disposed()?;

        let mut released: Vec<Arc<dyn Analyzer>> = Vec::new();
        let analyzer = AnalyzerFactory::create_analyzer(
            Arc::new(StopAnalyzer::new()),
            &self.definition,
            &mut released,
        )
        .map_err(|error| {
            context.add_error(self.name(), None, format!("Creating Analyzer: {error}"));
            error
        })?;

        if state.writer.is_none() {
            let directory = self.directory();
            state.writer = Some(IndexWriter::open(directory, Arc::new(StopAnalyzer::new()))?);
        }

        state.batch_buffer.clear();
        let state_ref = &mut *state;
        let writer = state_ref
            .writer
            .as_mut()
            .expect("writer opened above under the write lock");

        let should_recreate_searcher =
            action(self, writer, &analyzer, &mut state_ref.batch_buffer).map_err(|error| {
                context.add_error(self.name(), None, error.to_string());
                error
            })?;

        if !state_ref.batch_buffer.is_empty() {
            let extensions: Vec<Arc<dyn IndexExtension>> =
                self.extensions.read().values().cloned().collect();
            for extension in extensions {
                extension.on_documents_indexed(&state_ref.batch_buffer)?;
            }
            state_ref.batch_buffer.clear();
        }

        self.promote_to_disk_if_needed(&mut state, context)?;

        drop(released);

        if should_recreate_searcher {
            self.recreate_searcher(&mut state)?;
        }
        Ok(())
    }

    /// Promote a RAM-resident temp index to a filesystem directory once it
    /// outgrows the configured threshold. The swap is atomic from the
    /// readers' view: the next published snapshot is disk-backed, current
    /// leases stay on the in-memory snapshot.
    fn promote_to_disk_if_needed(
        &self,
        state: &mut MutexGuard<'_, WriteState>,
        context: &WorkContext,
    ) -> Result<()> {
        if !self.definition.is_temp() || context.config.run_in_memory {
            return Ok(());
        }
        let directory = self.directory();
        if !directory.is_in_memory() {
            return Ok(());
        }
        let Some(writer) = state.writer.as_mut() else {
            return Ok(());
        };
        let in_memory_bytes = directory.size_in_bytes()?.max(writer.ram_bytes_used());
        if in_memory_bytes <= context.config.temp_index_in_memory_max_bytes {
            return Ok(());
        }

        writer.commit()?;

        let target = context
            .config
            .index_storage_path
            .join(self.name().replace(['/', '\\'], "_"));
        let promoted: Arc<dyn Directory> = Arc::new(FsDirectory::new(target)?);
        directory.copy_to(promoted.as_ref())?;

        if let Some(mut old_writer) = state.writer.take() {
            old_writer.close()?;
        }
        *self.directory.write() = Arc::clone(&promoted);
        state.writer = Some(IndexWriter::open(promoted, Arc::new(StopAnalyzer::new()))?);

        debug!(index = self.name(), bytes = in_memory_bytes, "promoted temp index to disk");
        Ok(())
    }

    /// Publish a fresh snapshot: near-real-time from the writer when one
    /// exists, otherwise cold from the directory.
    fn recreate_searcher(&self, state: &mut MutexGuard<'_, WriteState>) -> Result<()> {
        let reader = match state.writer.as_ref() {
            Some(writer) => IndexReader::from_writer(writer),
            None => IndexReader::open(self.directory())?,
        };
        self.searcher_holder
            .set_snapshot(Some(Arc::new(IndexSearcher::new(reader))));
        Ok(())
    }
}

impl std::fmt::Debug for IndexCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexCore")
            .field("name", &self.name())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Drop for IndexCore {
    fn drop(&mut self) {
        if !self.is_disposed() {
            self.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Field, DOCUMENT_ID_FIELD_NAME};
    use crate::indexing::stats::NullStatistics;
    use crate::plugins::IndexingFn;
    use crate::storage::RamDirectory;
    use serde_json::json;

    struct TitleView;

    impl ViewGenerator for TitleView {
        fn contains_field(&self, name: &str) -> bool {
            matches!(name, "title") || name == DOCUMENT_ID_FIELD_NAME
        }

        fn indexing_functions(&self) -> Vec<IndexingFn> {
            vec![Arc::new(|source: &SourceDocument| {
                let key = source_document_key(source)
                    .ok_or_else(|| ShrikeError::transform("source document has no key"))?;
                let title = source
                    .get("title")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default();
                Ok(vec![Document::with_id(key).with_field(Field::text("title", title))])
            })]
        }
    }

    fn core() -> IndexCore {
        IndexCore::new(
            IndexDefinition::new("notes/by-title"),
            Arc::new(RamDirectory::new()),
            Arc::new(TitleView),
        )
        .unwrap()
    }

    fn source(key: &str, title: &str) -> SourceDocument {
        json!({"__document_id": key, "title": title})
    }

    #[test]
    fn test_index_and_refresh() {
        let core = core();
        let context = WorkContext::default();

        core.index_documents(
            &TitleView,
            &[source("notes/1", "alpha"), source("notes/2", "beta")],
            &context,
            Arc::new(NullStatistics),
            Utc::now(),
        )
        .unwrap();

        let lease = core.searcher().unwrap();
        assert_eq!(lease.reader().doc_count(), 2);
        assert!(core.last_indexed_at().is_some());
    }

    #[test]
    fn test_remove_deletes_by_key() {
        let core = core();
        let context = WorkContext::default();

        core.index_documents(
            &TitleView,
            &[source("notes/1", "alpha"), source("notes/2", "beta")],
            &context,
            Arc::new(NullStatistics),
            Utc::now(),
        )
        .unwrap();
        core.remove(&["notes/1".to_string()], &context).unwrap();

        let lease = core.searcher().unwrap();
        assert_eq!(lease.reader().doc_count(), 1);
    }

    #[test]
    fn test_write_after_dispose_fails() {
        let core = core();
        let context = WorkContext::default();
        core.dispose();
        core.dispose(); // idempotent

        let result = core.index_documents(
            &TitleView,
            &[source("notes/1", "x")],
            &context,
            Arc::new(NullStatistics),
            Utc::now(),
        );
        assert!(matches!(result, Err(ShrikeError::AlreadyDisposed(_))));
        assert!(core.searcher().is_err());
        assert!(core.flush().is_ok());
    }

    #[test]
    fn test_lease_survives_dispose() {
        let core = core();
        let context = WorkContext::default();
        core.index_documents(
            &TitleView,
            &[source("notes/1", "alpha")],
            &context,
            Arc::new(NullStatistics),
            Utc::now(),
        )
        .unwrap();

        let lease = core.searcher().unwrap();
        core.dispose();
        assert_eq!(lease.reader().doc_count(), 1);
    }

    #[test]
    fn test_extension_registry() {
        struct Probe;
        impl IndexExtension for Probe {
            fn on_documents_indexed(&self, _: &[Document]) -> Result<()> {
                Ok(())
            }
        }

        let core = core();
        core.set_extension("probe", Arc::new(Probe));
        assert!(core.get_extension("probe").is_some());
        assert!(core.get_extension("other").is_none());

        // set_extension does not replace an existing entry.
        struct Second;
        impl IndexExtension for Second {
            fn on_documents_indexed(&self, _: &[Document]) -> Result<()> {
                Ok(())
            }
        }
        core.set_extension("probe", Arc::new(Second));
        assert!(core.get_extension("probe").is_some());
    }
}
