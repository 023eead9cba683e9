//! One serialized writer against many concurrent snapshot readers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use chrono::Utc;
use serde_json::json;

use shrike::document::{Document, DOCUMENT_ID_FIELD_NAME};
use shrike::error::ShrikeError;
use shrike::index::{IndexCore, IndexDefinition};
use shrike::indexing::{NullStatistics, WorkContext};
use shrike::plugins::{source_document_key, IndexingFn, SourceDocument, ViewGenerator};
use shrike::query::{FieldsToFetch, IndexQuery, QueryOperation, PAGE_SIZE_ALL};
use shrike::storage::RamDirectory;

struct KeyOnlyView;

impl ViewGenerator for KeyOnlyView {
    fn contains_field(&self, name: &str) -> bool {
        name == DOCUMENT_ID_FIELD_NAME
    }

    fn indexing_functions(&self) -> Vec<IndexingFn> {
        vec![Arc::new(|source: &SourceDocument| {
            let key = source_document_key(source)
                .ok_or_else(|| ShrikeError::transform("source document has no key"))?;
            Ok(vec![Document::with_id(key)])
        })]
    }
}

const BATCHES: usize = 10;
const BATCH_SIZE: usize = 100;

#[test]
fn readers_only_observe_whole_batches() {
    let core = Arc::new(
        IndexCore::new(
            IndexDefinition::new("stress/batches"),
            Arc::new(RamDirectory::new()),
            Arc::new(KeyOnlyView),
        )
        .unwrap(),
    );
    let done = Arc::new(AtomicBool::new(false));

    thread::scope(|scope| {
        let writer_core = Arc::clone(&core);
        let writer_done = Arc::clone(&done);
        scope.spawn(move || {
            let context = WorkContext::default();
            for batch in 0..BATCHES {
                let sources: Vec<SourceDocument> = (0..BATCH_SIZE)
                    .map(|i| json!({ "__document_id": format!("docs/{}", batch * BATCH_SIZE + i) }))
                    .collect();
                writer_core
                    .index_documents(
                        &KeyOnlyView,
                        &sources,
                        &context,
                        Arc::new(NullStatistics),
                        Utc::now(),
                    )
                    .unwrap();
            }
            writer_done.store(true, Ordering::SeqCst);
        });

        for _ in 0..3 {
            let reader_core = Arc::clone(&core);
            let reader_done = Arc::clone(&done);
            scope.spawn(move || {
                let mut observed_max = 0u64;
                loop {
                    let finished = reader_done.load(Ordering::SeqCst);

                    let lease = reader_core.searcher().unwrap();
                    let count = lease.reader().doc_count();

                    // Every visible state is a whole number of batches,
                    // and visibility never goes backwards.
                    assert_eq!(count % BATCH_SIZE as u64, 0, "torn state: {count} docs");
                    assert!(count >= observed_max, "snapshot went backwards");
                    observed_max = count;

                    let results = QueryOperation::new(
                        &reader_core,
                        IndexQuery::new("*").with_page_size(PAGE_SIZE_ALL),
                        FieldsToFetch::all(),
                    )
                    .execute()
                    .unwrap();
                    assert_eq!(results.total_hits % BATCH_SIZE as u64, 0);

                    if finished {
                        break;
                    }
                }
                observed_max
            });
        }
    });

    // After the writer finishes every batch is visible.
    assert_eq!(
        core.searcher().unwrap().reader().doc_count(),
        (BATCHES * BATCH_SIZE) as u64
    );
}

#[test]
fn a_lease_held_across_a_refresh_stays_on_its_snapshot() {
    let core = IndexCore::new(
        IndexDefinition::new("stress/lease"),
        Arc::new(RamDirectory::new()),
        Arc::new(KeyOnlyView),
    )
    .unwrap();
    let context = WorkContext::default();

    core.index_documents(
        &KeyOnlyView,
        &[json!({ "__document_id": "docs/1" })],
        &context,
        Arc::new(NullStatistics),
        Utc::now(),
    )
    .unwrap();

    let held = core.searcher().unwrap();
    assert_eq!(held.reader().doc_count(), 1);

    core.index_documents(
        &KeyOnlyView,
        &[json!({ "__document_id": "docs/2" })],
        &context,
        Arc::new(NullStatistics),
        Utc::now(),
    )
    .unwrap();

    // The held lease is frozen at its snapshot; a new lease moves forward.
    assert_eq!(held.reader().doc_count(), 1);
    assert_eq!(core.searcher().unwrap().reader().doc_count(), 2);
}

#[test]
fn concurrent_reads_during_dispose_complete_on_their_snapshot() {
    let core = Arc::new(
        IndexCore::new(
            IndexDefinition::new("stress/dispose"),
            Arc::new(RamDirectory::new()),
            Arc::new(KeyOnlyView),
        )
        .unwrap(),
    );
    let context = WorkContext::default();

    core.index_documents(
        &KeyOnlyView,
        &[json!({ "__document_id": "docs/1" })],
        &context,
        Arc::new(NullStatistics),
        Utc::now(),
    )
    .unwrap();

    let lease = core.searcher().unwrap();
    core.dispose();

    // The in-flight lease still reads; new leases are refused.
    assert_eq!(lease.reader().doc_count(), 1);
    assert!(core.searcher().is_err());
}
