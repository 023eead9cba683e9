//! The one-shot query operation.
//!
//! A [`QueryOperation`] executes a single query against a leased snapshot:
//! it validates referenced fields against the index schema, builds the
//! parsed query through the per-field analyzer, lets triggers rewrite it,
//! and then drives the paging loop with post-filter and distinct semantics
//! that hold across page boundaries.

use std::sync::Arc;

use ahash::AHashSet;
use serde_json::{Map, Value};

use crate::analysis::analyzer::{KeywordAnalyzer, StopAnalyzer};
use crate::analysis::factory::AnalyzerFactory;
use crate::analysis::Analyzer;
use crate::document::field::is_sidecar_field;
use crate::document::{
    Document, Field, FieldValue, CONVERT_TO_JSON_SUFFIX, DISTANCE_FIELD_NAME,
    DOCUMENT_ID_FIELD_NAME, EMPTY_STRING_SENTINEL, IS_ARRAY_SUFFIX, NULL_SENTINEL, RANGE_SUFFIX,
};
use crate::error::{Result, ShrikeError};
use crate::index::core::IndexCore;
use crate::query::builder::{split_clauses, QueryBuilder};
use crate::query::query::ParsedQuery;
use crate::query::types::{FieldsToFetch, IndexQuery, QueryHit, QueryResults, PAGE_SIZE_ALL};
use crate::plugins::QueryTrigger;

/// Upper bound on the rescaled page size used when refilling a page whose
/// hits were mostly skipped, so a pathological post-filter cannot grow
/// pages without limit.
const MAX_REFILL_PAGE_SIZE: usize = 4096;

/// Predicate deciding whether a projected hit enters the result page.
pub type IncludePredicate<'a> = Box<dyn Fn(&QueryHit) -> bool + 'a>;

/// A single query execution against one index.
pub struct QueryOperation<'a> {
    index: &'a IndexCore,
    query: IndexQuery,
    fields_to_fetch: FieldsToFetch,
    triggers: Vec<Arc<dyn QueryTrigger>>,
    include_in_results: IncludePredicate<'a>,
}

impl<'a> QueryOperation<'a> {
    /// Create an operation over `index` with no post-filter and no
    /// triggers.
    pub fn new(index: &'a IndexCore, query: IndexQuery, fields_to_fetch: FieldsToFetch) -> Self {
        QueryOperation {
            index,
            query,
            fields_to_fetch,
            triggers: Vec::new(),
            include_in_results: Box::new(|_| true),
        }
    }

    /// Attach query triggers, applied in order.
    pub fn with_triggers(mut self, triggers: Vec<Arc<dyn QueryTrigger>>) -> Self {
        self.triggers = triggers;
        self
    }

    /// Attach an include-in-results predicate.
    pub fn with_include_predicate(mut self, predicate: impl Fn(&QueryHit) -> bool + 'a) -> Self {
        self.include_in_results = Box::new(predicate);
        self
    }

    /// Execute the query and collect one page of results.
    pub fn execute(self) -> Result<QueryResults> {
        self.validate_fields()?;

        let (parsed, filter) = self.build_queries()?;
        let parsed = self
            .triggers
            .iter()
            .fold(parsed, |q, t| t.process_query(self.index.name(), q, &self.query));

        let lease = self.index.searcher()?;

        let original_page_size = self.query.page_size;
        let mut start = self.query.start;
        let mut page_size = original_page_size;
        let mut already_seen: AHashSet<String> = AHashSet::new();
        let mut results: Vec<QueryHit> = Vec::new();
        let mut skipped_results = 0u64;
        let mut total_hits;

        loop {
            let limit = if page_size == PAGE_SIZE_ALL {
                None
            } else {
                Some(start.saturating_add(page_size))
            };
            let search = lease.search(
                &parsed,
                filter.as_ref(),
                &self.query.sorted_fields,
                limit,
            )?;
            total_hits = search.total_hits;
            let hits = &search.hits;

            // Distinct bookkeeping: everything before the requested start
            // counts as already seen, so later pages stay duplicate-free.
            if self.query.is_distinct {
                for hit in hits.iter().take(start.min(hits.len())) {
                    if let Some(doc) = lease.reader().document(hit.doc_id) {
                        let projected = self.project(doc, hit.score)?;
                        already_seen.insert(projected.projection.to_string());
                    }
                }
            }

            let end = if page_size == PAGE_SIZE_ALL {
                hits.len()
            } else {
                hits.len().min(start.saturating_add(page_size))
            };
            let mut skipped_in_loop = 0usize;

            for hit in hits.iter().take(end).skip(start) {
                let Some(doc) = lease.reader().document(hit.doc_id) else {
                    continue;
                };
                let projected = self.project(doc, hit.score)?;

                if !(self.include_in_results)(&projected) {
                    skipped_results += 1;
                    skipped_in_loop += 1;
                    continue;
                }
                if self.query.is_distinct
                    && !already_seen.insert(projected.projection.to_string())
                {
                    skipped_results += 1;
                    skipped_in_loop += 1;
                    continue;
                }

                results.push(projected);
                if results.len() >= original_page_size {
                    break;
                }
            }

            if results.len() >= original_page_size
                || skipped_in_loop == 0
                || end >= total_hits as usize
            {
                break;
            }

            // Refill: scale the page by the observed skip volume, bounded
            // so a dense filter cannot explode the fetch size.
            start += page_size;
            let scaled = skipped_in_loop.saturating_mul(original_page_size);
            page_size = scaled.clamp(
                original_page_size,
                MAX_REFILL_PAGE_SIZE.max(original_page_size),
            );
        }

        Ok(QueryResults {
            results,
            total_hits,
            skipped_results,
        })
    }

    /// Every field named in the query text and the sort descriptors must
    /// be part of the index schema, either directly or through its
    /// `_Range` form. The distance field is sortable without declaration.
    fn validate_fields(&self) -> Result<()> {
        for clause in split_clauses(&self.query.query)? {
            if let Some((field, _)) = clause.split_once(':') {
                if !field.is_empty() && !self.is_queryable_field(field) {
                    return Err(ShrikeError::invalid_argument(format!(
                        "the field '{field}' is not indexed by index '{}', cannot query on fields that are not indexed",
                        self.index.name()
                    )));
                }
            }
        }
        for sort in &self.query.sorted_fields {
            if sort.field == DISTANCE_FIELD_NAME {
                continue;
            }
            if !self.is_queryable_field(&sort.field) {
                return Err(ShrikeError::invalid_argument(format!(
                    "the field '{}' is not indexed by index '{}', cannot sort on fields that are not indexed",
                    sort.field,
                    self.index.name()
                )));
            }
        }
        Ok(())
    }

    fn is_queryable_field(&self, field: &str) -> bool {
        if field == DOCUMENT_ID_FIELD_NAME {
            return true;
        }
        let view = self.index.view_generator();
        if view.contains_field(field) {
            return true;
        }
        field
            .strip_suffix(RANGE_SUFFIX)
            .is_some_and(|stripped| view.contains_field(stripped))
    }

    /// Compose the query analyzer and parse the query and filter text.
    ///
    /// The composite starts from the definition like the write path, keys
    /// stay exact through a keyword analyzer on the id field, and analyzer
    /// generators may substitute the default; a superseded non-default
    /// analyzer is dropped on the spot.
    fn build_queries(&self) -> Result<(ParsedQuery, Option<ParsedQuery>)> {
        let default: Arc<dyn Analyzer> = Arc::new(StopAnalyzer::new());
        let mut released: Vec<Arc<dyn Analyzer>> = Vec::new();

        let mut analyzer = AnalyzerFactory::create_analyzer(
            Arc::clone(&default),
            self.index.definition(),
            &mut released,
        )?;
        analyzer.add_analyzer(DOCUMENT_ID_FIELD_NAME, Arc::new(KeywordAnalyzer::new()));

        for generator in self.index.analyzer_generators() {
            let active = Arc::clone(analyzer.default_analyzer());
            if let Some(replacement) =
                generator.generate_for_querying(self.index.name(), &self.query.query, &active)
            {
                if !Arc::ptr_eq(&replacement, &active) {
                    let superseded = analyzer.set_default_analyzer(replacement);
                    if !Arc::ptr_eq(&superseded, &default) {
                        drop(superseded);
                    }
                }
            }
        }

        let builder = QueryBuilder::with_id_default(analyzer);
        let parsed = builder.build(&self.query.query)?;
        let filter = match &self.query.filter {
            Some(filter) => Some(builder.build(filter)?),
            None => None,
        };
        drop(released);
        Ok((parsed, filter))
    }

    /// Project a stored document through the fields-to-fetch rules.
    fn project(&self, doc: &Document, score: f32) -> Result<QueryHit> {
        let names: Vec<String> = if self.fields_to_fetch.is_all() {
            let mut seen = AHashSet::new();
            doc.fields()
                .iter()
                .filter(|f| !f.is_sidecar())
                .filter(|f| seen.insert(f.name.clone()))
                .map(|f| f.name.clone())
                .collect()
        } else {
            self.fields_to_fetch.fields().to_vec()
        };

        let mut projection = Map::new();
        for name in names {
            if is_sidecar_field(&name) {
                continue;
            }
            let values: Vec<Value> = doc
                .get_all(&name)
                .map(|field| create_property(doc, field))
                .collect::<Result<_>>()?;
            if values.is_empty() {
                continue;
            }

            let is_array = doc.has_field(&format!("{name}{IS_ARRAY_SUFFIX}"));
            let value = if values.len() == 1 && !is_array {
                values.into_iter().next().expect("one value")
            } else {
                Value::Array(values)
            };
            projection.insert(name, value);
        }

        Ok(QueryHit {
            key: doc.document_key().map(str::to_string),
            projection: Value::Object(projection),
            score,
        })
    }
}

/// Decode one stored field into its projected value.
///
/// A `_ConvertToJson` sidecar makes the stored string parse as JSON; the
/// reserved sentinels decode to null and the empty string.
fn create_property(doc: &Document, field: &Field) -> Result<Value> {
    let has_json_sidecar = doc.has_field(&format!("{}{}", field.name, CONVERT_TO_JSON_SUFFIX));
    match &field.value {
        FieldValue::Text(text) if has_json_sidecar => {
            let value: Value = serde_json::from_str(text)?;
            Ok(value)
        }
        FieldValue::Text(text) if text == NULL_SENTINEL => Ok(Value::Null),
        FieldValue::Text(text) if text == EMPTY_STRING_SENTINEL => {
            Ok(Value::String(String::new()))
        }
        other => Ok(other.to_json()),
    }
}
