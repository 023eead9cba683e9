//! Query execution against a point-in-time reader.

use std::cmp::Ordering;

use ahash::AHashMap;

use crate::document::FieldValue;
use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::collector::{Collector, GatherAllCollector, TopScoreCollector};
use crate::query::types::SortDescriptor;
use crate::query::ParsedQuery;

/// A scored document reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// The document id within the snapshot.
    pub doc_id: u64,
    /// The score of the hit.
    pub score: f32,
}

/// Hits and the total match count of one search pass.
#[derive(Debug, Default)]
pub struct SearchResults {
    /// Retained hits, best first.
    pub hits: Vec<SearchHit>,
    /// Total matching documents, including hits not retained.
    pub total_hits: u64,
}

/// An immutable searcher over one [`IndexReader`] snapshot.
///
/// Scores are term-frequency sums; equal scores come back in doc-id order
/// so unscored queries page deterministically.
pub struct IndexSearcher {
    reader: IndexReader,
}

impl IndexSearcher {
    /// Create a searcher over the given reader.
    pub fn new(reader: IndexReader) -> Self {
        IndexSearcher { reader }
    }

    /// The underlying reader.
    pub fn reader(&self) -> &IndexReader {
        &self.reader
    }

    /// Execute `query` and return up to `limit` hits (`None` gathers every
    /// hit). An optional `filter` query restricts matches; `sort`
    /// descriptors override score ordering.
    pub fn search(
        &self,
        query: &ParsedQuery,
        filter: Option<&ParsedQuery>,
        sort: &[SortDescriptor],
        limit: Option<usize>,
    ) -> Result<SearchResults> {
        let mut matches = self.evaluate(query);

        if let Some(filter) = filter {
            let allowed = self.evaluate(filter);
            let allowed: ahash::AHashSet<u64> = allowed.into_iter().map(|(id, _)| id).collect();
            matches.retain(|(id, _)| allowed.contains(id));
        }

        if !sort.is_empty() {
            let total_hits = matches.len() as u64;
            matches.sort_by(|(a, _), (b, _)| self.compare_docs(*a, *b, sort));
            let mut hits: Vec<SearchHit> = matches
                .into_iter()
                .map(|(doc_id, score)| SearchHit { doc_id, score })
                .collect();
            if let Some(limit) = limit {
                hits.truncate(limit);
            }
            return Ok(SearchResults { hits, total_hits });
        }

        let mut collector: Box<dyn Collector> = match limit {
            Some(limit) => Box::new(TopScoreCollector::new(limit)),
            None => Box::new(GatherAllCollector::new()),
        };
        for (doc_id, score) in matches {
            collector.collect(doc_id, score);
        }
        let total_hits = collector.total_hits();
        Ok(SearchResults {
            hits: collector.into_hits(),
            total_hits,
        })
    }

    /// Evaluate a query into (doc id, score) pairs in doc-id order.
    fn evaluate(&self, query: &ParsedQuery) -> Vec<(u64, f32)> {
        let scored = self.evaluate_scored(query);
        let mut matches: Vec<(u64, f32)> = scored.into_iter().collect();
        matches.sort_by_key(|(id, _)| *id);
        matches
    }

    fn evaluate_scored(&self, query: &ParsedQuery) -> AHashMap<u64, f32> {
        match query {
            ParsedQuery::MatchAll => self
                .reader
                .live_doc_ids()
                .map(|id| (id, 1.0))
                .collect(),
            ParsedQuery::Term { field, term } => self
                .reader
                .postings(field, term)
                .into_iter()
                .flatten()
                .map(|p| (p.doc_id, p.freq as f32))
                .collect(),
            ParsedQuery::Prefix { field, prefix } => {
                let mut scored: AHashMap<u64, f32> = AHashMap::new();
                for postings in self.reader.postings_with_prefix(field, prefix) {
                    for posting in postings {
                        *scored.entry(posting.doc_id).or_insert(0.0) += posting.freq as f32;
                    }
                }
                scored
            }
            ParsedQuery::And(clauses) => {
                let mut iter = clauses.iter();
                let Some(first) = iter.next() else {
                    return AHashMap::new();
                };
                let mut scored = self.evaluate_scored(first);
                for clause in iter {
                    let clause_scored = self.evaluate_scored(clause);
                    scored.retain(|id, _| clause_scored.contains_key(id));
                    for (id, score) in scored.iter_mut() {
                        *score += clause_scored[id];
                    }
                }
                scored
            }
            ParsedQuery::Or(clauses) => {
                let mut scored: AHashMap<u64, f32> = AHashMap::new();
                for clause in clauses {
                    for (id, score) in self.evaluate_scored(clause) {
                        *scored.entry(id).or_insert(0.0) += score;
                    }
                }
                scored
            }
        }
    }

    /// Order two documents by the sort descriptors; documents missing a
    /// sort field go last.
    fn compare_docs(&self, a: u64, b: u64, sort: &[SortDescriptor]) -> Ordering {
        for descriptor in sort {
            let value_a = self
                .reader
                .document(a)
                .and_then(|d| d.get(&descriptor.field))
                .map(|f| &f.value);
            let value_b = self
                .reader
                .document(b)
                .and_then(|d| d.get(&descriptor.field))
                .map(|f| &f.value);

            let ordering = match (value_a, value_b) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => {
                    let ordering = compare_values(a, b);
                    if descriptor.descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                }
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        a.cmp(&b)
    }
}

/// Compare two field values of possibly different kinds.
///
/// Numeric kinds compare by value; otherwise values compare within their
/// kind and across kinds by a fixed kind order.
fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    if let (Some(a), Some(b)) = (numeric_value(a), numeric_value(b)) {
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }
    match (a, b) {
        (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
        (FieldValue::Boolean(a), FieldValue::Boolean(b)) => a.cmp(b),
        (FieldValue::DateTime(a), FieldValue::DateTime(b)) => a.cmp(b),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn numeric_value(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Int(v) => Some(*v as f64),
        FieldValue::Long(v) => Some(*v as f64),
        FieldValue::Float(v) => Some(*v as f64),
        FieldValue::Double(v) => Some(*v),
        _ => None,
    }
}

fn kind_rank(value: &FieldValue) -> u8 {
    match value {
        FieldValue::Null => 0,
        FieldValue::Boolean(_) => 1,
        FieldValue::Int(_) | FieldValue::Long(_) | FieldValue::Float(_) | FieldValue::Double(_) => 2,
        FieldValue::DateTime(_) => 3,
        FieldValue::Text(_) => 4,
        FieldValue::Binary(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::StopAnalyzer;
    use crate::analysis::PerFieldAnalyzer;
    use crate::document::{Document, Field};
    use crate::index::writer::IndexWriter;
    use crate::storage::RamDirectory;
    use std::sync::Arc;

    fn searcher() -> IndexSearcher {
        let mut writer =
            IndexWriter::open(Arc::new(RamDirectory::new()), Arc::new(StopAnalyzer::new()))
                .unwrap();
        let analyzer = PerFieldAnalyzer::new(Arc::new(StopAnalyzer::new()));

        for (key, title, price) in [
            ("a", "red apples", 3),
            ("b", "green apples", 1),
            ("c", "red grapes", 2),
        ] {
            let doc = Document::with_id(key)
                .with_field(Field::text("title", title))
                .with_field(Field::new(
                    "price",
                    crate::document::FieldValue::Long(price),
                    true,
                    true,
                ));
            writer.add_document(doc, &analyzer).unwrap();
        }
        IndexSearcher::new(IndexReader::from_writer(&writer))
    }

    fn term(field: &str, term: &str) -> ParsedQuery {
        ParsedQuery::Term {
            field: field.to_string(),
            term: term.to_string(),
        }
    }

    #[test]
    fn test_match_all_in_doc_order() {
        let searcher = searcher();
        let results = searcher
            .search(&ParsedQuery::MatchAll, None, &[], Some(10))
            .unwrap();

        assert_eq!(results.total_hits, 3);
        let ids: Vec<u64> = results.hits.iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_term_query() {
        let searcher = searcher();
        let results = searcher
            .search(&term("title", "red"), None, &[], Some(10))
            .unwrap();

        assert_eq!(results.total_hits, 2);
        let ids: Vec<u64> = results.hits.iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_and_intersects() {
        let searcher = searcher();
        let query = ParsedQuery::And(vec![term("title", "red"), term("title", "apples")]);
        let results = searcher.search(&query, None, &[], Some(10)).unwrap();

        assert_eq!(results.total_hits, 1);
        assert_eq!(results.hits[0].doc_id, 0);
    }

    #[test]
    fn test_filter_restricts_matches() {
        let searcher = searcher();
        let results = searcher
            .search(
                &ParsedQuery::MatchAll,
                Some(&term("title", "apples")),
                &[],
                Some(10),
            )
            .unwrap();

        assert_eq!(results.total_hits, 2);
    }

    #[test]
    fn test_sort_by_stored_field() {
        let searcher = searcher();
        let results = searcher
            .search(
                &ParsedQuery::MatchAll,
                None,
                &[SortDescriptor::ascending("price")],
                None,
            )
            .unwrap();

        let ids: Vec<u64> = results.hits.iter().map(|h| h.doc_id).collect();
        // prices: a=3, b=1, c=2 -> ascending b, c, a
        assert_eq!(ids, vec![1, 2, 0]);
    }

    #[test]
    fn test_limit_truncates_but_total_counts() {
        let searcher = searcher();
        let results = searcher
            .search(&ParsedQuery::MatchAll, None, &[], Some(2))
            .unwrap();

        assert_eq!(results.total_hits, 3);
        assert_eq!(results.hits.len(), 2);
    }
}
