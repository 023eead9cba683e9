//! Collector implementations for gathering search hits.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::index::searcher::SearchHit;

/// Trait for collecting scored documents during query execution.
pub trait Collector {
    /// Collect a document hit.
    fn collect(&mut self, doc_id: u64, score: f32);

    /// The collected hits, best first.
    fn into_hits(self: Box<Self>) -> Vec<SearchHit>;

    /// Total number of hits seen, including ones not retained.
    fn total_hits(&self) -> u64;
}

/// A scored document ordered for the top-N min-heap.
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    doc_id: u64,
    score: f32,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.doc_id == other.doc_id
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap over (score asc, doc_id desc): the heap root is the
        // weakest retained hit, and on equal scores later documents are
        // evicted before earlier ones.
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

/// Keeps the `max_docs` best hits by score; ties break toward lower doc
/// ids so equal-scored results come back in index order.
#[derive(Debug)]
pub struct TopScoreCollector {
    max_docs: usize,
    hits: BinaryHeap<HeapEntry>,
    total_hits: u64,
}

impl TopScoreCollector {
    /// Create a collector retaining at most `max_docs` hits.
    pub fn new(max_docs: usize) -> Self {
        TopScoreCollector {
            max_docs,
            hits: BinaryHeap::with_capacity(max_docs.min(1024) + 1),
            total_hits: 0,
        }
    }
}

impl Collector for TopScoreCollector {
    fn collect(&mut self, doc_id: u64, score: f32) {
        self.total_hits += 1;
        if self.max_docs == 0 {
            return;
        }
        self.hits.push(HeapEntry { doc_id, score });
        if self.hits.len() > self.max_docs {
            self.hits.pop();
        }
    }

    fn into_hits(self: Box<Self>) -> Vec<SearchHit> {
        let mut hits: Vec<SearchHit> = self
            .hits
            .into_iter()
            .map(|entry| SearchHit {
                doc_id: entry.doc_id,
                score: entry.score,
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        hits
    }

    fn total_hits(&self) -> u64 {
        self.total_hits
    }
}

/// Retains every hit in arrival order. Used when a query asks for all
/// results at once.
#[derive(Debug, Default)]
pub struct GatherAllCollector {
    hits: Vec<SearchHit>,
}

impl GatherAllCollector {
    /// Create an empty gather-all collector.
    pub fn new() -> Self {
        GatherAllCollector { hits: Vec::new() }
    }
}

impl Collector for GatherAllCollector {
    fn collect(&mut self, doc_id: u64, score: f32) {
        self.hits.push(SearchHit { doc_id, score });
    }

    fn into_hits(self: Box<Self>) -> Vec<SearchHit> {
        self.hits
    }

    fn total_hits(&self) -> u64 {
        self.hits.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_score_keeps_best() {
        let mut collector = TopScoreCollector::new(2);
        collector.collect(0, 1.0);
        collector.collect(1, 3.0);
        collector.collect(2, 2.0);

        assert_eq!(collector.total_hits(), 3);
        let hits = Box::new(collector).into_hits();
        let ids: Vec<u64> = hits.iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_equal_scores_come_back_in_doc_order() {
        let mut collector = TopScoreCollector::new(2);
        collector.collect(2, 1.0);
        collector.collect(0, 1.0);
        collector.collect(1, 1.0);

        let hits = Box::new(collector).into_hits();
        let ids: Vec<u64> = hits.iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_gather_all_keeps_arrival_order() {
        let mut collector = GatherAllCollector::new();
        collector.collect(5, 0.5);
        collector.collect(1, 2.0);

        assert_eq!(collector.total_hits(), 2);
        let hits = Box::new(collector).into_hits();
        assert_eq!(hits[0].doc_id, 5);
    }
}
