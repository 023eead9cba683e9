//! Statistics sink updated while a batch streams through the index.

/// Counters the storage layer maintains about indexing progress.
///
/// Implementations must tolerate concurrent calls. Failures inside a
/// counter update are the implementor's to surface; the indexing pipeline
/// logs and swallows them so a broken statistics store cannot fail a batch.
pub trait IndexingStatistics: Send + Sync {
    /// A source document is about to be transformed for the map phase.
    fn increment_indexing_attempt(&self);

    /// The source document produced its records successfully.
    fn increment_indexing_success(&self);

    /// The transform failed for the source document.
    fn increment_indexing_failure(&self);

    /// Undo an attempt count for an item whose advance never completed.
    fn decrement_indexing_attempt(&self);

    /// Reduce-phase counterparts.
    fn increment_reduce_attempt(&self);
    fn increment_reduce_success(&self);
    fn increment_reduce_failure(&self);
    fn decrement_reduce_attempt(&self);
}

/// A statistics sink that records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStatistics;

impl IndexingStatistics for NullStatistics {
    fn increment_indexing_attempt(&self) {}
    fn increment_indexing_success(&self) {}
    fn increment_indexing_failure(&self) {}
    fn decrement_indexing_attempt(&self) {}
    fn increment_reduce_attempt(&self) {}
    fn increment_reduce_success(&self) {}
    fn increment_reduce_failure(&self) {}
    fn decrement_reduce_attempt(&self) {}
}
