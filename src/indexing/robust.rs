//! Fault-tolerant iteration over a batch of source documents.
//!
//! [`RobustIterator`] pulls source items through one or more transformation
//! functions and yields the concatenation of their outputs. A failing
//! transform never aborts the stream: the error is handed to the configured
//! hooks and iteration continues with the next item.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::warn;

use crate::error::{Result, ShrikeError};
use crate::indexing::context::WorkContext;
use crate::indexing::stats::IndexingStatistics;

/// A transformation from one source item to zero or more output records.
pub type TransformFn<T, O> = Arc<dyn Fn(&T) -> Result<Vec<O>> + Send + Sync>;

/// Optional callbacks invoked around each source item.
///
/// `before_advance` fires before the transform runs; `cancel_advance` fires
/// when the transform fails before the advance completed, so attempt
/// counters can be unwound; `on_error` receives the item and its error;
/// `on_success` fires after the item's outputs were produced.
#[allow(clippy::type_complexity)]
pub struct IterationHooks<'a, T> {
    pub before_advance: Option<Box<dyn FnMut(&T) + 'a>>,
    pub cancel_advance: Option<Box<dyn FnMut(&T) + 'a>>,
    pub on_error: Option<Box<dyn FnMut(&T, &ShrikeError) + 'a>>,
    pub on_success: Option<Box<dyn FnMut(&T) + 'a>>,
}

impl<'a, T> Default for IterationHooks<'a, T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<'a, T> IterationHooks<'a, T> {
    /// Hooks that do nothing. The silent wiring used during map-phase
    /// reduction.
    pub fn none() -> Self {
        IterationHooks {
            before_advance: None,
            cancel_advance: None,
            on_error: None,
            on_success: None,
        }
    }

    /// Set the before-advance callback.
    pub fn with_before_advance(mut self, f: impl FnMut(&T) + 'a) -> Self {
        self.before_advance = Some(Box::new(f));
        self
    }

    /// Set the cancel-advance callback.
    pub fn with_cancel_advance(mut self, f: impl FnMut(&T) + 'a) -> Self {
        self.cancel_advance = Some(Box::new(f));
        self
    }

    /// Set the error callback.
    pub fn with_on_error(mut self, f: impl FnMut(&T, &ShrikeError) + 'a) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Set the success callback.
    pub fn with_on_success(mut self, f: impl FnMut(&T) + 'a) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }
}

/// The canonical hook wiring for the map phase of an indexing batch.
///
/// Attempts are counted before each advance and unwound when the advance is
/// cancelled; failures bump the failure counter and land in the work
/// context's error sink keyed by the source document (when a key can be
/// derived via `key_of`). A statistics sink that panics while recording a
/// failure is logged and ignored.
pub fn indexing_hooks<'a, T>(
    index_name: &'a str,
    stats: Arc<dyn IndexingStatistics>,
    context: &'a WorkContext,
    key_of: impl Fn(&T) -> Option<String> + 'a,
) -> IterationHooks<'a, T> {
    let before = Arc::clone(&stats);
    let cancel = Arc::clone(&stats);
    let failure = Arc::clone(&stats);
    let success = Arc::clone(&stats);

    IterationHooks::none()
        .with_before_advance(move |_| before.increment_indexing_attempt())
        .with_cancel_advance(move |_| cancel.decrement_indexing_attempt())
        .with_on_error(move |item, error| {
            let key = key_of(item);
            context.add_error(index_name, key, error.to_string());
            let recorded = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                failure.increment_indexing_failure()
            }));
            if recorded.is_err() {
                warn!(index = index_name, "failed to record indexing failure");
            }
        })
        .with_on_success(move |_| success.increment_indexing_success())
}

/// The reduce-phase counterpart of [`indexing_hooks`].
pub fn reduce_hooks<'a, T>(
    index_name: &'a str,
    stats: Arc<dyn IndexingStatistics>,
    context: &'a WorkContext,
    key_of: impl Fn(&T) -> Option<String> + 'a,
) -> IterationHooks<'a, T> {
    let before = Arc::clone(&stats);
    let cancel = Arc::clone(&stats);
    let failure = Arc::clone(&stats);
    let success = Arc::clone(&stats);

    IterationHooks::none()
        .with_before_advance(move |_| before.increment_reduce_attempt())
        .with_cancel_advance(move |_| cancel.decrement_reduce_attempt())
        .with_on_error(move |item, error| {
            let key = key_of(item);
            context.add_error(index_name, key, error.to_string());
            let recorded = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                failure.increment_reduce_failure()
            }));
            if recorded.is_err() {
                warn!(index = index_name, "failed to record reduce failure");
            }
        })
        .with_on_success(move |_| success.increment_reduce_success())
}

/// Pull iterator over `items` × `transforms`.
///
/// Outputs are yielded transform-major: every item flows through the first
/// transform before the second starts, preserving input order within each
/// transform. Iteration stops when the input is exhausted, when `max_items`
/// outputs have been produced, or when the work context is cancelled.
pub struct RobustIterator<'a, T, O> {
    items: &'a [T],
    transforms: Vec<TransformFn<T, O>>,
    hooks: IterationHooks<'a, T>,
    cancellation: Option<&'a WorkContext>,
    max_items: usize,
    transform_idx: usize,
    item_idx: usize,
    pending: VecDeque<O>,
    produced: usize,
}

impl<'a, T, O> RobustIterator<'a, T, O> {
    /// Create an iterator over `items` with a single transform.
    pub fn new(
        items: &'a [T],
        transform: TransformFn<T, O>,
        hooks: IterationHooks<'a, T>,
    ) -> Self {
        Self::with_transforms(items, vec![transform], hooks)
    }

    /// Create an iterator over `items` with several transforms whose
    /// outputs are concatenated.
    pub fn with_transforms(
        items: &'a [T],
        transforms: Vec<TransformFn<T, O>>,
        hooks: IterationHooks<'a, T>,
    ) -> Self {
        RobustIterator {
            items,
            transforms,
            hooks,
            cancellation: None,
            max_items: usize::MAX,
            transform_idx: 0,
            item_idx: 0,
            pending: VecDeque::new(),
            produced: 0,
        }
    }

    /// Stop producing once `max` outputs have been yielded.
    pub fn with_max_items(mut self, max: usize) -> Self {
        self.max_items = max;
        self
    }

    /// Stop producing when `context` is cancelled.
    pub fn with_cancellation(mut self, context: &'a WorkContext) -> Self {
        self.cancellation = Some(context);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation.is_some_and(|c| c.is_cancelled())
    }
}

impl<'a, T, O> Iterator for RobustIterator<'a, T, O> {
    type Item = O;

    fn next(&mut self) -> Option<O> {
        loop {
            if self.produced >= self.max_items {
                return None;
            }
            if let Some(output) = self.pending.pop_front() {
                self.produced += 1;
                return Some(output);
            }
            if self.is_cancelled() {
                return None;
            }

            let transform = Arc::clone(self.transforms.get(self.transform_idx)?);
            let Some(item) = self.items.get(self.item_idx) else {
                self.transform_idx += 1;
                self.item_idx = 0;
                continue;
            };
            self.item_idx += 1;

            if let Some(before) = &mut self.hooks.before_advance {
                before(item);
            }
            match transform(item) {
                Ok(outputs) => {
                    if let Some(success) = &mut self.hooks.on_success {
                        success(item);
                    }
                    self.pending.extend(outputs);
                }
                Err(error) => {
                    if let Some(cancel) = &mut self.hooks.cancel_advance {
                        cancel(item);
                    }
                    if let Some(on_error) = &mut self.hooks.on_error {
                        on_error(item, &error);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingStats {
        attempts: AtomicUsize,
        successes: AtomicUsize,
        failures: AtomicUsize,
        decrements: AtomicUsize,
    }

    impl IndexingStatistics for CountingStats {
        fn increment_indexing_attempt(&self) {
            self.attempts.fetch_add(1, Ordering::SeqCst);
        }
        fn increment_indexing_success(&self) {
            self.successes.fetch_add(1, Ordering::SeqCst);
        }
        fn increment_indexing_failure(&self) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
        fn decrement_indexing_attempt(&self) {
            self.decrements.fetch_add(1, Ordering::SeqCst);
        }
        fn increment_reduce_attempt(&self) {}
        fn increment_reduce_success(&self) {}
        fn increment_reduce_failure(&self) {}
        fn decrement_reduce_attempt(&self) {}
    }

    fn doubling_transform(fail_on: i32) -> TransformFn<i32, i32> {
        Arc::new(move |item: &i32| {
            if *item == fail_on {
                Err(ShrikeError::transform(format!("item {item} rejected")))
            } else {
                Ok(vec![*item * 2])
            }
        })
    }

    #[test]
    fn test_errors_do_not_abort_the_stream() {
        let items = vec![1, 2, 3, 4, 5];
        let outputs: Vec<i32> =
            RobustIterator::new(&items, doubling_transform(3), IterationHooks::none()).collect();

        assert_eq!(outputs, vec![2, 4, 8, 10]);
    }

    #[test]
    fn test_counters_match_outcomes() {
        let items = vec![1, 2, 3, 4, 5];
        let stats = Arc::new(CountingStats::default());
        let context = WorkContext::default();

        let hooks = indexing_hooks(
            "orders/search",
            Arc::clone(&stats) as Arc<dyn IndexingStatistics>,
            &context,
            |item: &i32| Some(format!("items/{item}")),
        );
        let outputs: Vec<i32> =
            RobustIterator::new(&items, doubling_transform(3), hooks).collect();

        assert_eq!(outputs.len(), 4);
        assert_eq!(stats.attempts.load(Ordering::SeqCst), 5);
        assert_eq!(stats.successes.load(Ordering::SeqCst), 4);
        assert_eq!(stats.failures.load(Ordering::SeqCst), 1);
        assert_eq!(stats.decrements.load(Ordering::SeqCst), 1);

        let errors = context.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].document_key.as_deref(), Some("items/3"));
        assert_eq!(errors[0].index, "orders/search");
    }

    #[test]
    fn test_reduce_hooks_record_errors() {
        use crate::indexing::stats::NullStatistics;

        let items = vec![1, 2];
        let context = WorkContext::default();
        let hooks = reduce_hooks(
            "totals/by-day",
            Arc::new(NullStatistics),
            &context,
            |_: &i32| None,
        );

        let outputs: Vec<i32> =
            RobustIterator::new(&items, doubling_transform(2), hooks).collect();

        assert_eq!(outputs, vec![2]);
        let errors = context.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].index, "totals/by-day");
        assert_eq!(errors[0].document_key, None);
    }

    #[test]
    fn test_multiple_transforms_concatenate() {
        let items = vec![1, 2];
        let double: TransformFn<i32, i32> = Arc::new(|i| Ok(vec![i * 2]));
        let negate: TransformFn<i32, i32> = Arc::new(|i| Ok(vec![-i]));

        let outputs: Vec<i32> = RobustIterator::with_transforms(
            &items,
            vec![double, negate],
            IterationHooks::none(),
        )
        .collect();

        assert_eq!(outputs, vec![2, 4, -1, -2]);
    }

    #[test]
    fn test_max_items_caps_production() {
        let items = vec![1, 2, 3];
        let expand: TransformFn<i32, i32> = Arc::new(|i| Ok(vec![*i, *i]));

        let outputs: Vec<i32> = RobustIterator::new(&items, expand, IterationHooks::none())
            .with_max_items(4)
            .collect();

        assert_eq!(outputs.len(), 4);
    }

    #[test]
    fn test_cancellation_stops_production() {
        let items = vec![1, 2, 3, 4];
        let context = WorkContext::default();
        let seen = AtomicUsize::new(0);

        let transform: TransformFn<i32, i32> = Arc::new(|i| Ok(vec![*i]));
        let hooks = IterationHooks::none().with_before_advance(|_: &i32| {
            if seen.fetch_add(1, Ordering::SeqCst) == 1 {
                context.cancel();
            }
        });

        let outputs: Vec<i32> = RobustIterator::new(&items, transform, hooks)
            .with_cancellation(&context)
            .collect();

        // The item in flight when cancellation lands still drains.
        assert_eq!(outputs.len(), 2);
    }
}
