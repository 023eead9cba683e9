//! Batched indexing support: work context, statistics, and the
//! fault-tolerant transform iterator.

pub mod context;
pub mod robust;
pub mod stats;

pub use context::{IndexingConfig, IndexingError, WorkContext};
pub use robust::{IterationHooks, RobustIterator};
pub use stats::{IndexingStatistics, NullStatistics};
