//! Query model and the one-shot query operation.

pub mod builder;
pub mod collector;
pub mod executor;
pub mod query;
pub mod types;

pub use builder::QueryBuilder;
pub use collector::{Collector, GatherAllCollector, TopScoreCollector};
pub use executor::QueryOperation;
pub use query::ParsedQuery;
pub use types::{FieldsToFetch, IndexQuery, QueryHit, QueryResults, SortDescriptor, PAGE_SIZE_ALL};
