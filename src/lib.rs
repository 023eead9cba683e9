//! # Shrike
//!
//! An embeddable single-index engine for document databases.
//!
//! Each [`IndexCore`] owns one inverted index over a directory (in-memory
//! or filesystem) and mediates two concurrent workloads: batched indexing
//! of records produced by a user-supplied view transformation, and
//! full-text queries reading consistent snapshots of the index. A host
//! process owns many independent cores, addressed by name.
//!
//! ## Features
//!
//! - One serialized writer, many lock-free snapshot readers
//! - Per-field composable text analysis
//! - Fault-tolerant batch transformation with failure statistics
//! - RAM-resident temp indexes promoted to disk past a size threshold
//! - Paged queries with post-filter and cross-page distinct semantics

pub mod analysis;
pub mod document;
pub mod error;
pub mod index;
pub mod indexing;
pub mod plugins;
pub mod query;
pub mod storage;

pub use document::Document;
pub use error::{Result, ShrikeError};
pub use index::{IndexCore, IndexDefinition};
pub use indexing::WorkContext;
pub use query::{IndexQuery, QueryOperation};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
