//! Pluggable behavior consumed by the index core.
//!
//! Plugins are small trait objects registered by the host: the view
//! generator supplies the document transformation and the field schema;
//! query triggers may rewrite parsed queries; analyzer generators may
//! substitute analyzers per write or per query; extensions observe indexed
//! documents.

use std::sync::Arc;

use serde_json::Value;

use crate::analysis::Analyzer;
use crate::document::Document;
use crate::error::Result;
use crate::query::types::IndexQuery;
use crate::query::ParsedQuery;

/// A source document as produced by the map/reduce planner.
pub type SourceDocument = Value;

/// A map function turning one source document into indexable records.
pub type IndexingFn = Arc<dyn Fn(&SourceDocument) -> Result<Vec<Document>> + Send + Sync>;

/// The user-supplied transformation behind an index.
///
/// `contains_field` doubles as the field schema queries are validated
/// against.
pub trait ViewGenerator: Send + Sync {
    /// Whether the view emits a field with the given name.
    fn contains_field(&self, name: &str) -> bool;

    /// The map functions of this view, applied in order.
    fn indexing_functions(&self) -> Vec<IndexingFn>;

    /// The reduce function, for map-reduce views.
    fn reduce_function(&self) -> Option<IndexingFn> {
        None
    }
}

/// Derive the key of a source document.
///
/// Falls back through the documented lookup chain: the reserved id field,
/// then the name with a leading underscore stripped, then `Id`.
pub fn source_document_key(doc: &SourceDocument) -> Option<String> {
    let object = doc.as_object()?;
    for name in [crate::document::DOCUMENT_ID_FIELD_NAME, "document_id", "Id"] {
        if let Some(key) = object.get(name).and_then(Value::as_str) {
            return Some(key.to_string());
        }
    }
    None
}

/// A hook that may rewrite a parsed query before execution.
pub trait QueryTrigger: Send + Sync {
    /// Rewrite `parsed`; return it unchanged when not interested.
    fn process_query(
        &self,
        index_name: &str,
        parsed: ParsedQuery,
        query: &IndexQuery,
    ) -> ParsedQuery;
}

/// A hook that may substitute the analyzer used for a write or a query.
///
/// Returning `None` keeps the current analyzer. When a generator returns a
/// replacement, the core drops the analyzer it replaces (unless it is the
/// caller-owned default).
pub trait AnalyzerGenerator: Send + Sync {
    /// Pick an analyzer for indexing the given document.
    fn generate_for_indexing(
        &self,
        index_name: &str,
        document: &Document,
        current: &Arc<dyn Analyzer>,
    ) -> Option<Arc<dyn Analyzer>>;

    /// Pick an analyzer for parsing the given query string.
    fn generate_for_querying(
        &self,
        index_name: &str,
        query_text: &str,
        current: &Arc<dyn Analyzer>,
    ) -> Option<Arc<dyn Analyzer>>;
}

/// A named observer notified with the documents added by each write.
///
/// Notification failures propagate and fail the write; failures during
/// dispose are logged and swallowed so index teardown completes.
pub trait IndexExtension: Send + Sync {
    /// Called under the write lock with deep copies of the documents
    /// indexed by the completing batch.
    fn on_documents_indexed(&self, documents: &[Document]) -> Result<()>;

    /// Release any resources held by the extension.
    fn dispose(&self) -> Result<()> {
        Ok(())
    }
}
