//! Query inputs and outputs.

use serde_json::Value;

/// Page-size sentinel asking for every hit in one page.
pub const PAGE_SIZE_ALL: usize = usize::MAX;

/// A sort instruction over a stored field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDescriptor {
    /// The field sorted on.
    pub field: String,
    /// Sort direction.
    pub descending: bool,
}

impl SortDescriptor {
    /// Ascending sort on `field`.
    pub fn ascending(field: impl Into<String>) -> Self {
        SortDescriptor {
            field: field.into(),
            descending: false,
        }
    }

    /// Descending sort on `field`.
    pub fn descending(field: impl Into<String>) -> Self {
        SortDescriptor {
            field: field.into(),
            descending: true,
        }
    }
}

/// Which stored fields a query projects.
///
/// An empty list projects every stored, non-sidecar field.
#[derive(Debug, Clone, Default)]
pub struct FieldsToFetch {
    fields: Vec<String>,
}

impl FieldsToFetch {
    /// Project all stored fields.
    pub fn all() -> Self {
        FieldsToFetch { fields: Vec::new() }
    }

    /// Project only the named fields.
    pub fn named<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldsToFetch {
            fields: fields.into_iter().map(|s| s.into()).collect(),
        }
    }

    /// The explicit field list, empty when projecting everything.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Whether this descriptor projects every stored field.
    pub fn is_all(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The parameters of one query request.
#[derive(Debug, Clone)]
pub struct IndexQuery {
    /// The query text; empty or `*` matches all documents.
    pub query: String,

    /// Offset of the first hit returned.
    pub start: usize,

    /// Number of results per page, or [`PAGE_SIZE_ALL`].
    pub page_size: usize,

    /// Sort instructions applied in order.
    pub sorted_fields: Vec<SortDescriptor>,

    /// Optional filter query text; hits must match it as well.
    pub filter: Option<String>,

    /// Whether projections are de-duplicated across pages.
    pub is_distinct: bool,
}

impl IndexQuery {
    /// A query over `query` text with default paging.
    pub fn new(query: impl Into<String>) -> Self {
        IndexQuery {
            query: query.into(),
            start: 0,
            page_size: 128,
            sorted_fields: Vec::new(),
            filter: None,
            is_distinct: false,
        }
    }

    /// Set a filter query.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set the start offset.
    pub fn with_start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Request distinct projections.
    pub fn distinct(mut self) -> Self {
        self.is_distinct = true;
        self
    }

    /// Add a sort descriptor.
    pub fn with_sort(mut self, sort: SortDescriptor) -> Self {
        self.sorted_fields.push(sort);
        self
    }
}

/// One projected query result.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    /// The document key, when the document stores one.
    pub key: Option<String>,

    /// The projected fields as a JSON object.
    pub projection: Value,

    /// The query score of the underlying hit.
    pub score: f32,
}

/// The outcome of one query operation.
#[derive(Debug, Default)]
pub struct QueryResults {
    /// The page of included results, in result order.
    pub results: Vec<QueryHit>,

    /// Total matching documents, before paging and filtering.
    pub total_hits: u64,

    /// Hits consumed but excluded by the post-filter or distinct rules.
    /// Callers paging through distinct queries add this to the next start
    /// offset.
    pub skipped_results: u64,
}
