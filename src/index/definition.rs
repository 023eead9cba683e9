//! The static schema of one index.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// How a field participates in the inverted index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldIndexing {
    /// The field value is tokenized through its analyzer.
    Analyzed,
    /// The field value is indexed as one exact term.
    NotAnalyzed,
    /// The field follows the writer's default behavior.
    Default,
}

/// The immutable definition an index is created with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Stable index name; addresses the index within the host.
    name: String,

    /// Whether this index has a reduce phase.
    is_map_reduce: bool,

    /// Field name to analyzer class identifier.
    analyzers: AHashMap<String, String>,

    /// Field name to indexing mode.
    indexing: AHashMap<String, FieldIndexing>,

    /// Whether the index is a temp index eligible for in-memory residence.
    is_temp: bool,
}

impl IndexDefinition {
    /// Create a plain map index definition.
    pub fn new(name: impl Into<String>) -> Self {
        IndexDefinition {
            name: name.into(),
            is_map_reduce: false,
            analyzers: AHashMap::new(),
            indexing: AHashMap::new(),
            is_temp: false,
        }
    }

    /// Mark this definition as map-reduce.
    pub fn map_reduce(mut self) -> Self {
        self.is_map_reduce = true;
        self
    }

    /// Mark this definition as a temp index.
    pub fn temp(mut self) -> Self {
        self.is_temp = true;
        self
    }

    /// Attach an analyzer class identifier to a field.
    pub fn with_analyzer(mut self, field: impl Into<String>, class_id: impl Into<String>) -> Self {
        self.analyzers.insert(field.into(), class_id.into());
        self
    }

    /// Set the indexing mode of a field.
    pub fn with_indexing(mut self, field: impl Into<String>, mode: FieldIndexing) -> Self {
        self.indexing.insert(field.into(), mode);
        self
    }

    /// The index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this index has a reduce phase.
    pub fn is_map_reduce(&self) -> bool {
        self.is_map_reduce
    }

    /// Whether this index is a temp index.
    pub fn is_temp(&self) -> bool {
        self.is_temp
    }

    /// The per-field analyzer class identifiers.
    pub fn analyzers(&self) -> &AHashMap<String, String> {
        &self.analyzers
    }

    /// The per-field indexing modes.
    pub fn indexing(&self) -> &AHashMap<String, FieldIndexing> {
        &self.indexing
    }

    /// The indexing mode of a field.
    pub fn indexing_mode(&self, field: &str) -> FieldIndexing {
        self.indexing
            .get(field)
            .copied()
            .unwrap_or(FieldIndexing::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_builder() {
        let definition = IndexDefinition::new("orders/totals")
            .map_reduce()
            .temp()
            .with_analyzer("body", "StandardAnalyzer")
            .with_indexing("sku", FieldIndexing::NotAnalyzed);

        assert_eq!(definition.name(), "orders/totals");
        assert!(definition.is_map_reduce());
        assert!(definition.is_temp());
        assert_eq!(definition.indexing_mode("sku"), FieldIndexing::NotAnalyzed);
        assert_eq!(definition.indexing_mode("other"), FieldIndexing::Default);
    }
}
