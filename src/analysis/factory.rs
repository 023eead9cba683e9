//! Builds the composite per-field analyzer for a write or query pass.

use std::sync::Arc;

use crate::analysis::analyzer::{
    Analyzer, KeywordAnalyzer, PerFieldAnalyzer, SimpleAnalyzer, StandardAnalyzer, StopAnalyzer,
};
use crate::analysis::tokenizer::{WhitespaceTokenizer, WordTokenizer};
use crate::error::Result;
use crate::index::definition::{FieldIndexing, IndexDefinition};

/// Resolve an analyzer class identifier to an instance.
///
/// Identifiers may be short names (`"StandardAnalyzer"`) or dotted type
/// names; only the trailing segment is matched, so definitions written for
/// other runtimes keep resolving. Unknown identifiers yield `None`.
pub fn resolve_analyzer(class_id: &str) -> Option<Arc<dyn Analyzer>> {
    let short = class_id.rsplit('.').next().unwrap_or(class_id);
    let analyzer: Arc<dyn Analyzer> = match short {
        "StandardAnalyzer" => Arc::new(StandardAnalyzer::new().ok()?),
        "KeywordAnalyzer" => Arc::new(KeywordAnalyzer::new()),
        "StopAnalyzer" => Arc::new(StopAnalyzer::new()),
        "SimpleAnalyzer" => Arc::new(SimpleAnalyzer::new(Arc::new(WordTokenizer::new()))),
        "WhitespaceAnalyzer" => Arc::new(SimpleAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))),
        _ => return None,
    };
    Some(analyzer)
}

/// Factory for per-field composite analyzers.
///
/// Construction rules, applied in order:
///
/// 1. the supplied default analyzer is the fallback for unmapped fields;
/// 2. each analyzer entry in the definition whose class identifier resolves
///    is attached to its field (unknown identifiers are skipped);
/// 3. `NotAnalyzed` fields share one lazily-created keyword analyzer;
/// 4. `Analyzed` fields without an explicit entry share one lazily-created
///    standard analyzer.
///
/// Every analyzer the factory creates is appended to `released_on_exit`, so
/// the caller holds the only ledger of owned instances and can drop them
/// deterministically on every exit path.
pub struct AnalyzerFactory;

impl AnalyzerFactory {
    /// Build the composite analyzer for `definition`.
    pub fn create_analyzer(
        default_analyzer: Arc<dyn Analyzer>,
        definition: &IndexDefinition,
        released_on_exit: &mut Vec<Arc<dyn Analyzer>>,
    ) -> Result<PerFieldAnalyzer> {
        let mut per_field = PerFieldAnalyzer::new(default_analyzer);

        for (field, class_id) in definition.analyzers() {
            if let Some(analyzer) = resolve_analyzer(class_id) {
                released_on_exit.push(Arc::clone(&analyzer));
                per_field.add_analyzer(field.clone(), analyzer);
            }
        }

        let mut keyword: Option<Arc<dyn Analyzer>> = None;
        let mut standard: Option<Arc<dyn Analyzer>> = None;

        for (field, mode) in definition.indexing() {
            match mode {
                FieldIndexing::NotAnalyzed => {
                    let analyzer = match &keyword {
                        Some(existing) => Arc::clone(existing),
                        None => {
                            let created: Arc<dyn Analyzer> = Arc::new(KeywordAnalyzer::new());
                            released_on_exit.push(Arc::clone(&created));
                            keyword = Some(Arc::clone(&created));
                            created
                        }
                    };
                    per_field.add_analyzer(field.clone(), analyzer);
                }
                FieldIndexing::Analyzed => {
                    if per_field.has_analyzer(field) {
                        continue;
                    }
                    let analyzer = match &standard {
                        Some(existing) => Arc::clone(existing),
                        None => {
                            let created: Arc<dyn Analyzer> = Arc::new(StandardAnalyzer::new()?);
                            released_on_exit.push(Arc::clone(&created));
                            standard = Some(Arc::clone(&created));
                            created
                        }
                    };
                    per_field.add_analyzer(field.clone(), analyzer);
                }
                FieldIndexing::Default => {}
            }
        }

        Ok(per_field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    fn definition() -> IndexDefinition {
        IndexDefinition::new("catalog/search")
            .with_analyzer("tags", "KeywordAnalyzer")
            .with_analyzer("body", "No.Such.Analyzer")
            .with_indexing("title", FieldIndexing::Analyzed)
            .with_indexing("sku", FieldIndexing::NotAnalyzed)
            .with_indexing("price", FieldIndexing::Default)
    }

    #[test]
    fn test_resolve_analyzer_by_trailing_segment() {
        assert!(resolve_analyzer("StandardAnalyzer").is_some());
        assert!(resolve_analyzer("Some.Runtime.Analysis.KeywordAnalyzer").is_some());
        assert!(resolve_analyzer("CustomUnknownAnalyzer").is_none());
    }

    #[test]
    fn test_factory_maps_fields_per_definition() {
        let mut released = Vec::new();
        let per_field = AnalyzerFactory::create_analyzer(
            Arc::new(StopAnalyzer::new()),
            &definition(),
            &mut released,
        )
        .unwrap();

        // Explicit entry resolved; unknown class identifier skipped silently.
        assert!(per_field.has_analyzer("tags"));
        assert!(!per_field.has_analyzer("body"));

        // NotAnalyzed keeps identifiers whole.
        let tokens: Vec<Token> = per_field.analyze_field("sku", "AB 12").unwrap().collect();
        assert_eq!(tokens.len(), 1);

        // Analyzed without an explicit entry gets the standard analyzer.
        let tokens: Vec<Token> = per_field
            .analyze_field("title", "The Title")
            .unwrap()
            .collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "title");

        // Default mode leaves the field on the fallback analyzer.
        assert!(!per_field.has_analyzer("price"));
    }

    #[test]
    fn test_factory_records_created_instances() {
        let mut released = Vec::new();
        let _ = AnalyzerFactory::create_analyzer(
            Arc::new(StopAnalyzer::new()),
            &definition(),
            &mut released,
        )
        .unwrap();

        // One for the explicit "tags" entry, one shared keyword, one shared
        // standard. The unknown identifier contributes nothing.
        assert_eq!(released.len(), 3);
    }

    #[test]
    fn test_shared_instances_are_created_once() {
        let definition = IndexDefinition::new("multi")
            .with_indexing("a", FieldIndexing::NotAnalyzed)
            .with_indexing("b", FieldIndexing::NotAnalyzed)
            .with_indexing("c", FieldIndexing::Analyzed)
            .with_indexing("d", FieldIndexing::Analyzed);

        let mut released = Vec::new();
        let _ = AnalyzerFactory::create_analyzer(
            Arc::new(StopAnalyzer::new()),
            &definition,
            &mut released,
        )
        .unwrap();

        assert_eq!(released.len(), 2);
    }
}
