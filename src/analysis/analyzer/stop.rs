//! Stop-word analyzer used as the writer default.

use std::sync::Arc;

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::filter::{LowercaseFilter, StopFilter};
use crate::analysis::token::TokenStream;
use crate::analysis::tokenizer::WhitespaceTokenizer;
use crate::error::Result;

/// The analyzer an index writer is opened with when no other analyzer
/// applies to a field.
///
/// Splits on whitespace, lowercases, and removes English stop words. Unlike
/// [`StandardAnalyzer`](crate::analysis::StandardAnalyzer) it keeps
/// punctuation inside tokens, so values like `users/1-A` survive as written
/// (modulo case).
pub struct StopAnalyzer {
    inner: PipelineAnalyzer,
}

impl StopAnalyzer {
    /// Create a new stop-word analyzer.
    pub fn new() -> Self {
        let inner = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(StopFilter::new()))
            .with_name("stop");

        StopAnalyzer { inner }
    }
}

impl Default for StopAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for StopAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}

impl std::fmt::Debug for StopAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopAnalyzer").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_stop_analyzer_keeps_punctuation() {
        let analyzer = StopAnalyzer::new();
        let tokens: Vec<Token> = analyzer.analyze("the Users/1-A record").unwrap().collect();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["users/1-a", "record"]);
    }
}
