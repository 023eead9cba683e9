//! Text analysis pipeline: tokenizers, token filters, and analyzers.
//!
//! Analyzers convert field text into token streams. They are composed
//! per-field at write time and at query time by the [`factory`] module,
//! driven by the index definition and any registered analyzer generators.

pub mod analyzer;
pub mod factory;
pub mod filter;
pub mod token;
pub mod tokenizer;

pub use analyzer::{
    Analyzer, KeywordAnalyzer, PerFieldAnalyzer, PipelineAnalyzer, SimpleAnalyzer, StandardAnalyzer,
    StopAnalyzer,
};
pub use factory::{resolve_analyzer, AnalyzerFactory};
pub use filter::{LowercaseFilter, StopFilter, TokenFilter};
pub use token::{Token, TokenStream};
pub use tokenizer::{Tokenizer, WhitespaceTokenizer, WholeTokenizer, WordTokenizer};
