//! Builds parsed queries from query text.
//!
//! The grammar is deliberately small: whitespace-separated clauses are
//! conjoined, a clause is `field:value`, `field:"quoted value"`, or a bare
//! value against the default field, and a trailing `*` turns a clause into
//! a prefix match. `*` or the empty string match everything. Values pass
//! through the same per-field analyzer the write path used, so query terms
//! line up with indexed terms.

use crate::analysis::PerFieldAnalyzer;
use crate::document::DOCUMENT_ID_FIELD_NAME;
use crate::error::{Result, ShrikeError};
use crate::query::query::ParsedQuery;

/// Builds [`ParsedQuery`] values against a per-field analyzer.
pub struct QueryBuilder {
    analyzer: PerFieldAnalyzer,
    default_field: String,
}

impl QueryBuilder {
    /// Create a builder; bare terms search `default_field`.
    pub fn new(analyzer: PerFieldAnalyzer, default_field: impl Into<String>) -> Self {
        QueryBuilder {
            analyzer,
            default_field: default_field.into(),
        }
    }

    /// Create a builder whose bare terms search the document id field.
    pub fn with_id_default(analyzer: PerFieldAnalyzer) -> Self {
        Self::new(analyzer, DOCUMENT_ID_FIELD_NAME)
    }

    /// Parse `query_text` into a query tree.
    pub fn build(&self, query_text: &str) -> Result<ParsedQuery> {
        let trimmed = query_text.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return Ok(ParsedQuery::MatchAll);
        }

        let mut clauses = Vec::new();
        for raw in split_clauses(trimmed)? {
            let (field, value) = match raw.split_once(':') {
                Some((field, value)) if !field.is_empty() => (field.to_string(), value),
                _ => (self.default_field.clone(), raw.as_str()),
            };

            let value = value.trim_matches('"');
            if value.is_empty() {
                continue;
            }

            let (value, prefix) = match value.strip_suffix('*') {
                Some(stripped) if !stripped.is_empty() => (stripped, true),
                _ => (value, false),
            };

            let mut terms: Vec<String> = self
                .analyzer
                .analyze_field(&field, value)?
                .map(|token| token.text)
                .collect();

            if prefix {
                // Only the final token keeps prefix semantics.
                let Some(last) = terms.pop() else { continue };
                let mut sub: Vec<ParsedQuery> = terms
                    .into_iter()
                    .map(|term| ParsedQuery::Term {
                        field: field.clone(),
                        term,
                    })
                    .collect();
                sub.push(ParsedQuery::Prefix {
                    field: field.clone(),
                    prefix: last,
                });
                clauses.extend(collapse(sub));
            } else {
                let sub: Vec<ParsedQuery> = terms
                    .into_iter()
                    .map(|term| ParsedQuery::Term {
                        field: field.clone(),
                        term,
                    })
                    .collect();
                clauses.extend(collapse(sub));
            }
        }

        Ok(match clauses.len() {
            0 => ParsedQuery::MatchAll,
            1 => clauses.pop().expect("one clause"),
            _ => ParsedQuery::And(clauses),
        })
    }
}

/// Collapse a clause list into at most one query.
fn collapse(mut clauses: Vec<ParsedQuery>) -> Option<ParsedQuery> {
    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(ParsedQuery::And(clauses)),
    }
}

/// Split query text into clause strings, keeping quoted values intact.
pub(crate) fn split_clauses(text: &str) -> Result<Vec<String>> {
    let mut clauses = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in text.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    clauses.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if in_quotes {
        return Err(ShrikeError::query("unbalanced quotes in query text"));
    }
    if !current.is_empty() {
        clauses.push(current);
    }
    Ok(clauses)
}
