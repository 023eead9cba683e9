//! The parsed query tree.

/// A query as executed against a snapshot.
///
/// Query strings are turned into this sum type by the
/// [`QueryBuilder`](crate::query::QueryBuilder); triggers may rewrite the
/// tree before execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedQuery {
    /// Matches every live document.
    MatchAll,

    /// Matches documents containing `term` in `field`.
    Term {
        /// The field searched.
        field: String,
        /// The exact term, post-analysis.
        term: String,
    },

    /// Matches documents containing any term with `prefix` in `field`.
    Prefix {
        /// The field searched.
        field: String,
        /// The term prefix, post-analysis.
        prefix: String,
    },

    /// Matches documents satisfying every clause.
    And(Vec<ParsedQuery>),

    /// Matches documents satisfying at least one clause.
    Or(Vec<ParsedQuery>),
}

impl ParsedQuery {
    /// Whether this query matches everything.
    pub fn is_match_all(&self) -> bool {
        match self {
            ParsedQuery::MatchAll => true,
            ParsedQuery::And(clauses) | ParsedQuery::Or(clauses) => {
                !clauses.is_empty() && clauses.iter().all(|c| c.is_match_all())
            }
            _ => false,
        }
    }

    /// Collect every field name the query references.
    pub fn referenced_fields(&self, out: &mut Vec<String>) {
        match self {
            ParsedQuery::MatchAll => {}
            ParsedQuery::Term { field, .. } | ParsedQuery::Prefix { field, .. } => {
                out.push(field.clone());
            }
            ParsedQuery::And(clauses) | ParsedQuery::Or(clauses) => {
                for clause in clauses {
                    clause.referenced_fields(out);
                }
            }
        }
    }
}
