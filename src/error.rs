/// Error types for declared-query
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The declared query text was empty or contained only whitespace
    #[error("Query must not be null or empty")]
    EmptyQuery,

    /// Anonymous `?` markers were combined with `?N`, `:name` or expression markers
    #[error("Mixing of ? parameters and other forms like ?1 is not supported; Offending query: {query}")]
    MixedPositionalStyles { query: String },

    /// A positional marker carried an index that is zero or does not fit in `usize`
    #[error("Invalid parameter index '?{index}'; Index position must be a positive integer no larger than usize::MAX; Offending query: {query}")]
    InvalidParameterIndex { index: String, query: String },

    /// A dynamic expression marker was never closed or had an empty body
    #[error("Invalid expression parameter at byte {position}; Offending query: {query}")]
    InvalidExpression { position: usize, query: String },

    /// The count query could not be derived from the source query's structure
    #[error("Bad grammar: {reason}; Offending query: {query}")]
    BadGrammar { reason: String, query: String },

    /// Placeholder in a derived query that resolves to no binding of its source query
    #[error("Placeholder '{0}' was not bound by the source query")]
    UnboundPlaceholder(String),
}

impl Error {
    /// Returns the offending query text, if this error carries one.
    pub fn query(&self) -> Option<&str> {
        match self {
            Error::MixedPositionalStyles { query }
            | Error::InvalidParameterIndex { query, .. }
            | Error::InvalidExpression { query, .. }
            | Error::BadGrammar { query, .. } => Some(query),
            Error::EmptyQuery | Error::UnboundPlaceholder(_) => None,
        }
    }

    pub(crate) fn bad_grammar(reason: impl Into<String>, query: &str) -> Self {
        Error::BadGrammar {
            reason: reason.into(),
            query: query.to_owned(),
        }
    }
}

/// Result type alias for declared-query operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_grammar_keeps_query_verbatim() {
        let err = Error::bad_grammar("no FROM clause", "select 1");
        assert_eq!(err.query(), Some("select 1"));
        assert_eq!(
            err.to_string(),
            "Bad grammar: no FROM clause; Offending query: select 1"
        );
    }

    #[test]
    fn test_invalid_index_message_covers_overflow() {
        let err = Error::InvalidParameterIndex {
            index: "99999999999999999999999".into(),
            query: "a = ?99999999999999999999999".into(),
        };
        let message = err.to_string();
        assert!(message.contains("'?99999999999999999999999'"));
        assert!(message.contains("no larger than usize::MAX"));
        assert!(!message.contains("greater zero"));
    }

    #[test]
    fn test_unbound_placeholder_has_no_query() {
        assert_eq!(Error::UnboundPlaceholder("?3".into()).query(), None);
        assert_eq!(Error::EmptyQuery.query(), None);
    }
}
