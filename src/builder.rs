use std::ops::Range;

use crate::binding::BindingIdentifier;
use crate::query::DeclaredQuery;

/// Rewrites a declared query template into its canonical form.
///
/// Every recognized marker is replaced by the placeholder of the binding it resolves to;
/// `%` wildcards folded into a marker and dynamic expression syntax disappear from the
/// text. This is a shorthand for [`DeclaredQuery::parse`] when only the text is needed.
///
/// # Examples
///
/// ```
/// use declared_query::builder::build_query;
///
/// let sql = build_query("select u from User u where u.firstname like %:name% or u.id = ?#{#id}")?;
/// assert_eq!(sql, "select u from User u where u.firstname like :name or u.id = ?1");
/// # Ok::<(), declared_query::Error>(())
/// ```
pub fn build_query(template: &str) -> crate::Result<String> {
    let parsed = DeclaredQuery::jpql(template).parse()?;
    Ok(parsed.query_text().to_owned())
}

/// Replaces each span with the placeholder of its identifier, copying all other text
/// byte for byte. Spans must be sorted and must not overlap.
pub(crate) fn rewrite<'a, I>(text: &str, replacements: I) -> String
where
    I: IntoIterator<Item = (Range<usize>, &'a BindingIdentifier)>,
{
    let mut rewritten = String::with_capacity(text.len());
    let mut copied = 0;

    for (span, identifier) in replacements {
        rewritten.push_str(&text[copied..span.start]);
        rewritten.push_str(&identifier.to_string());
        copied = span.end;
    }
    rewritten.push_str(&text[copied..]);

    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_query_single_param() {
        let result = build_query("SELECT * FROM users WHERE id = :id").unwrap();
        assert_eq!(result, "SELECT * FROM users WHERE id = :id");
    }

    #[test]
    fn test_build_query_strips_wildcards() {
        let result =
            build_query("select u from User u where u.firstname like %?1% or u.lastname like %?2")
                .unwrap();
        assert_eq!(
            result,
            "select u from User u where u.firstname like ?1 or u.lastname like ?2"
        );
    }

    #[test]
    fn test_build_query_repeated_params() {
        let result = build_query("SELECT * FROM users WHERE id = :id OR user_id = :id").unwrap();
        assert_eq!(result, "SELECT * FROM users WHERE id = :id OR user_id = :id");
    }

    #[test]
    fn test_build_query_no_params() {
        let result = build_query("SELECT * FROM users").unwrap();
        assert_eq!(result, "SELECT * FROM users");
    }

    #[test]
    fn test_build_query_anonymous_params() {
        let result = build_query("SELECT * FROM users WHERE id = ? AND name = ?").unwrap();
        assert_eq!(result, "SELECT * FROM users WHERE id = ?1 AND name = ?2");
    }

    #[test]
    fn test_build_query_expressions() {
        let result =
            build_query("select a from A a where a.b in :#{#bs} and a.c in :#{#cs}").unwrap();
        assert_eq!(
            result,
            "select a from A a where a.b in :__synthetic__1 and a.c in :__synthetic__2"
        );
    }

    #[test]
    fn test_rewrite_keeps_untouched_text() {
        let first = BindingIdentifier::positional(1);
        let second = BindingIdentifier::named("b");
        let rewritten = rewrite("x = %?7% and y = 'é' and z = :a", [(4..8, &first), (30..32, &second)]);
        assert_eq!(rewritten, "x = ?1 and y = 'é' and z = :b");
    }
}
