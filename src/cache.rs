use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::count::CountProjection;
use crate::query::{BindableQuery, DeclaredQuery};

/// A shared cache of parsed queries.
///
/// Parsing is deterministic, so the result for a declared query (text plus native flag)
/// can be shared by every caller; count queries are cached per projection. No shard lock
/// is held while parsing. Two threads missing on the same text at once both parse it and
/// the first insert wins. Failed parses are returned to the caller and never cached.
///
/// # Examples
///
/// ```rust
/// use declared_query::{DeclaredQuery, QueryCache};
///
/// let cache = QueryCache::new();
/// let query = DeclaredQuery::jpql("select u from User u where u.id = :id");
///
/// let first = cache.get_or_parse(&query)?;
/// let second = cache.get_or_parse(&query)?;
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// # Ok::<(), declared_query::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    parsed: Arc<DashMap<DeclaredQuery, Arc<BindableQuery>>>,
    counts: Arc<DashMap<(DeclaredQuery, CountProjection), Arc<BindableQuery>>>,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the parsed form of `query`, parsing it on first use.
    ///
    /// # Errors
    ///
    /// Returns any error of [`DeclaredQuery::parse`].
    pub fn get_or_parse(&self, query: &DeclaredQuery) -> crate::Result<Arc<BindableQuery>> {
        if let Some(hit) = self.parsed.get(query) {
            debug!(native = query.is_native(), "query cache hit");
            return Ok(Arc::clone(hit.value()));
        }

        debug!(native = query.is_native(), "query cache miss");
        let parsed = Arc::new(query.parse()?);
        let entry = self.parsed.entry(query.clone()).or_insert(parsed);
        Ok(Arc::clone(entry.value()))
    }

    /// Returns the count form of `query` for `projection`, deriving it on first use.
    ///
    /// # Errors
    ///
    /// Returns any error of [`DeclaredQuery::parse`] or
    /// [`BindableQuery::derive_count_query`].
    pub fn get_or_derive_count(
        &self,
        query: &DeclaredQuery,
        projection: &CountProjection,
    ) -> crate::Result<Arc<BindableQuery>> {
        let key = (query.clone(), projection.clone());
        if let Some(hit) = self.counts.get(&key) {
            debug!(native = query.is_native(), "count query cache hit");
            return Ok(Arc::clone(hit.value()));
        }

        debug!(native = query.is_native(), "count query cache miss");
        let count = Arc::new(self.get_or_parse(query)?.derive_count_query(projection)?);
        let entry = self.counts.entry(key).or_insert(count);
        Ok(Arc::clone(entry.value()))
    }

    /// Number of cached parsed queries, not counting derived count queries.
    pub fn len(&self) -> usize {
        self.parsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsed.is_empty() && self.counts.is_empty()
    }

    pub fn clear(&self) {
        self.parsed.clear();
        self.counts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parses_once() {
        let cache = QueryCache::new();
        let query = DeclaredQuery::jpql("select u from User u where u.id = ?1");

        let first = cache.get_or_parse(&query).unwrap();
        let second = cache.get_or_parse(&query).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_native_flag_is_part_of_the_key() {
        let cache = QueryCache::new();
        let text = "select * from users u";
        let jpql = cache.get_or_parse(&DeclaredQuery::jpql(text)).unwrap();
        let native = cache.get_or_parse(&DeclaredQuery::native(text)).unwrap();

        assert!(!jpql.is_native());
        assert!(native.is_native());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = QueryCache::new();
        let query = DeclaredQuery::jpql("select u from User u where u.a = ? and u.b = ?1");

        assert!(matches!(
            cache.get_or_parse(&query),
            Err(Error::MixedPositionalStyles { .. })
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_count_queries_are_cached_per_projection() {
        let cache = QueryCache::new();
        let query = DeclaredQuery::jpql("select p from Person p where p.age > :age");

        let derived = cache
            .get_or_derive_count(&query, &CountProjection::Derived)
            .unwrap();
        let explicit = cache
            .get_or_derive_count(&query, &CountProjection::Explicit("p.lastname".into()))
            .unwrap();
        let again = cache
            .get_or_derive_count(&query, &CountProjection::Derived)
            .unwrap();

        assert_eq!(derived.query_text(), "select count(p) from Person p where p.age > :age");
        assert_eq!(
            explicit.query_text(),
            "select count(p.lastname) from Person p where p.age > :age"
        );
        assert!(Arc::ptr_eq(&derived, &again));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = QueryCache::new();
        let query = DeclaredQuery::jpql("select u from User u where u.name like %:name%");

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let cache = cache.clone();
                let query = query.clone();
                scope.spawn(move || {
                    let parsed = cache.get_or_parse(&query).unwrap();
                    assert_eq!(parsed.bindings().len(), 1);
                });
            }
        });

        assert_eq!(cache.len(), 1);
    }
}
