use tracing::debug;

use crate::binding::{BindingIdentifier, ParameterBinding};
use crate::builder::rewrite;
use crate::count::{derive_count_query, CountProjection};
use crate::error::Error;
use crate::registry::register;
use crate::scanner::scan;
use crate::structure::QueryStructure;
use crate::wildcard::decorate;

/// A query as declared by the developer, before any rewriting.
///
/// `DeclaredQuery` is the input side of the parser: the raw text plus whether it is a
/// native SQL query or an object query (JPQL). Native queries follow looser rules when a
/// count query is derived from them, since their grammar belongs to the backing store.
///
/// # Examples
///
/// ```rust
/// use declared_query::DeclaredQuery;
///
/// let query = DeclaredQuery::jpql("select u from User u where u.lastname like %:name%")
///     .parse()?;
///
/// assert_eq!(query.query_text(), "select u from User u where u.lastname like :name");
/// assert_eq!(query.bindings()[0].prepare("son"), "%son%");
/// # Ok::<(), declared_query::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclaredQuery {
    text: String,
    native: bool,
}

impl DeclaredQuery {
    pub fn new<T>(text: T, native: bool) -> Self
    where
        T: Into<String>,
    {
        Self {
            text: text.into(),
            native,
        }
    }

    /// Creates an object-language (JPQL) query.
    pub fn jpql<T: Into<String>>(text: T) -> Self {
        Self::new(text, false)
    }

    /// Creates a native SQL query.
    pub fn native<T: Into<String>>(text: T) -> Self {
        Self::new(text, true)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_native(&self) -> bool {
        self.native
    }

    /// Parses the declared text into its canonical form and binding list.
    ///
    /// Parsing is a pure function of the text and the native flag.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyQuery`] if the text is empty or whitespace only.
    /// - [`Error::MixedPositionalStyles`] if anonymous `?` markers are combined with any
    ///   other kind of marker.
    /// - [`Error::InvalidParameterIndex`] for `?0` or an index that does not fit.
    /// - [`Error::InvalidExpression`] for an unterminated or empty `?#{`, `:#{` or `:${`.
    pub fn parse(&self) -> crate::Result<BindableQuery> {
        if self.text.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }

        let markers = scan(&self.text)?;
        let occurrences = decorate(&self.text, markers);
        let registry = register(&self.text, &occurrences)?;

        let query_text = rewrite(
            &self.text,
            occurrences
                .iter()
                .zip(&registry.slots)
                .map(|(occurrence, &slot)| {
                    (occurrence.span.clone(), registry.bindings[slot].identifier())
                }),
        );

        debug!(
            bindings = registry.bindings.len(),
            occurrences = occurrences.len(),
            native = self.native,
            expressions = registry
                .bindings
                .iter()
                .filter(|b| b.origin().is_expression())
                .count(),
            positional = registry.bindings.iter().any(|b| b.identifier().has_position()),
            "parsed declared query"
        );

        Ok(BindableQuery::assemble(
            query_text,
            registry.bindings,
            self.native,
            registry.jdbc_style,
        ))
    }
}

/// A rewritten query: canonical text plus one [`ParameterBinding`] per distinct
/// placeholder, in order of first appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindableQuery {
    text: String,
    bindings: Vec<ParameterBinding>,
    native: bool,
    jdbc_style: bool,
    structure: QueryStructure,
}

impl BindableQuery {
    pub(crate) fn assemble(
        text: String,
        bindings: Vec<ParameterBinding>,
        native: bool,
        jdbc_style: bool,
    ) -> Self {
        let structure = QueryStructure::analyze(&text);
        Self {
            text,
            bindings,
            native,
            jdbc_style,
            structure,
        }
    }

    /// The canonical query text, with every marker replaced by `?N` or `:name`.
    pub fn query_text(&self) -> &str {
        &self.text
    }

    pub fn bindings(&self) -> &[ParameterBinding] {
        &self.bindings
    }

    /// Returns the binding that fills `identifier`, if any.
    pub fn binding(&self, identifier: &BindingIdentifier) -> Option<&ParameterBinding> {
        self.bindings.iter().find(|b| b.identifier() == identifier)
    }

    pub fn has_bindings(&self) -> bool {
        !self.bindings.is_empty()
    }

    /// Returns true if some method argument is bound by name.
    pub fn has_named_parameter(&self) -> bool {
        self.bindings
            .iter()
            .any(|b| b.origin().is_method_argument() && b.identifier().has_name())
    }

    /// Returns true if the declared text used anonymous `?` markers.
    pub fn uses_jdbc_style_parameters(&self) -> bool {
        self.jdbc_style
    }

    /// Returns true if an expression references the `#pageable` argument.
    pub fn uses_paging(&self) -> bool {
        self.bindings
            .iter()
            .filter_map(ParameterBinding::expression)
            .any(|source| source.contains("#pageable"))
    }

    pub fn is_native(&self) -> bool {
        self.native
    }

    /// The primary alias following the top-level `FROM` entity.
    pub fn alias(&self) -> Option<&str> {
        self.structure.alias.as_deref()
    }

    /// The select list, or `""` when there is no `select ... from`.
    pub fn projection(&self) -> &str {
        self.structure.projection(&self.text)
    }

    /// Returns true if the select list builds objects with `new Type(...)`.
    pub fn has_constructor_expression(&self) -> bool {
        self.structure
            .select
            .as_ref()
            .is_some_and(|select| select.constructor)
    }

    /// Returns true if the query selects its primary alias and nothing else.
    pub fn is_default_projection(&self) -> bool {
        self.alias()
            .is_some_and(|alias| self.projection().eq_ignore_ascii_case(alias))
    }

    /// Derives the row-count form of this query.
    ///
    /// The retained clauses keep their placeholders; bindings are carried over with their
    /// origins and re-numbered if positional placeholders were dropped.
    ///
    /// ```rust
    /// use declared_query::{CountProjection, DeclaredQuery};
    ///
    /// let query = DeclaredQuery::jpql("select u from User u where u.age > ?1 order by u.name")
    ///     .parse()?;
    /// let count = query.derive_count_query(&CountProjection::Derived)?;
    ///
    /// assert_eq!(count.query_text(), "select count(u) from User u where u.age > ?1");
    /// # Ok::<(), declared_query::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadGrammar`] if the clause boundaries or the alias cannot be found.
    pub fn derive_count_query(&self, projection: &CountProjection) -> crate::Result<Self> {
        derive_count_query(self, projection)
    }

    pub(crate) fn structure(&self) -> &QueryStructure {
        &self.structure
    }
}
