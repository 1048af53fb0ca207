//! Parameter binding model.
//!
//! A [`ParameterBinding`] ties one canonical placeholder of a rewritten query to the value
//! that will fill it: the [`ParameterOrigin`] names where the value comes from, the
//! [`WildcardMode`] says how a string value is decorated before binding.

use std::borrow::Cow;
use std::fmt;

/// Identifies a bind slot: a 1-based position or a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingIdentifier {
    /// `?N`
    Position(usize),
    /// `:name`
    Name(String),
}

impl BindingIdentifier {
    /// Creates a named identifier.
    pub fn named(name: impl Into<String>) -> Self {
        BindingIdentifier::Name(name.into())
    }

    /// Creates a positional identifier.
    pub fn positional(position: usize) -> Self {
        BindingIdentifier::Position(position)
    }

    /// Returns the name if this identifier is named.
    pub fn name(&self) -> Option<&str> {
        match self {
            BindingIdentifier::Name(name) => Some(name),
            BindingIdentifier::Position(_) => None,
        }
    }

    /// Returns the position if this identifier is positional.
    pub fn position(&self) -> Option<usize> {
        match self {
            BindingIdentifier::Name(_) => None,
            BindingIdentifier::Position(position) => Some(*position),
        }
    }

    /// Returns true if this identifier is named.
    pub fn has_name(&self) -> bool {
        matches!(self, BindingIdentifier::Name(_))
    }

    /// Returns true if this identifier is positional.
    pub fn has_position(&self) -> bool {
        matches!(self, BindingIdentifier::Position(_))
    }
}

/// Formats the identifier as the placeholder emitted into query text.
impl fmt::Display for BindingIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingIdentifier::Position(position) => write!(f, "?{position}"),
            BindingIdentifier::Name(name) => write!(f, ":{name}"),
        }
    }
}

/// Where the value of a binding comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterOrigin {
    /// A method argument, referenced by position or by name.
    MethodArgument(BindingIdentifier),
    /// A dynamic expression evaluated per invocation, kept as its source text
    /// (`#bs` for `?#{#bs}`, `${foo}` for `:${foo}`).
    Expression(String),
}

impl ParameterOrigin {
    /// Returns true if the value is a method argument.
    pub fn is_method_argument(&self) -> bool {
        matches!(self, ParameterOrigin::MethodArgument(_))
    }

    /// Returns true if the value is computed from an expression.
    pub fn is_expression(&self) -> bool {
        matches!(self, ParameterOrigin::Expression(_))
    }

    /// Returns the expression source text, if any.
    pub fn expression(&self) -> Option<&str> {
        match self {
            ParameterOrigin::Expression(source) => Some(source),
            ParameterOrigin::MethodArgument(_) => None,
        }
    }
}

/// How a bound string value is wrapped with `%` before it is used in a pattern match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WildcardMode {
    /// No decoration.
    #[default]
    None,
    /// `%:name%` binds `%value%`.
    Contains,
    /// `:name%` binds `value%`.
    StartsWith,
    /// `%:name` binds `%value`.
    EndsWith,
}

impl WildcardMode {
    /// Derives the mode from the `%` found right before and right after a marker.
    pub fn from_sides(leading: bool, trailing: bool) -> Self {
        match (leading, trailing) {
            (true, true) => WildcardMode::Contains,
            (true, false) => WildcardMode::EndsWith,
            (false, true) => WildcardMode::StartsWith,
            (false, false) => WildcardMode::None,
        }
    }

    /// Wraps `value` according to this mode.
    ///
    /// ```
    /// use declared_query::WildcardMode;
    ///
    /// assert_eq!(WildcardMode::Contains.apply("oli"), "%oli%");
    /// assert_eq!(WildcardMode::StartsWith.apply("oli"), "oli%");
    /// assert_eq!(WildcardMode::None.apply("oli"), "oli");
    /// ```
    pub fn apply<'v>(&self, value: &'v str) -> Cow<'v, str> {
        match self {
            WildcardMode::None => Cow::Borrowed(value),
            WildcardMode::Contains => Cow::Owned(format!("%{value}%")),
            WildcardMode::StartsWith => Cow::Owned(format!("{value}%")),
            WildcardMode::EndsWith => Cow::Owned(format!("%{value}")),
        }
    }
}

/// One bind slot of a rewritten query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterBinding {
    identifier: BindingIdentifier,
    origin: ParameterOrigin,
    wildcard: WildcardMode,
    collection: bool,
}

impl ParameterBinding {
    /// Creates a plain binding without wildcard decoration.
    pub fn new(identifier: BindingIdentifier, origin: ParameterOrigin) -> Self {
        Self {
            identifier,
            origin,
            wildcard: WildcardMode::None,
            collection: false,
        }
    }

    /// Returns this binding with the given wildcard mode.
    pub fn with_wildcard(mut self, wildcard: WildcardMode) -> Self {
        self.wildcard = wildcard;
        self
    }

    /// Returns this binding marked as the operand of an `IN` clause.
    pub fn with_collection(mut self, collection: bool) -> Self {
        self.collection = collection;
        self
    }

    /// Returns a copy of this binding under another identifier.
    pub(crate) fn reidentified(&self, identifier: BindingIdentifier) -> Self {
        Self {
            identifier,
            ..self.clone()
        }
    }

    pub fn identifier(&self) -> &BindingIdentifier {
        &self.identifier
    }

    pub fn origin(&self) -> &ParameterOrigin {
        &self.origin
    }

    pub fn wildcard(&self) -> WildcardMode {
        self.wildcard
    }

    /// Returns true if the binding is the operand of an `IN` clause.
    pub fn is_collection(&self) -> bool {
        self.collection
    }

    pub fn name(&self) -> Option<&str> {
        self.identifier.name()
    }

    pub fn position(&self) -> Option<usize> {
        self.identifier.position()
    }

    /// Returns the expression source text if the value comes from an expression.
    pub fn expression(&self) -> Option<&str> {
        self.origin.expression()
    }

    /// Returns whether both bindings occupy the same bind slot.
    pub fn binds_to(&self, other: &ParameterBinding) -> bool {
        self.identifier == other.identifier
    }

    /// Returns whether `other` can share this binding's slot: same origin, same wildcard
    /// mode, same collection usage.
    pub fn is_compatible_with(&self, other: &ParameterBinding) -> bool {
        self.origin == other.origin
            && self.wildcard == other.wildcard
            && self.collection == other.collection
    }

    /// Prepares a string value for binding by applying the wildcard mode.
    pub fn prepare<'v>(&self, value: &'v str) -> Cow<'v, str> {
        self.wildcard.apply(value)
    }
}

impl fmt::Display for ParameterBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- ", self.identifier)?;
        match &self.origin {
            ParameterOrigin::MethodArgument(argument) => write!(f, "argument {argument}")?,
            ParameterOrigin::Expression(source) => write!(f, "expression {source}")?,
        }
        if self.wildcard != WildcardMode::None {
            write!(f, " ({:?})", self.wildcard)?;
        }
        if self.collection {
            f.write_str(" [in]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_placeholder_text() {
        assert_eq!(BindingIdentifier::positional(3).to_string(), "?3");
        assert_eq!(BindingIdentifier::named("firstname").to_string(), ":firstname");
    }

    #[test]
    fn test_identifier_equality_requires_same_kind() {
        assert_ne!(
            BindingIdentifier::named("1"),
            BindingIdentifier::positional(1)
        );
        assert_eq!(BindingIdentifier::named("a"), BindingIdentifier::named("a"));
    }

    #[test]
    fn test_wildcard_from_sides() {
        assert_eq!(WildcardMode::from_sides(true, true), WildcardMode::Contains);
        assert_eq!(WildcardMode::from_sides(true, false), WildcardMode::EndsWith);
        assert_eq!(WildcardMode::from_sides(false, true), WildcardMode::StartsWith);
        assert_eq!(WildcardMode::from_sides(false, false), WildcardMode::None);
    }

    #[test]
    fn test_prepare_wraps_value() {
        let origin = ParameterOrigin::MethodArgument(BindingIdentifier::named("name"));
        let binding = ParameterBinding::new(BindingIdentifier::named("name"), origin)
            .with_wildcard(WildcardMode::EndsWith);
        assert_eq!(binding.prepare("son"), "%son");
    }

    #[test]
    fn test_compatibility_ignores_identifier() {
        let origin = ParameterOrigin::MethodArgument(BindingIdentifier::named("logins"));
        let plain = ParameterBinding::new(BindingIdentifier::named("logins"), origin.clone());
        let renamed = plain.reidentified(BindingIdentifier::named("logins_1"));
        let in_clause = renamed.clone().with_collection(true);

        assert!(plain.is_compatible_with(&renamed));
        assert!(!plain.binds_to(&renamed));
        assert!(!plain.is_compatible_with(&in_clause));
    }

    #[test]
    fn test_display() {
        let binding = ParameterBinding::new(
            BindingIdentifier::positional(1),
            ParameterOrigin::Expression("#bs".into()),
        )
        .with_collection(true);
        assert_eq!(binding.to_string(), "?1 <- expression #bs [in]");
    }
}
