//! Binding registry.
//!
//! Folds the decorated occurrences of one query into an append-only list of bindings.
//! Occurrences that agree on origin, wildcard mode and `IN` usage share one binding;
//! an origin that recurs with a different treatment gets a synthetic identifier
//! (`name_1`, `name_2`, ... for named arguments, a fresh position otherwise).
//!
//! Positional bindings are numbered `1..=N` in order of first appearance once the fold
//! is complete, so the emitted text never depends on the declared indices.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::binding::{BindingIdentifier, ParameterBinding, ParameterOrigin, WildcardMode};
use crate::error::Error;
use crate::scanner::MarkerKind;
use crate::wildcard::Occurrence;

/// Prefix of the names given to expression parameters in named queries.
pub const SYNTHETIC_PREFIX: &str = "__synthetic__";

/// The outcome of registering all occurrences of a query.
#[derive(Debug, Clone)]
pub(crate) struct Registry {
    pub(crate) bindings: Vec<ParameterBinding>,
    /// Index into `bindings` for every occurrence, in text order.
    pub(crate) slots: Vec<usize>,
    pub(crate) jdbc_style: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ReuseKey {
    origin: ParameterOrigin,
    wildcard: WildcardMode,
    collection: bool,
}

/// Identifier of a binding before positional numbering.
#[derive(Debug, Clone)]
enum Slot {
    Positional,
    Named(String),
}

struct Pending {
    slot: Slot,
    key: ReuseKey,
}

/// Registers every occurrence, reusing or renaming bindings as needed.
pub(crate) fn register(query: &str, occurrences: &[Occurrence]) -> crate::Result<Registry> {
    let jdbc_style = occurrences
        .iter()
        .any(|o| matches!(o.kind, MarkerKind::Anonymous));
    let other_style = occurrences
        .iter()
        .any(|o| !matches!(o.kind, MarkerKind::Anonymous));
    if jdbc_style && other_style {
        return Err(Error::MixedPositionalStyles {
            query: query.to_owned(),
        });
    }

    let positional = occurrences.iter().any(|o| {
        matches!(
            o.kind,
            MarkerKind::Indexed(_) | MarkerKind::Anonymous | MarkerKind::Expression { indexed: true, .. }
        )
    });

    // explicit names are reserved up front so a synthetic name never shadows one declared later
    let mut used_names: HashSet<String> = occurrences
        .iter()
        .filter_map(|o| match &o.kind {
            MarkerKind::Named(name) => Some(name.clone()),
            _ => None,
        })
        .collect();

    let mut pending: Vec<Pending> = Vec::new();
    let mut by_key: HashMap<ReuseKey, usize> = HashMap::new();
    let mut bound_origins: HashSet<ParameterOrigin> = HashSet::new();
    let mut slots = Vec::with_capacity(occurrences.len());
    let mut anonymous = 0usize;
    let mut synthetic = 0usize;

    for occurrence in occurrences {
        let origin = match &occurrence.kind {
            MarkerKind::Indexed(index) => {
                ParameterOrigin::MethodArgument(BindingIdentifier::Position(*index))
            }
            MarkerKind::Anonymous => {
                anonymous += 1;
                ParameterOrigin::MethodArgument(BindingIdentifier::Position(anonymous))
            }
            MarkerKind::Named(name) => {
                ParameterOrigin::MethodArgument(BindingIdentifier::Name(name.clone()))
            }
            MarkerKind::Expression { source, .. } => ParameterOrigin::Expression(source.clone()),
        };
        let key = ReuseKey {
            origin,
            wildcard: occurrence.wildcard,
            collection: occurrence.collection,
        };

        if let Some(&index) = by_key.get(&key) {
            trace!(binding = index, origin = ?key.origin, "reusing binding");
            slots.push(index);
            continue;
        }

        let slot = match &key.origin {
            _ if positional && !matches!(occurrence.kind, MarkerKind::Named(_)) => Slot::Positional,
            ParameterOrigin::MethodArgument(BindingIdentifier::Name(name)) => {
                if bound_origins.contains(&key.origin) {
                    let renamed = next_free_name(name, &used_names);
                    trace!(name = %name, renamed = %renamed, "renaming binding with differing usage");
                    used_names.insert(renamed.clone());
                    Slot::Named(renamed)
                } else {
                    Slot::Named(name.clone())
                }
            }
            _ => {
                let name = loop {
                    synthetic += 1;
                    let candidate = format!("{SYNTHETIC_PREFIX}{synthetic}");
                    if !used_names.contains(&candidate) {
                        break candidate;
                    }
                };
                used_names.insert(name.clone());
                Slot::Named(name)
            }
        };

        let index = pending.len();
        trace!(binding = index, origin = ?key.origin, wildcard = ?key.wildcard, "registering binding");
        bound_origins.insert(key.origin.clone());
        by_key.insert(key.clone(), index);
        pending.push(Pending { slot, key });
        slots.push(index);
    }

    let mut next_position = 0usize;
    let bindings = pending
        .into_iter()
        .map(|Pending { slot, key }| {
            let identifier = match slot {
                Slot::Positional => {
                    next_position += 1;
                    BindingIdentifier::Position(next_position)
                }
                Slot::Named(name) => BindingIdentifier::Name(name),
            };
            ParameterBinding::new(identifier, key.origin)
                .with_wildcard(key.wildcard)
                .with_collection(key.collection)
        })
        .collect();

    Ok(Registry {
        bindings,
        slots,
        jdbc_style,
    })
}

/// Returns `base_1`, `base_2`, ... whichever is the first not already in use.
fn next_free_name(base: &str, used: &HashSet<String>) -> String {
    (1..)
        .map(|k| format!("{base}_{k}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| base.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;
    use crate::wildcard::decorate;
    use pretty_assertions::assert_eq;

    fn registered(query: &str) -> crate::Result<Registry> {
        let occurrences = decorate(query, scan(query)?);
        register(query, &occurrences)
    }

    fn identifiers(registry: &Registry) -> Vec<String> {
        registry
            .bindings
            .iter()
            .map(|b| b.identifier().to_string())
            .collect()
    }

    #[test]
    fn test_reuses_identical_occurrences() {
        let registry = registered("where u.id = :id or u.parent = :id").unwrap();
        assert_eq!(identifiers(&registry), vec![":id"]);
        assert_eq!(registry.slots, vec![0, 0]);
    }

    #[test]
    fn test_renames_named_with_differing_wildcards() {
        let registry =
            registered("a like %:firstname or b like %:firstname% or c =:firstname").unwrap();
        assert_eq!(
            identifiers(&registry),
            vec![":firstname", ":firstname_1", ":firstname_2"]
        );
    }

    #[test]
    fn test_synthetic_name_skips_later_explicit_name() {
        let registry = registered("a like %:name% or b = :name or c = :name_1").unwrap();
        assert_eq!(identifiers(&registry), vec![":name", ":name_2", ":name_1"]);
    }

    #[test]
    fn test_positional_numbering_follows_first_appearance() {
        let registry = registered("a = ?2 and b = ?1 and c = ?2").unwrap();
        assert_eq!(identifiers(&registry), vec!["?1", "?2"]);
        assert_eq!(
            registry.bindings[0].origin(),
            &ParameterOrigin::MethodArgument(BindingIdentifier::Position(2))
        );
        assert_eq!(registry.slots, vec![0, 1, 0]);
    }

    #[test]
    fn test_anonymous_markers_are_distinct() {
        let registry = registered("a = ? and b = ? and c = ?").unwrap();
        assert_eq!(identifiers(&registry), vec!["?1", "?2", "?3"]);
        assert!(registry.jdbc_style);
    }

    #[test]
    fn test_rejects_mixed_styles() {
        for query in [
            "something = ? and something = ?1",
            "something = ?1 and something = ?",
            "something = :name and something = ?",
            "something = ?#{xx} and something = ?",
        ] {
            assert!(
                matches!(registered(query), Err(Error::MixedPositionalStyles { .. })),
                "{query}"
            );
        }
    }

    #[test]
    fn test_named_expressions_get_synthetic_names() {
        let registry = registered("a in :#{#bs} and c in :#{#cs} and d = :#{#bs}").unwrap();
        assert_eq!(
            identifiers(&registry),
            vec![":__synthetic__1", ":__synthetic__2", ":__synthetic__3"]
        );
        assert_eq!(registry.bindings[0].expression(), Some("#bs"));
        assert!(registry.bindings[0].is_collection());
        assert!(!registry.bindings[2].is_collection());
    }

    #[test]
    fn test_synthetic_expression_name_skips_explicit_name() {
        let registry = registered("a = :__synthetic__1 and b = :#{#x}").unwrap();
        assert_eq!(
            identifiers(&registry),
            vec![":__synthetic__1", ":__synthetic__2"]
        );
        assert!(registry.bindings[0].origin().is_method_argument());
        assert!(registry.bindings[1].origin().is_expression());
    }

    #[test]
    fn test_expressions_become_positional_next_to_indexed_markers() {
        let registry = registered("a = :#{#x} and b = ?1").unwrap();
        assert_eq!(identifiers(&registry), vec!["?1", "?2"]);
        assert_eq!(registry.bindings[0].expression(), Some("#x"));
    }

    #[test]
    fn test_named_markers_stay_named_in_positional_queries() {
        let registry = registered("a = ?1 and b = :name").unwrap();
        assert_eq!(identifiers(&registry), vec!["?1", ":name"]);
    }

    #[test]
    fn test_next_free_name() {
        let used: HashSet<String> = ["a".to_owned(), "a_1".to_owned()].into_iter().collect();
        assert_eq!(next_free_name("a", &used), "a_2");
    }
}
