//! Count-query derivation.
//!
//! The count form keeps everything from the top-level `FROM` up to a top-level
//! `ORDER BY` and replaces the select list with a counting projection. Placeholders in
//! the retained text are resolved against the source bindings, so every binding of the
//! result traces back to an origin of the source query.

use std::collections::HashMap;

use tracing::debug;

use crate::binding::{BindingIdentifier, ParameterBinding};
use crate::builder::rewrite;
use crate::error::Error;
use crate::query::BindableQuery;
use crate::scanner::{scan, MarkerKind};
use crate::structure::QueryStructure;

/// How the counted expression of a derived count query is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CountProjection {
    /// Derive it from the select list and the primary alias.
    #[default]
    Derived,
    /// Count this expression, e.g. `p.lastname` for `select count(p.lastname) ...`.
    Explicit(String),
}

pub(crate) fn derive_count_query(
    source: &BindableQuery,
    projection: &CountProjection,
) -> crate::Result<BindableQuery> {
    let text = source.query_text();
    let structure = source.structure();

    let from = structure
        .from
        .ok_or_else(|| Error::bad_grammar("no top-level FROM clause", text))?;
    if structure.select.is_none() && !text[..from].trim().is_empty() {
        return Err(Error::bad_grammar("not a SELECT query", text));
    }

    let counted = match projection {
        CountProjection::Explicit(expression) => expression.clone(),
        CountProjection::Derived => counted_expression(text, structure, source.is_native())?,
    };

    let end = structure.order_by.unwrap_or(text.len());
    let count_text = format!("select count({counted}) {}", &text[from..end]);

    let (count_text, bindings) = rebind(&count_text, source)?;

    debug!(
        bindings = bindings.len(),
        source_bindings = source.bindings().len(),
        native = source.is_native(),
        "derived count query"
    );

    Ok(BindableQuery::assemble(
        count_text,
        bindings,
        source.is_native(),
        source.uses_jdbc_style_parameters(),
    ))
}

/// Picks what goes inside `count(...)`.
fn counted_expression(
    text: &str,
    structure: &QueryStructure,
    native: bool,
) -> crate::Result<String> {
    let alias = structure.alias.as_deref();

    let Some(select) = &structure.select else {
        return match alias {
            Some(alias) => Ok(alias.to_owned()),
            None if native => Ok("*".to_owned()),
            None => Err(Error::bad_grammar("cannot determine the primary alias", text)),
        };
    };

    let items = text[select.items.clone()].trim();
    let distinct = select.distinct.clone().map(|range| &text[range]);
    let qualified = |value: &str| match distinct {
        Some(keyword) => format!("{keyword} {value}"),
        None => value.to_owned(),
    };

    let star = items == "*";
    let aggregate = items
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("count("));
    if !items.is_empty() && !star && !aggregate && !select.multi_item && !select.constructor {
        return Ok(qualified(items));
    }

    if native && (star || select.multi_item) {
        return Ok("1".to_owned());
    }

    match alias {
        Some(alias) => Ok(qualified(alias)),
        None if native => Ok("*".to_owned()),
        None => Err(Error::bad_grammar("cannot determine the primary alias", text)),
    }
}

/// Resolves every placeholder of `count_text` to a source binding and renumbers
/// positional ones by first appearance.
fn rebind(
    count_text: &str,
    source: &BindableQuery,
) -> crate::Result<(String, Vec<ParameterBinding>)> {
    let markers = scan(count_text)?;

    let mut bindings: Vec<ParameterBinding> = Vec::new();
    let mut renumbered: HashMap<BindingIdentifier, usize> = HashMap::new();
    let mut spans = Vec::with_capacity(markers.len());

    for marker in markers {
        let identifier = match marker.kind {
            MarkerKind::Indexed(position) => BindingIdentifier::Position(position),
            MarkerKind::Named(name) => BindingIdentifier::Name(name),
            MarkerKind::Anonymous => return Err(Error::UnboundPlaceholder("?".to_owned())),
            MarkerKind::Expression { source: expression, .. } => {
                return Err(Error::UnboundPlaceholder(expression))
            }
        };

        let index = match renumbered.get(&identifier) {
            Some(&index) => index,
            None => {
                let binding = source
                    .binding(&identifier)
                    .ok_or_else(|| Error::UnboundPlaceholder(identifier.to_string()))?;
                let positions = bindings
                    .iter()
                    .filter(|b| b.identifier().has_position())
                    .count();
                let target = match &identifier {
                    BindingIdentifier::Position(_) => BindingIdentifier::Position(positions + 1),
                    BindingIdentifier::Name(_) => identifier.clone(),
                };
                bindings.push(binding.reidentified(target));
                renumbered.insert(identifier, bindings.len() - 1);
                bindings.len() - 1
            }
        };
        spans.push((marker.span, index));
    }

    let text = rewrite(
        count_text,
        spans
            .into_iter()
            .map(|(span, index)| (span, bindings[index].identifier())),
    );

    Ok((text, bindings))
}
