//! Wildcard detection around parameter markers.
//!
//! A `%` immediately before and/or after a marker is folded into the marker's span, so the
//! rewriter drops it from the emitted text, and recorded as a [`WildcardMode`] instead.
//! Detection is purely textual: the clause keyword (`LIKE` or anything else) is not
//! consulted.

use std::ops::Range;

use crate::binding::WildcardMode;
use crate::scanner::{follows_in_keyword, Marker, MarkerKind};

/// A marker together with its decoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Occurrence {
    pub(crate) kind: MarkerKind,
    /// Byte span to replace, including any folded `%`.
    pub(crate) span: Range<usize>,
    pub(crate) wildcard: WildcardMode,
    pub(crate) collection: bool,
}

/// Folds adjacent `%` into each marker and detects `IN` operands.
pub(crate) fn decorate(query: &str, markers: Vec<Marker>) -> Vec<Occurrence> {
    let bytes = query.as_bytes();
    // a `%` already folded into the previous marker cannot lead the next one
    let mut floor = 0;

    markers
        .into_iter()
        .map(|marker| {
            let Range { start, end } = marker.span;
            let leading = start > floor && bytes[start - 1] == b'%';
            let trailing = bytes.get(end) == Some(&b'%');

            let start = if leading { start - 1 } else { start };
            let end = if trailing { end + 1 } else { end };
            floor = end;

            Occurrence {
                kind: marker.kind,
                span: start..end,
                wildcard: WildcardMode::from_sides(leading, trailing),
                collection: follows_in_keyword(query, start),
            }
        })
        .collect()
}
