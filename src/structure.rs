//! Top-level structure of a `SELECT` query.
//!
//! The analysis runs on a flattened copy of the text in which literal contents and
//! everything nested inside parentheses are blanked out, so keywords of subqueries,
//! function arguments and string literals never count as clause boundaries. Both copies
//! share byte offsets, so every range found in the flat copy slices the real text.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::scanner::mask_literals;

static SELECT_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*select\s+(?:(distinct)\s+)?").expect("valid regex")
});

static FROM_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)(from)\b").expect("valid regex"));

static ENTITY_AND_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s+[._$[^\p{Z}\p{Cc}\p{Cf}[:punct:]]]+(?:\s+as)?(?:\s+(\w+))?")
        .expect("valid regex")
});

static ORDER_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+order\s+by\b").expect("valid regex"));

static CONSTRUCTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\s)new\s+[._$[^\p{Z}\p{Cc}\p{Cf}[:punct:]]]+\s*\(").expect("valid regex")
});

/// Words that can follow the entity name but are never an alias.
const RESERVED: &[&str] = &[
    "where", "group", "order", "having", "join", "left", "right", "inner", "outer", "cross",
    "full", "natural", "on", "union", "except", "intersect", "limit", "offset", "fetch",
    "window", "for",
];

/// The select list of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectClause {
    /// The `distinct` keyword as written, if present.
    pub(crate) distinct: Option<Range<usize>>,
    /// Everything between `select [distinct]` and `from`, untrimmed.
    pub(crate) items: Range<usize>,
    /// More than one item at the top level.
    pub(crate) multi_item: bool,
    /// The items contain `new Type(...)`.
    pub(crate) constructor: bool,
}

/// Clause boundaries of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct QueryStructure {
    pub(crate) select: Option<SelectClause>,
    /// Offset of the top-level `from` keyword.
    pub(crate) from: Option<usize>,
    pub(crate) alias: Option<String>,
    /// Offset of the whitespace preceding a top-level `order by`.
    pub(crate) order_by: Option<usize>,
}

impl QueryStructure {
    pub(crate) fn analyze(text: &str) -> Self {
        let flat = flatten(text);

        let Some(from) = FROM_KEYWORD
            .captures(&flat)
            .and_then(|caps| caps.get(1))
            .map(|m| m.start())
        else {
            return Self::default();
        };

        let select = SELECT_CLAUSE
            .captures(&flat[..from])
            .and_then(|caps| {
                let head = caps.get(0)?;
                let items = head.end()..from;
                let flat_items = &flat[items.clone()];
                Some(SelectClause {
                    distinct: caps.get(1).map(|m| m.range()),
                    multi_item: flat_items.contains(','),
                    constructor: CONSTRUCTOR.is_match(&text[items.clone()]),
                    items,
                })
            });

        let after_from = from + "from".len();
        let alias = ENTITY_AND_ALIAS
            .captures(&flat[after_from..])
            .and_then(|caps| caps.get(1))
            .map(|m| &text[after_from + m.start()..after_from + m.end()])
            .filter(|candidate| {
                !RESERVED
                    .iter()
                    .any(|reserved| candidate.eq_ignore_ascii_case(reserved))
            })
            .map(str::to_owned);

        let order_by = ORDER_BY
            .find_at(&flat, after_from)
            .map(|m| m.start());

        Self {
            select,
            from: Some(from),
            alias,
            order_by,
        }
    }

    /// The select list, trimmed, or `""` when the query has none.
    pub(crate) fn projection<'t>(&self, text: &'t str) -> &'t str {
        self.select
            .as_ref()
            .map_or("", |select| text[select.items.clone()].trim())
    }
}

/// Blanks literal contents and everything inside parentheses, keeping byte offsets.
fn flatten(text: &str) -> String {
    let masked = mask_literals(text);
    let mut flat = String::with_capacity(masked.len());
    let mut depth = 0usize;

    for c in masked.chars() {
        match c {
            '(' => {
                flat.push(c);
                depth += 1;
            }
            ')' => {
                depth = depth.saturating_sub(1);
                flat.push(c);
            }
            c if depth > 0 => flat.extend(std::iter::repeat(' ').take(c.len_utf8())),
            c => flat.push(c),
        }
    }

    flat
}
