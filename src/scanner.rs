//! Single-pass scanner over declared query text.
//!
//! The scanner does not understand the host query language. It only tracks whether the
//! current position sits inside a `'...'` or `"..."` literal and classifies the parameter
//! markers it meets outside of literals. Doubled quotes (`''`) need no special handling:
//! the literal closes and immediately reopens. An unterminated literal swallows the rest
//! of the text.

use std::ops::Range;

use crate::charset::{is_identifier_char, is_word_char};
use crate::error::Error;

/// Tracks the quoting state of a left-to-right walk.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Quoting {
    open: Option<char>,
}

impl Quoting {
    /// Feeds the next character and returns whether it belongs to a literal,
    /// quote characters included.
    pub(crate) fn feed(&mut self, c: char) -> bool {
        match self.open {
            Some(quote) => {
                if c == quote {
                    self.open = None;
                }
                true
            }
            None if c == '\'' || c == '"' => {
                self.open = Some(c);
                true
            }
            None => false,
        }
    }
}

/// The kind of a recognized parameter marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MarkerKind {
    /// `?N`
    Indexed(usize),
    /// `?`
    Anonymous,
    /// `:name`
    Named(String),
    /// `?#{expr}` (`indexed`), `:#{expr}` or `:${expr}`
    Expression { source: String, indexed: bool },
}

/// A marker occurrence and its byte span in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Marker {
    pub(crate) kind: MarkerKind,
    pub(crate) span: Range<usize>,
}

/// Scans `query` and returns every marker found outside of literals, in text order.
pub(crate) fn scan(query: &str) -> crate::Result<Vec<Marker>> {
    let chars: Vec<(usize, char)> = query.char_indices().collect();
    let mut markers = Vec::new();
    let mut quoting = Quoting::default();
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if quoting.feed(c) {
            i += 1;
            continue;
        }

        let escaped = i > 0 && chars[i - 1].1 == '\\';
        let classified = match c {
            '?' if !escaped => classify_question_mark(query, &chars, i)?,
            ':' if !escaped => classify_colon(query, &chars, i)?,
            _ => None,
        };

        match classified {
            Some((kind, next)) => {
                let end = chars.get(next).map_or(query.len(), |&(at, _)| at);
                markers.push(Marker {
                    kind,
                    span: pos..end,
                });
                i = next;
            }
            None => i += 1,
        }
    }

    Ok(markers)
}

fn char_at(chars: &[(usize, char)], i: usize) -> Option<char> {
    chars.get(i).map(|&(_, c)| c)
}

/// Classifies a `?` at `i`. Returns the marker kind and the index just past it.
fn classify_question_mark(
    query: &str,
    chars: &[(usize, char)],
    i: usize,
) -> crate::Result<Option<(MarkerKind, usize)>> {
    if char_at(chars, i + 1) == Some('#') && char_at(chars, i + 2) == Some('{') {
        let (body, next) = expression_body(query, chars, i)?;
        return Ok(Some((
            MarkerKind::Expression {
                source: body,
                indexed: true,
            },
            next,
        )));
    }

    let mut j = i + 1;
    while char_at(chars, j).is_some_and(|c| c.is_ascii_digit()) {
        j += 1;
    }

    // `?abc`, `?1a` and `?#x` are not markers
    if char_at(chars, j).is_some_and(|c| c == '#' || is_word_char(c)) {
        return Ok(None);
    }

    if j == i + 1 {
        return Ok(Some((MarkerKind::Anonymous, j)));
    }

    let digits_end = chars.get(j).map_or(query.len(), |&(at, _)| at);
    let digits = &query[chars[i + 1].0..digits_end];
    match digits.parse::<usize>() {
        Ok(index) if index > 0 => Ok(Some((MarkerKind::Indexed(index), j))),
        _ => Err(Error::InvalidParameterIndex {
            index: digits.to_owned(),
            query: query.to_owned(),
        }),
    }
}

/// Classifies a `:` at `i`. Returns the marker kind and the index just past it.
fn classify_colon(
    query: &str,
    chars: &[(usize, char)],
    i: usize,
) -> crate::Result<Option<(MarkerKind, usize)>> {
    // `::` is a cast, never a marker
    if i > 0 && chars[i - 1].1 == ':' {
        return Ok(None);
    }

    match (char_at(chars, i + 1), char_at(chars, i + 2)) {
        (Some('#'), Some('{')) => {
            let (body, next) = expression_body(query, chars, i)?;
            return Ok(Some((
                MarkerKind::Expression {
                    source: body,
                    indexed: false,
                },
                next,
            )));
        }
        (Some('$'), Some('{')) => {
            let (body, next) = expression_body(query, chars, i)?;
            return Ok(Some((
                MarkerKind::Expression {
                    source: format!("${{{body}}}"),
                    indexed: false,
                },
                next,
            )));
        }
        _ => {}
    }

    let mut j = i + 1;
    while char_at(chars, j).is_some_and(is_identifier_char) {
        j += 1;
    }
    if j == i + 1 {
        return Ok(None);
    }

    let name_end = chars.get(j).map_or(query.len(), |&(at, _)| at);
    let name = query[chars[i + 1].0..name_end].to_owned();
    Ok(Some((MarkerKind::Named(name), j)))
}

/// Reads the body of an expression marker whose prefix (`?#{`, `:#{`, `:${`) starts at `i`.
/// Braces nest and literals inside the body are skipped.
fn expression_body(
    query: &str,
    chars: &[(usize, char)],
    i: usize,
) -> crate::Result<(String, usize)> {
    let invalid = || Error::InvalidExpression {
        position: chars[i].0,
        query: query.to_owned(),
    };

    let open = i + 3;
    let mut depth = 1usize;
    let mut quoting = Quoting::default();
    let mut j = open;

    while let Some(c) = char_at(chars, j) {
        if !quoting.feed(c) {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let start = chars.get(open).map_or(query.len(), |&(at, _)| at);
                        let body = &query[start..chars[j].0];
                        if body.trim().is_empty() {
                            return Err(invalid());
                        }
                        return Ok((body.to_owned(), j + 1));
                    }
                }
                _ => {}
            }
        }
        j += 1;
    }

    Err(invalid())
}

/// Returns whether the text before `start` ends with the `IN` keyword, optionally
/// followed by whitespace and an opening parenthesis.
pub(crate) fn follows_in_keyword(query: &str, start: usize) -> bool {
    let before = query[..start].trim_end();
    let before = before.strip_suffix('(').unwrap_or(before).trim_end();

    let Some(split) = before.len().checked_sub(2) else {
        return false;
    };
    match (before.get(..split), before.get(split..)) {
        (Some(head), Some(keyword)) if keyword.eq_ignore_ascii_case("in") => head
            .chars()
            .next_back()
            .map_or(true, |c| !is_identifier_char(c)),
        _ => false,
    }
}

/// Blanks the content of every literal with spaces, keeping byte offsets stable.
/// Quote characters themselves are kept.
pub(crate) fn mask_literals(query: &str) -> String {
    let mut masked = String::with_capacity(query.len());
    let mut quoting = Quoting::default();

    for c in query.chars() {
        let was_open = quoting.open.is_some();
        let quoted = quoting.feed(c);
        let is_delimiter = quoted && (!was_open || quoting.open.is_none());
        if quoted && !is_delimiter {
            masked.extend(std::iter::repeat(' ').take(c.len_utf8()));
        } else {
            masked.push(c);
        }
    }

    masked
}
