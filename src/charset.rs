//! Character classes for named parameters.
//!
//! A named parameter (`:name`) continues as long as its characters are accepted by
//! [`is_identifier_char`]. The rule is a fixed table rather than a Unicode identifier
//! grammar: `.`, `_` and `$` are always accepted; ASCII punctuation, control characters,
//! separators and format characters are rejected; everything else (accented Latin, CJK,
//! emoji and their variation selectors, digits) is accepted.

/// Unicode separators (`Zs`, `Zl`, `Zp`).
const SEPARATORS: &[(char, char)] = &[
    ('\u{0020}', '\u{0020}'),
    ('\u{00A0}', '\u{00A0}'),
    ('\u{1680}', '\u{1680}'),
    ('\u{2000}', '\u{200A}'),
    ('\u{2028}', '\u{2029}'),
    ('\u{202F}', '\u{202F}'),
    ('\u{205F}', '\u{205F}'),
    ('\u{3000}', '\u{3000}'),
];

/// Unicode format characters (`Cf`).
const FORMAT: &[(char, char)] = &[
    ('\u{00AD}', '\u{00AD}'),
    ('\u{0600}', '\u{0605}'),
    ('\u{061C}', '\u{061C}'),
    ('\u{06DD}', '\u{06DD}'),
    ('\u{070F}', '\u{070F}'),
    ('\u{0890}', '\u{0891}'),
    ('\u{08E2}', '\u{08E2}'),
    ('\u{180E}', '\u{180E}'),
    ('\u{200B}', '\u{200F}'),
    ('\u{202A}', '\u{202E}'),
    ('\u{2060}', '\u{2064}'),
    ('\u{2066}', '\u{206F}'),
    ('\u{FEFF}', '\u{FEFF}'),
    ('\u{FFF9}', '\u{FFFB}'),
    ('\u{110BD}', '\u{110BD}'),
    ('\u{110CD}', '\u{110CD}'),
    ('\u{13430}', '\u{1343F}'),
    ('\u{1BCA0}', '\u{1BCA3}'),
    ('\u{1D173}', '\u{1D17A}'),
    ('\u{E0001}', '\u{E0001}'),
    ('\u{E0020}', '\u{E007F}'),
];

fn in_table(table: &[(char, char)], c: char) -> bool {
    table.iter().any(|&(lo, hi)| lo <= c && c <= hi)
}

/// Returns whether `c` may be part of a named parameter.
pub(crate) fn is_identifier_char(c: char) -> bool {
    match c {
        '.' | '_' | '$' => true,
        c if c.is_ascii_punctuation() || c.is_control() => false,
        c => !in_table(SEPARATORS, c) && !in_table(FORMAT, c),
    }
}

/// Returns whether `c` counts as a word character for marker boundaries (`\w` in ASCII).
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_letters_digits_and_symbols() {
        for c in ['a', 'Z', '0', '9', '_', '$', '.'] {
            assert!(is_identifier_char(c), "{c:?} should be accepted");
        }
    }

    #[test]
    fn test_accepts_non_basic_latin() {
        for c in ['é', 'ø', '생', '\u{4E01}', '\u{FE0F}', '😀'] {
            assert!(is_identifier_char(c), "{c:?} should be accepted");
        }
    }

    #[test]
    fn test_rejects_punctuation_and_whitespace() {
        for c in [':', '*', '%', '(', ')', ',', '\'', '"', '#', '{', ' ', '\t', '\n'] {
            assert!(!is_identifier_char(c), "{c:?} should be rejected");
        }
    }

    #[test]
    fn test_rejects_non_printable_and_unicode_spaces() {
        for c in ['\u{0003}', '\u{2004}', '\u{00A0}', '\u{3000}', '\u{200B}', '\u{FEFF}'] {
            assert!(!is_identifier_char(c), "{c:?} should be rejected");
        }
    }
}
