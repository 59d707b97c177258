//! Identifier spelling. Names that are ordinary in the source language but
//! reserved in Kotlin are wrapped in backticks.

use std::borrow::Cow;

/// Kotlin hard keywords, sorted. Soft and modifier keywords are valid
/// identifiers and need no quoting.
const HARD_KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in", "interface", "is",
    "null", "object", "package", "return", "super", "this", "throw", "true", "try", "typealias", "typeof",
    "val", "var", "when", "while",
];

pub fn is_hard_keyword(name: &str) -> bool {
    HARD_KEYWORDS.binary_search(&name).is_ok()
}

pub fn escape_identifier(name: &str) -> Cow<'_, str> {
    if is_hard_keyword(name) {
        Cow::Owned(format!("`{}`", name))
    } else {
        Cow::Borrowed(name)
    }
}

/// Escapes every segment of a dotted package or type path.
pub fn escape_path(path: &str) -> String {
    path.split('.')
        .map(escape_identifier)
        .collect::<Vec<_>>()
        .join(".")
}
