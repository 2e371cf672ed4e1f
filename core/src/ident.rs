//! Rust identifier validation and escaping.
//!
//! Column names come from the database and can be anything: keywords,
//! expressions like `count(*)`, or names with spaces. [`escape_identifier`]
//! always produces something that is legal as a Rust field name.

/// Strict, reserved, and edition-dependent keywords.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers.
const NON_RAW: &[&str] = &["self", "Self", "super", "crate"];

/// Returns `true` if `name` is a Rust keyword.
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Returns `true` if `name` is a plain (non-raw, non-keyword) identifier.
///
/// Only ASCII identifiers are accepted.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let valid_shape = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => true,
        Some('_') => name.len() > 1,
        _ => false,
    };
    valid_shape && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') && !is_keyword(name)
}

/// Turns an arbitrary column or parameter name into a usable identifier.
///
/// Keywords become raw identifiers (`type` → `r#type`); the four keywords
/// that cannot be raw, and a lone `_`, get a trailing underscore.
///
/// ```
/// use sqlgen_core::escape_identifier;
///
/// assert_eq!(escape_identifier("symbol"), "symbol");
/// assert_eq!(escape_identifier("type"), "r#type");
/// assert_eq!(escape_identifier("self"), "self_");
/// assert_eq!(escape_identifier("count(*)"), "count___");
/// assert_eq!(escape_identifier("1st"), "_1st");
/// ```
pub fn escape_identifier(name: &str) -> String {
    if NON_RAW.contains(&name) || name == "_" {
        return format!("{name}_");
    }
    if is_keyword(name) {
        return format!("r#{name}");
    }

    let mut out: String = name
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '_' { ch } else { '_' })
        .collect();
    if out.is_empty() {
        return out;
    }
    if out.starts_with(|ch: char| ch.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if out.chars().all(|ch| ch == '_') {
        out.push_str("col");
    }
    out
}

/// Returns `true` if `name` follows snake case closely enough to avoid the
/// `non_snake_case` lint.
pub fn is_snake_case(name: &str) -> bool {
    let bare = name.strip_prefix("r#").unwrap_or(name);
    !bare.chars().any(|ch| ch.is_ascii_uppercase())
}
