//! Marker-based SQL templates.
//!
//! A [`Template`] is an ordered list of literal text and named parameter
//! markers. Rendering walks the pieces once and writes each argument in
//! place of its marker, so a value that happens to contain `${...}` is
//! never re-interpreted as a marker.
//!
//! # Text form
//!
//! The `Display` form of a template (the stored query resource) writes
//! markers as `${name}`. A run of literal `$` is doubled when a `{` or a
//! marker follows it; every other `$` is written as-is. When reading, a run
//! of `$` before `{` of odd length is half its length in literal `$` and then
//! a marker, and of even length is half its length in literal `$` and then a
//! literal `{`. [`Template::parse`] reverses `Display` exactly, and text
//! without `${` reads back unchanged.
//!
//! ```
//! use sqlgen_runtime::Template;
//!
//! let template = Template::parse("select * from t where a = '${a}' limit ${n}").unwrap();
//! assert_eq!(template.param_names(), vec!["a", "n"]);
//!
//! let sql = template.render(&[("a", &"x"), ("n", &10)]);
//! assert_eq!(sql, "select * from t where a = 'x' limit 10");
//! ```

use std::fmt::{self, Display, Write};

use thiserror::Error;

/// Errors raised while reading the text form of a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkerError {
    /// A `${` was never closed by `}`.
    #[error("unterminated marker at byte {offset}")]
    Unterminated { offset: usize },

    /// The text between `${` and `}` is not an identifier.
    #[error("invalid marker name '{name}' at byte {offset}")]
    InvalidName { name: String, offset: usize },
}

/// Borrowed view of one template piece.
///
/// Generated accessors keep their query as a `&'static [Segment<'static>]`
/// and render it with [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal SQL text.
    Text(&'a str),
    /// A named parameter marker.
    Param(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Param(String),
}

/// Owned, ordered sequence of literal text and parameter markers.
///
/// Adjacent literal pieces are always merged and empty literals are never
/// stored, so two templates with the same text form compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    /// Creates an empty template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends literal SQL text.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.pieces.last_mut() {
            Some(Piece::Text(last)) => last.push_str(text),
            _ => self.pieces.push(Piece::Text(text.to_string())),
        }
    }

    /// Appends a named parameter marker.
    pub fn push_param(&mut self, name: &str) {
        self.pieces.push(Piece::Param(name.to_string()));
    }

    /// Reads the text form produced by `Display`.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError`] for an unterminated `${` or a marker whose
    /// name is not an identifier.
    pub fn parse(text: &str) -> Result<Self, MarkerError> {
        let mut template = Self::new();
        let mut literal = String::new();
        let mut pos = 0;

        while let Some(found) = text[pos..].find('$') {
            let offset = pos + found;
            literal.push_str(&text[pos..offset]);
            let after = offset + dollar_run(&text[offset..]);
            pos = after;
            if !text[after..].starts_with('{') {
                literal.push_str(&text[offset..after]);
                continue;
            }

            let run = after - offset;
            literal.push_str(&text[offset..offset + run / 2]);
            if run % 2 == 0 {
                literal.push('{');
                pos = after + 1;
                continue;
            }

            let marker = after - 1;
            let start = after + 1;
            let end = text[start..]
                .find('}')
                .map(|len| start + len)
                .ok_or(MarkerError::Unterminated { offset: marker })?;
            let name = &text[start..end];
            if !is_marker_name(name) {
                return Err(MarkerError::InvalidName {
                    name: name.to_string(),
                    offset: marker,
                });
            }
            template.push_text(&literal);
            literal.clear();
            template.push_param(name);
            pos = end + 1;
        }
        literal.push_str(&text[pos..]);
        template.push_text(&literal);

        Ok(template)
    }

    /// Iterates over the pieces in order.
    pub fn segments(&self) -> impl Iterator<Item = Segment<'_>> {
        self.pieces.iter().map(|piece| match piece {
            Piece::Text(text) => Segment::Text(text),
            Piece::Param(name) => Segment::Param(name),
        })
    }

    /// Marker names in order of appearance, without duplicates.
    pub fn param_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in self.segments() {
            if let Segment::Param(name) = segment {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Returns `true` if the template contains no markers.
    pub fn is_static(&self) -> bool {
        self.pieces.iter().all(|piece| matches!(piece, Piece::Text(_)))
    }

    /// Substitutes each marker with the matching argument.
    ///
    /// Markers without an argument are written back in their text form.
    pub fn render(&self, args: &[(&str, &dyn Display)]) -> String {
        let segments: Vec<Segment<'_>> = self.segments().collect();
        render(&segments, args)
    }
}

impl Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, piece) in self.pieces.iter().enumerate() {
            match piece {
                Piece::Param(name) => write!(f, "${{{name}}}")?,
                Piece::Text(text) => {
                    // A following marker starts with `$`.
                    let next_is_marker = matches!(self.pieces.get(index + 1), Some(Piece::Param(_)));
                    let mut rest = text.as_str();
                    while let Some(found) = rest.find('$') {
                        let end = found + dollar_run(&rest[found..]);
                        let run = &rest[found..end];
                        let escape = match rest[end..].chars().next() {
                            Some(next) => next == '{',
                            None => next_is_marker,
                        };
                        f.write_str(&rest[..end])?;
                        if escape {
                            f.write_str(run)?;
                        }
                        rest = &rest[end..];
                    }
                    f.write_str(rest)?;
                }
            }
        }
        Ok(())
    }
}

/// Renders borrowed segments against named arguments.
///
/// This is the entry point used by generated accessors.
///
/// ```
/// use sqlgen_runtime::{Segment, render};
///
/// const SEGMENTS: &[Segment<'static>] = &[
///     Segment::Text("select * from prices where symbol = '"),
///     Segment::Param("symbol"),
///     Segment::Text("'"),
/// ];
///
/// let sql = render(SEGMENTS, &[("symbol", &"ACME")]);
/// assert_eq!(sql, "select * from prices where symbol = 'ACME'");
/// ```
pub fn render(segments: &[Segment<'_>], args: &[(&str, &dyn Display)]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Param(name) => match args.iter().find(|(arg, _)| arg == name) {
                Some((_, value)) => {
                    let _ = write!(out, "{value}");
                }
                None => {
                    let _ = write!(out, "${{{name}}}");
                }
            },
        }
    }
    out
}

/// Length in bytes of the run of `$` at the start of `text`.
fn dollar_run(text: &str) -> usize {
    text.bytes().take_while(|byte| *byte == b'$').count()
}

fn is_marker_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
