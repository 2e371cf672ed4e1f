//! Parsing of `${name:Type}` and `${name:Type=default}` placeholders.
//!
//! The parser is purely textual: placeholders are recognized anywhere in
//! the SQL, including inside string literals. Parsing produces three views
//! of the same query:
//!
//! - `populated`: every placeholder replaced by a stand-in literal of its
//!   declared type, suitable for a schema probe.
//! - `no_param`: every placeholder normalized to `${name}`; this is the
//!   stored query resource.
//! - the ordered parameter list.
//!
//! A literal `${` is written `$${` in the source SQL. More generally, a run
//! of `$` before `{` stands for half as many literal `$`, followed by a
//! placeholder when the run is odd and by a literal `{` when it is even.
//! Other `$` are literal, so SQL without placeholders is stored unchanged.
//!
//! ```
//! use sqlgen_core::{ParamType, parse_template};
//!
//! let template = parse_template("select * from t where id = ${id:Long} limit ${n:Int=10}").unwrap();
//! assert_eq!(template.populated(), "select * from t where id = 0 limit 0");
//! assert_eq!(template.no_param(), "select * from t where id = ${id} limit ${n}");
//! assert_eq!(template.params()[1].declared_type, ParamType::Int);
//! assert_eq!(template.params()[1].default_value.as_deref(), Some("10"));
//! ```

use std::fmt;

use serde::Serialize;
use sqlgen_runtime::Template;

use crate::error::ParseError;
use crate::ident::escape_identifier;

/// Declared scalar type of a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParamType {
    String,
    Int,
    Long,
    Float,
    Double,
    Boolean,
}

impl ParamType {
    /// Resolves a declared type tag such as `String` or `int`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let param_type = match tag {
            "String" | "string" => ParamType::String,
            "Int" | "int" => ParamType::Int,
            "Long" | "long" => ParamType::Long,
            "Float" | "float" => ParamType::Float,
            "Double" | "double" => ParamType::Double,
            "Boolean" | "boolean" | "bool" => ParamType::Boolean,
            _ => return None,
        };
        Some(param_type)
    }

    /// Literal substituted into `populated`.
    ///
    /// Always the `Display` form of the type's default value, so rendering
    /// the stored query with default values reproduces `populated` exactly.
    pub fn stand_in(self) -> &'static str {
        match self {
            ParamType::String => "",
            ParamType::Int | ParamType::Long | ParamType::Float | ParamType::Double => "0",
            ParamType::Boolean => "false",
        }
    }

    /// Rust type of the parameter in the generated template function.
    pub fn function_arg_type(self) -> &'static str {
        match self {
            ParamType::String => "&str",
            _ => self.field_type(),
        }
    }

    /// Rust type of the parameter as an owned struct field.
    pub fn field_type(self) -> &'static str {
        match self {
            ParamType::String => "::std::string::String",
            ParamType::Int => "i32",
            ParamType::Long => "i64",
            ParamType::Float => "f32",
            ParamType::Double => "f64",
            ParamType::Boolean => "bool",
        }
    }

    /// Validates a default literal and renders it as a Rust literal.
    fn quote(self, value: &str) -> Option<String> {
        let quoted = match self {
            ParamType::String => format!("{value:?}"),
            ParamType::Int => value.trim().parse::<i32>().ok()?.to_string(),
            ParamType::Long => value.trim().parse::<i64>().ok()?.to_string(),
            ParamType::Float => {
                let parsed = value.trim().parse::<f32>().ok().filter(|v| v.is_finite())?;
                format!("{parsed:?}")
            }
            ParamType::Double => {
                let parsed = value.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
                format!("{parsed:?}")
            }
            ParamType::Boolean => value.trim().parse::<bool>().ok()?.to_string(),
        };
        Some(quoted)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::String => "String",
            ParamType::Int => "Int",
            ParamType::Long => "Long",
            ParamType::Float => "Float",
            ParamType::Double => "Double",
            ParamType::Boolean => "Boolean",
        };
        f.write_str(name)
    }
}

/// One declared placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateParam {
    pub name: String,
    pub declared_type: ParamType,
    /// Raw default literal as written in the SQL.
    pub default_value: Option<String>,
    /// Default rendered as a Rust literal.
    pub quoted_value: Option<String>,
}

impl TemplateParam {
    /// Rust type of the generated function parameter.
    pub fn function_arg_type(&self) -> &'static str {
        self.declared_type.function_arg_type()
    }

    /// Escaped identifier for the generated function parameter.
    pub fn arg_name(&self) -> String {
        escape_identifier(&self.name)
    }
}

/// A parsed SQL file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlTemplate {
    raw: String,
    populated: String,
    no_param: String,
    params: Vec<TemplateParam>,
    #[serde(skip)]
    template: Template,
}

impl SqlTemplate {
    /// Original file contents.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Query with stand-in literals, used only for schema probing.
    pub fn populated(&self) -> &str {
        &self.populated
    }

    /// Query with normalized `${name}` markers.
    pub fn no_param(&self) -> &str {
        &self.no_param
    }

    /// Parameters in first-occurrence order.
    pub fn params(&self) -> &[TemplateParam] {
        &self.params
    }

    /// Literal/marker segments of [`no_param`](Self::no_param).
    pub fn template(&self) -> &Template {
        &self.template
    }
}

/// Parses the placeholders in `raw`.
///
/// # Errors
///
/// Returns a [`ParseError`] for malformed placeholders, unknown types,
/// defaults that do not match their type, and names redeclared with a
/// different type or default.
pub fn parse_template(raw: &str) -> Result<SqlTemplate, ParseError> {
    let mut template = Template::new();
    let mut populated = String::with_capacity(raw.len());
    let mut params: Vec<TemplateParam> = Vec::new();

    let mut pos = 0;
    let mut literal_start = 0;
    while let Some(found) = raw[pos..].find('$') {
        let offset = pos + found;
        let run = raw[offset..].bytes().take_while(|byte| *byte == b'$').count();
        let brace = offset + run;
        pos = brace;
        if !raw[brace..].starts_with('{') {
            continue;
        }

        push_literal(&mut template, &mut populated, &raw[literal_start..offset]);
        push_literal(&mut template, &mut populated, &raw[offset..offset + run / 2]);
        if run % 2 == 0 {
            push_literal(&mut template, &mut populated, "{");
            pos = brace + 1;
            literal_start = pos;
            continue;
        }

        let marker = brace - 1;
        let body_start = brace + 1;
        let body_len = raw[body_start..]
            .find('}')
            .ok_or(ParseError::Unterminated { offset: marker })?;
        let param = parse_placeholder(&raw[body_start..body_start + body_len], marker)?;

        populated.push_str(param.declared_type.stand_in());
        template.push_param(&param.name);
        register(&mut params, param, marker)?;

        pos = body_start + body_len + 1;
        literal_start = pos;
    }
    push_literal(&mut template, &mut populated, &raw[literal_start..]);

    Ok(SqlTemplate {
        raw: raw.to_string(),
        populated,
        no_param: template.to_string(),
        params,
        template,
    })
}

fn push_literal(template: &mut Template, populated: &mut String, text: &str) {
    template.push_text(text);
    populated.push_str(text);
}

fn parse_placeholder(body: &str, offset: usize) -> Result<TemplateParam, ParseError> {
    let Some((name, spec)) = body.split_once(':') else {
        return Err(ParseError::MissingType {
            name: body.trim().to_string(),
            offset,
        });
    };
    let name = name.trim();
    if !is_param_name(name) {
        return Err(ParseError::InvalidName {
            name: name.to_string(),
            offset,
        });
    }

    let (type_name, default_value) = match spec.split_once('=') {
        Some((type_name, default)) => (type_name.trim(), Some(default)),
        None => (spec.trim(), None),
    };
    let declared_type = ParamType::from_tag(type_name).ok_or_else(|| ParseError::UnknownType {
        name: name.to_string(),
        type_name: type_name.to_string(),
        offset,
    })?;

    let quoted_value = match default_value {
        Some(value) => Some(declared_type.quote(value).ok_or_else(|| {
            ParseError::InvalidDefault {
                name: name.to_string(),
                param_type: declared_type,
                value: value.to_string(),
                offset,
            }
        })?),
        None => None,
    };

    Ok(TemplateParam {
        name: name.to_string(),
        declared_type,
        default_value: default_value.map(str::to_string),
        quoted_value,
    })
}

fn register(
    params: &mut Vec<TemplateParam>,
    param: TemplateParam,
    offset: usize,
) -> Result<(), ParseError> {
    let Some(existing) = params.iter_mut().find(|p| p.name == param.name) else {
        params.push(param);
        return Ok(());
    };

    if existing.declared_type != param.declared_type {
        return Err(ParseError::ConflictingParamType {
            name: param.name,
            first: existing.declared_type,
            second: param.declared_type,
            offset,
        });
    }

    let Some(second) = param.default_value else {
        return Ok(());
    };
    if let Some(first) = &existing.default_value {
        if *first != second {
            return Err(ParseError::ConflictingDefault {
                name: param.name,
                first: first.clone(),
                second,
                offset,
            });
        }
        return Ok(());
    }
    existing.default_value = Some(second);
    existing.quoted_value = param.quoted_value;
    Ok(())
}

fn is_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
