//! Code emitter: schema + template → Rust source and query resource.
//!
//! For a file `reports/daily_prices.sql` the generated module holds:
//!
//! - `MODULE_PATH`, `RESOURCE_PATH`, and `SEGMENTS` (the stored query as
//!   literal text and named markers);
//! - `DailyPrices`, one field per result column, with `from_row`,
//!   `values`, and a tab-separated `Display`;
//! - `sql(..)`, which renders the query from one argument per placeholder;
//! - `DailyPricesParams` with declared defaults, when the query has
//!   placeholders;
//! - `select(conn, ..)` and `select_with(conn, sql)`.
//!
//! Generated code only uses fully qualified paths into `rusqlite`,
//! `sqlgen_runtime`, and `std`, so it can be included anywhere. Items that
//! share a name with a placeholder argument are called through `self::`.
//!
//! Emission is pure; the caller decides where the text goes.

use std::path::{Component, Path};

use heck::ToUpperCamelCase;
use sqlgen_core::{
    CodegenError, Column, Schema, SqlTemplate, TemplateParam, escape_identifier, is_identifier,
    is_snake_case,
};
use sqlgen_runtime::Segment;

use crate::error::{GenerateError, Result};
use crate::identity::GENERATOR_VERSION;

/// Suffix of generated source files.
pub const SOURCE_SUFFIX: &str = "rs";

/// Emitted text for one SQL file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    /// The `noParam` query, written under the resource root.
    pub resource_text: String,
    /// The generated Rust module, written under the source root.
    pub source_text: String,
}

/// Names derived from a SQL file's location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    /// Rust module path of the generated file, e.g. `reports::daily_prices`.
    pub module_path: String,
    /// Generated record type, e.g. `DailyPrices`.
    pub type_name: String,
    /// Resource path relative to the resource root, `/`-separated.
    pub resource_path: String,
}

impl Naming {
    /// Derives names from `source_file` relative to `source_root`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidFileName`] when the base name without
    /// `.sql` is not a Rust identifier, or a path component is not UTF-8.
    ///
    /// ```
    /// use std::path::Path;
    /// use sqlgen_codegen::Naming;
    ///
    /// let naming = Naming::derive(Path::new("sql/a/b/daily_prices.sql"), Path::new("sql")).unwrap();
    /// assert_eq!(naming.module_path, "a::b::daily_prices");
    /// assert_eq!(naming.type_name, "DailyPrices");
    /// assert_eq!(naming.resource_path, "a/b/daily_prices.sql");
    /// ```
    pub fn derive(source_file: &Path, source_root: &Path) -> Result<Self> {
        let invalid = || GenerateError::InvalidFileName {
            path: source_file.to_path_buf(),
        };
        let relative = source_file.strip_prefix(source_root).unwrap_or(source_file);

        let file_name = relative
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(invalid)?;
        let base = file_name.strip_suffix(".sql").unwrap_or(file_name);
        if !is_identifier(base) {
            return Err(invalid());
        }
        let type_name = base.to_upper_camel_case();
        if !is_identifier(&type_name) {
            return Err(invalid());
        }

        let mut dirs = Vec::new();
        if let Some(parent) = relative.parent() {
            for component in parent.components() {
                if let Component::Normal(part) = component {
                    dirs.push(part.to_str().ok_or_else(invalid)?);
                }
            }
        }

        let mut modules: Vec<String> = dirs.iter().map(|dir| escape_identifier(dir)).collect();
        modules.push(base.to_string());
        let mut resource = dirs.clone();
        resource.push(file_name);

        Ok(Self {
            module_path: modules.join("::"),
            type_name,
            resource_path: resource.join("/"),
        })
    }
}

/// Emits the accessor module and query resource for one SQL file.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidFileName`] for a file name that cannot
/// name a type, and [`GenerateError::Codegen`] wrapping
/// [`CodegenError::UnsupportedColumn`] when a column has no reader
/// operation. Nothing is emitted on error.
pub fn emit(
    source_file: &Path,
    source_root: &Path,
    schema: &Schema,
    template: &SqlTemplate,
) -> Result<GeneratedCode> {
    let naming = Naming::derive(source_file, source_root)?;
    let source_text = render_module(&naming, schema, template)
        .map_err(|err| GenerateError::codegen(source_file, err))?;
    Ok(GeneratedCode {
        resource_text: template.no_param().to_string(),
        source_text,
    })
}

/// A record field, resolved from one column.
struct Field {
    name: String,
    ty: String,
    read: String,
    value: String,
}

impl Field {
    fn new(column: &Column, position: usize) -> std::result::Result<Self, CodegenError> {
        let reader = column.reader()?;
        let name = column.qualified_name.clone();
        let read = if column.nullable {
            format!("row.get_nullable({position}, sqlgen_runtime::{})?", reader.path())
        } else {
            format!("{}?", reader.call("row", position))
        };
        let value = if reader.copy {
            format!("sqlgen_runtime::Value::from(self.{name})")
        } else {
            format!("sqlgen_runtime::Value::from(self.{name}.clone())")
        };
        Ok(Self {
            ty: column.field_type()?,
            name,
            read,
            value,
        })
    }
}

/// A template function argument, resolved from one placeholder.
struct Arg<'a> {
    param: &'a TemplateParam,
    ident: String,
}

impl<'a> Arg<'a> {
    fn new(param: &'a TemplateParam) -> Self {
        Self {
            ident: param.arg_name(),
            param,
        }
    }

    fn is_string(&self) -> bool {
        self.param.function_arg_type() == "&str"
    }

    fn signature(&self) -> String {
        format!("{}: {}", self.ident, self.param.function_arg_type())
    }

    /// Argument expression when calling `sql` from a params struct.
    fn from_field(&self) -> String {
        if self.is_string() {
            format!("&self.{}", self.ident)
        } else {
            format!("self.{}", self.ident)
        }
    }

    /// Field initializer in `Params::new`.
    fn initializer(&self) -> String {
        match (&self.param.quoted_value, self.is_string()) {
            (Some(quoted), true) => format!("{quoted}.to_string()"),
            (Some(quoted), false) => quoted.clone(),
            (None, true) => format!("{}.to_string()", self.ident),
            (None, false) => self.ident.clone(),
        }
    }
}

/// Line-oriented source builder with four-space indentation.
#[derive(Default)]
struct Code {
    text: String,
    indent: usize,
}

impl Code {
    fn line(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        if !line.is_empty() {
            for _ in 0..self.indent {
                self.text.push_str("    ");
            }
            self.text.push_str(line);
        }
        self.text.push('\n');
    }

    fn blank(&mut self) {
        self.text.push('\n');
    }

    fn open(&mut self, line: impl AsRef<str>) {
        self.line(line);
        self.indent += 1;
    }

    fn close(&mut self, line: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(line);
    }
}

fn render_module(
    naming: &Naming,
    schema: &Schema,
    template: &SqlTemplate,
) -> std::result::Result<String, CodegenError> {
    let fields = schema
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| Field::new(column, index + 1))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let args: Vec<Arg<'_>> = template.params().iter().map(Arg::new).collect();

    let mut code = Code::default();
    write_header(&mut code, naming, template);
    write_record(&mut code, naming, &fields);
    write_sql_fn(&mut code, &args);
    if !args.is_empty() {
        write_params(&mut code, naming, &args);
    }
    write_select_fns(&mut code, naming, &args);
    Ok(code.text)
}

fn write_header(code: &mut Code, naming: &Naming, template: &SqlTemplate) {
    code.line(format!(
        "// @generated by sqlgen {GENERATOR_VERSION} from `{}`. Do not edit.",
        naming.resource_path
    ));
    code.line("//");
    code.line(format!("// Module: {}", naming.module_path));
    code.blank();
    code.line("use sqlgen_runtime::RowReader as _;");
    code.blank();
    code.line("/// Module path of this file, derived from the SQL file's location.");
    code.line(format!("pub const MODULE_PATH: &str = {:?};", naming.module_path));
    code.blank();
    code.line("/// Path of the stored query, relative to the resource root.");
    code.line(format!("pub const RESOURCE_PATH: &str = {:?};", naming.resource_path));
    code.blank();
    code.line("/// The stored query as literal text and named markers.");
    code.open("pub const SEGMENTS: &[sqlgen_runtime::Segment<'static>] = &[");
    for segment in template.template().segments() {
        match segment {
            Segment::Text(text) => code.line(format!("sqlgen_runtime::Segment::Text({text:?}),")),
            Segment::Param(name) => code.line(format!("sqlgen_runtime::Segment::Param({name:?}),")),
        }
    }
    code.close("];");
}

fn write_record(code: &mut Code, naming: &Naming, fields: &[Field]) {
    let ty = &naming.type_name;

    code.blank();
    code.line(format!("/// One result row of `{}`.", naming.resource_path));
    code.line("#[derive(Debug, Clone, PartialEq)]");
    if fields.iter().any(|field| !is_snake_case(&field.name)) {
        code.line("#[allow(non_snake_case)]");
    }
    code.open(format!("pub struct {ty} {{"));
    for field in fields {
        code.line(format!("pub {}: {},", field.name, field.ty));
    }
    code.close("}");

    code.blank();
    code.open(format!("impl {ty} {{"));
    code.line("/// Reads one row. Columns are read by position, starting at 1.");
    code.open("pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {");
    code.open("::std::result::Result::Ok(Self {");
    for field in fields {
        code.line(format!("{}: {},", field.name, field.read));
    }
    code.close("})");
    code.close("}");
    code.blank();
    code.line("/// Field values in column order.");
    code.open("pub fn values(&self) -> ::std::vec::Vec<sqlgen_runtime::Value> {");
    code.open("vec![");
    for field in fields {
        code.line(format!("{},", field.value));
    }
    code.close("]");
    code.close("}");
    code.close("}");

    code.blank();
    code.open(format!("impl ::std::fmt::Display for {ty} {{"));
    code.open("fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {");
    code.open("for (index, value) in self.values().iter().enumerate() {");
    code.open("if index > 0 {");
    code.line("f.write_str(\"\\t\")?;");
    code.close("}");
    code.line("write!(f, \"{value}\")?;");
    code.close("}");
    code.line("::std::result::Result::Ok(())");
    code.close("}");
    code.close("}");
}

fn allow_args_case(code: &mut Code, args: &[Arg<'_>]) {
    if args.iter().any(|arg| !is_snake_case(&arg.ident)) {
        code.line("#[allow(non_snake_case)]");
    }
}

fn write_sql_fn(code: &mut Code, args: &[Arg<'_>]) {
    let signature: Vec<String> = args.iter().map(Arg::signature).collect();
    let pairs: Vec<String> = args
        .iter()
        .map(|arg| format!("({:?}, &{})", arg.param.name, arg.ident))
        .collect();

    code.blank();
    code.line("/// Renders the query. Arguments are substituted as text, without quoting.");
    allow_args_case(code, args);
    code.open(format!("pub fn sql({}) -> ::std::string::String {{", signature.join(", ")));
    code.line(format!(
        "sqlgen_runtime::render(SEGMENTS, &[{}])",
        pairs.join(", ")
    ));
    code.close("}");
}

fn write_params(code: &mut Code, naming: &Naming, args: &[Arg<'_>]) {
    let ty = &naming.type_name;
    let params_ty = format!("{ty}Params");
    let required: Vec<String> = args
        .iter()
        .filter(|arg| arg.param.quoted_value.is_none())
        .map(Arg::signature)
        .collect();
    let call_args: Vec<String> = args.iter().map(Arg::from_field).collect();

    code.blank();
    code.line("/// Arguments of [`sql`] as an owned value.");
    code.line("#[derive(Debug, Clone, PartialEq)]");
    allow_args_case(code, args);
    code.open(format!("pub struct {params_ty} {{"));
    for arg in args {
        code.line(format!("pub {}: {},", arg.ident, arg.param.declared_type.field_type()));
    }
    code.close("}");

    code.blank();
    code.open(format!("impl {params_ty} {{"));
    code.line("/// Takes the parameters without a declared default; the rest start at their default.");
    allow_args_case(code, args);
    code.open(format!("pub fn new({}) -> Self {{", required.join(", ")));
    code.open("Self {");
    for arg in args {
        code.line(format!("{}: {},", arg.ident, arg.initializer()));
    }
    code.close("}");
    code.close("}");
    code.blank();
    code.line("/// Renders the query with these arguments.");
    code.open("pub fn sql(&self) -> ::std::string::String {");
    code.line(format!("self::sql({})", call_args.join(", ")));
    code.close("}");
    code.blank();
    code.line("/// Renders and runs the query.");
    code.open(format!(
        "pub fn select(&self, conn: &rusqlite::Connection) -> rusqlite::Result<::std::vec::Vec<{ty}>> {{"
    ));
    code.line("self::select_with(conn, &self.sql())");
    code.close("}");
    code.close("}");

    if required.is_empty() {
        code.blank();
        code.open(format!("impl ::std::default::Default for {params_ty} {{"));
        code.open("fn default() -> Self {");
        code.line("Self::new()");
        code.close("}");
        code.close("}");
    }
}

fn write_select_fns(code: &mut Code, naming: &Naming, args: &[Arg<'_>]) {
    let ty = &naming.type_name;

    let mut conn = String::from("conn");
    while args.iter().any(|arg| arg.ident == conn) {
        conn.push('_');
    }
    let mut signature = vec![format!("{conn}: &rusqlite::Connection")];
    signature.extend(args.iter().map(Arg::signature));
    let call_args: Vec<&str> = args.iter().map(|arg| arg.ident.as_str()).collect();

    code.blank();
    code.line("/// Renders the query and reads every row.");
    allow_args_case(code, args);
    code.open(format!(
        "pub fn select({}) -> rusqlite::Result<::std::vec::Vec<{ty}>> {{",
        signature.join(", ")
    ));
    code.line(format!(
        "self::select_with({conn}, &self::sql({}))",
        call_args.join(", ")
    ));
    code.close("}");

    code.blank();
    code.line("/// Runs already-rendered SQL and reads every row.");
    code.open(format!(
        "pub fn select_with(conn: &rusqlite::Connection, sql: &str) -> rusqlite::Result<::std::vec::Vec<{ty}>> {{"
    ));
    code.line(format!("sqlgen_runtime::query_rows(conn, sql, {ty}::from_row)"));
    code.close("}");
}

#[cfg(test)]
mod tests {
    use sqlgen_core::{ColumnInfo, SqlType, parse_template};

    use super::*;

    fn schema(columns: Vec<ColumnInfo>) -> Schema {
        Schema::from_columns(columns).unwrap()
    }

    fn prices_schema() -> Schema {
        schema(vec![
            ColumnInfo::new("symbol", SqlType::VarChar, false),
            ColumnInfo::new("open", SqlType::Double, false),
            ColumnInfo::new("volume", SqlType::BigInt, false),
        ])
    }

    #[test]
    fn test_naming_at_root() {
        let naming = Naming::derive(Path::new("sql/prices.sql"), Path::new("sql")).unwrap();
        assert_eq!(naming.module_path, "prices");
        assert_eq!(naming.type_name, "Prices");
        assert_eq!(naming.resource_path, "prices.sql");
    }

    #[test]
    fn test_naming_escapes_directories() {
        let naming =
            Naming::derive(Path::new("sql/type/my-queries/top_n.sql"), Path::new("sql")).unwrap();
        assert_eq!(naming.module_path, "r#type::my_queries::top_n");
        assert_eq!(naming.resource_path, "type/my-queries/top_n.sql");
        assert_eq!(naming.type_name, "TopN");
    }

    #[test]
    fn test_invalid_file_names() {
        for name in ["daily-prices.sql", "1prices.sql", "type.sql", "self_.sql", "_.sql"] {
            let path = Path::new("sql").join(name);
            let err = Naming::derive(&path, Path::new("sql")).unwrap_err();
            assert!(matches!(err, GenerateError::InvalidFileName { .. }), "{name}");
        }
    }

    #[test]
    fn test_end_to_end_prices_scenario() {
        let template = parse_template(
            "select symbol, open, volume from prices where TD_RANGE(time, '${start:String}', '${end:String}')",
        )
        .unwrap();
        let code = emit(
            Path::new("sql/prices.sql"),
            Path::new("sql"),
            &prices_schema(),
            &template,
        )
        .unwrap();

        assert_eq!(
            code.resource_text,
            "select symbol, open, volume from prices where TD_RANGE(time, '${start}', '${end}')"
        );
        let src = &code.source_text;
        assert!(src.contains("pub struct Prices {"));
        assert!(src.contains("    pub symbol: ::std::string::String,\n    pub open: f64,\n    pub volume: i64,\n"));
        assert!(src.contains("symbol: row.get_string(1)?,"));
        assert!(src.contains("open: row.get_double(2)?,"));
        assert!(src.contains("volume: row.get_long(3)?,"));
        assert!(src.contains("pub fn sql(start: &str, end: &str) -> ::std::string::String {"));
        assert!(src.contains(r#"sqlgen_runtime::render(SEGMENTS, &[("start", &start), ("end", &end)])"#));
        assert!(src.contains(
            "pub fn select(conn: &rusqlite::Connection, start: &str, end: &str) -> rusqlite::Result<::std::vec::Vec<Prices>> {"
        ));
        assert!(src.contains("pub struct PricesParams {"));
        assert!(src.contains("pub fn new(start: &str, end: &str) -> Self {"));
        assert!(!src.contains("Default for PricesParams"));
        assert!(!src.contains("non_snake_case"));
    }

    #[test]
    fn test_reserved_column_is_raw_everywhere() {
        let template = parse_template("select type from t").unwrap();
        let schema = schema(vec![ColumnInfo::new("type", SqlType::VarChar, false)]);
        let code = emit(Path::new("t.sql"), Path::new(""), &schema, &template).unwrap();
        assert!(code.source_text.contains("pub r#type: ::std::string::String,"));
        assert!(code.source_text.contains("r#type: row.get_string(1)?,"));
        assert!(code.source_text.contains("Value::from(self.r#type.clone())"));
        assert!(!code.source_text.contains(" type:"));
    }

    #[test]
    fn test_zero_placeholders() {
        let template = parse_template("select symbol from prices").unwrap();
        let schema = schema(vec![ColumnInfo::new("symbol", SqlType::VarChar, false)]);
        let code = emit(Path::new("all.sql"), Path::new(""), &schema, &template).unwrap();
        assert!(code.source_text.contains("pub fn sql() -> ::std::string::String {"));
        assert!(code.source_text.contains("sqlgen_runtime::render(SEGMENTS, &[])"));
        assert!(code.source_text.contains("pub fn select(conn: &rusqlite::Connection) ->"));
        assert!(!code.source_text.contains("AllParams"));
        assert_eq!(code.resource_text, template.raw());
    }

    #[test]
    fn test_defaults_fill_params() {
        let template =
            parse_template("select * from t where a = '${a:String}' limit ${limit:Int=5}").unwrap();
        let schema = schema(vec![ColumnInfo::new("a", SqlType::VarChar, false)]);
        let code = emit(Path::new("t.sql"), Path::new(""), &schema, &template).unwrap();
        let src = &code.source_text;
        assert!(src.contains("pub fn sql(a: &str, limit: i32) -> ::std::string::String {"));
        assert!(src.contains("pub fn new(a: &str) -> Self {"));
        assert!(src.contains("a: a.to_string(),"));
        assert!(src.contains("limit: 5,"));
        assert!(src.contains("self::sql(&self.a, self.limit)"));
    }

    #[test]
    fn test_default_impl_when_every_param_has_default() {
        let template =
            parse_template("select * from t where a = '${a:String=x}' and b = ${b:Double=.5}").unwrap();
        let schema = schema(vec![ColumnInfo::new("a", SqlType::VarChar, false)]);
        let code = emit(Path::new("t.sql"), Path::new(""), &schema, &template).unwrap();
        let src = &code.source_text;
        assert!(src.contains("pub fn new() -> Self {"));
        assert!(src.contains(r#"a: "x".to_string(),"#));
        assert!(src.contains("b: 0.5,"));
        assert!(src.contains("impl ::std::default::Default for TParams {"));
    }

    #[test]
    fn test_nullable_and_array_columns() {
        let template = parse_template("select * from t").unwrap();
        let schema = schema(vec![
            ColumnInfo::new("note", SqlType::VarChar, true),
            ColumnInfo::new("ratio", SqlType::Real, true),
            ColumnInfo::new("tags", SqlType::array_of(SqlType::VarChar), false),
        ]);
        let code = emit(Path::new("t.sql"), Path::new(""), &schema, &template).unwrap();
        let src = &code.source_text;
        assert!(src.contains("pub note: ::std::option::Option<::std::string::String>,"));
        assert!(src.contains("note: row.get_nullable(1, sqlgen_runtime::RowReader::get_string)?,"));
        assert!(src.contains("ratio: row.get_nullable(2, sqlgen_runtime::RowReader::get_float)?,"));
        assert!(src.contains("sqlgen_runtime::Value::from(self.ratio),"));
        assert!(src.contains("pub tags: ::std::vec::Vec<::std::string::String>,"));
        assert!(src.contains("tags: row.get_array::<::std::string::String>(3)?,"));
    }

    #[test]
    fn test_std_names_are_qualified() {
        let template = parse_template("select * from t where n >= ${n:Long=0}").unwrap();
        let schema = schema(vec![
            ColumnInfo::new("note", SqlType::VarChar, true),
            ColumnInfo::new("tags", SqlType::array_of(SqlType::VarChar), false),
        ]);
        for (file, ty) in [("string.sql", "String"), ("option.sql", "Option"), ("vec.sql", "Vec"), ("default.sql", "Default")] {
            let code = emit(Path::new(file), Path::new(""), &schema, &template).unwrap();
            let src = &code.source_text;
            assert!(src.contains(&format!("pub struct {ty} {{")), "{file}");
            assert!(src.contains(&format!(
                "pub fn select_with(conn: &rusqlite::Connection, sql: &str) -> rusqlite::Result<::std::vec::Vec<{ty}>> {{"
            )));
            assert!(src.contains(&format!("impl ::std::default::Default for {ty}Params {{")));

            let bare = src
                .replace("::std::string::String", "")
                .replace("::std::option::Option<", "")
                .replace("::std::vec::Vec<", "")
                .replace("::std::default::Default", "");
            for needle in [": String", "-> String", "Option<", "Vec<", "impl Default"] {
                assert!(!bare.contains(needle), "{file}: bare `{needle}`");
            }
        }
    }

    #[test]
    fn test_map_column_is_unsupported() {
        let template = parse_template("select attrs from t").unwrap();
        let schema = schema(vec![ColumnInfo::new("attrs", SqlType::Map, false)]);
        let err = emit(Path::new("sql/t.sql"), Path::new("sql"), &schema, &template).unwrap_err();
        match err {
            GenerateError::Codegen {
                path,
                source: CodegenError::UnsupportedColumn { column, access_kind },
            } => {
                assert_eq!(path, Path::new("sql/t.sql"));
                assert_eq!(column, "attrs");
                assert_eq!(access_kind, "Map");
            }
            other => panic!("expected UnsupportedColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_camel_case_names_allow_lint() {
        let template = parse_template("select * from t where id = ${userId:Long}").unwrap();
        let schema = schema(vec![ColumnInfo::new("closePrice", SqlType::Double, false)]);
        let code = emit(Path::new("t.sql"), Path::new(""), &schema, &template).unwrap();
        assert!(code.source_text.contains("#[allow(non_snake_case)]\npub struct T {"));
        assert!(code.source_text.contains("#[allow(non_snake_case)]\npub fn sql(userId: i64)"));
    }

    #[test]
    fn test_connection_argument_avoids_param_names() {
        let template = parse_template("select * from t where c = '${conn:String}'").unwrap();
        let schema = schema(vec![ColumnInfo::new("c", SqlType::VarChar, false)]);
        let code = emit(Path::new("t.sql"), Path::new(""), &schema, &template).unwrap();
        assert!(code
            .source_text
            .contains("pub fn select(conn_: &rusqlite::Connection, conn: &str)"));
        assert!(code.source_text.contains("self::select_with(conn_, &self::sql(conn))"));
    }

    #[test]
    fn test_segments_keep_literal_text() {
        let template = parse_template("select '$${x}', \"q\" from t where a = ${a:Int}").unwrap();
        let schema = schema(vec![ColumnInfo::new("a", SqlType::Integer, false)]);
        let code = emit(Path::new("t.sql"), Path::new(""), &schema, &template).unwrap();
        assert!(code
            .source_text
            .contains(r#"sqlgen_runtime::Segment::Text("select '${x}', \"q\" from t where a = "),"#));
        assert!(code.source_text.contains(r#"sqlgen_runtime::Segment::Param("a"),"#));
    }
}
