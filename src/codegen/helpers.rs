//! Template helper registry.
//!
//! Every helper is a pure function of its arguments and an explicit
//! [`GenerationConfig`]. [`HelperRegistry::install`] binds them into a fresh
//! `minijinja::Environment` owned by a single invocation, so two runs with
//! different configurations never share helper state.
//!
//! Helper names follow the names used inside the templates (`toEntityName`,
//! `toRelation`, `toSwaggerType`, ...).

use minijinja::{Environment, Error, ErrorKind, Value};
use regex::Regex;
use serde_json::Value as JsonValue;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use crate::codegen::naming;
use crate::config::{ExportType, GenerationConfig, PropertyVisibility, StrictMode};
use crate::schema::RelationKind;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid")
});

/// A recovered missing-data condition reported by a helper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub helper: &'static str,
    pub message: String,
}

/// Collector for helper diagnostics, shared by the helpers of one invocation
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, helper: &'static str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(helper, "{}", message);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Diagnostic { helper, message });
    }

    /// Copy of everything recorded so far
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

/// Documentation type category for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwaggerType {
    String,
    Number,
    Boolean,
}

impl SwaggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwaggerType::String => "String",
            SwaggerType::Number => "Number",
            SwaggerType::Boolean => "Boolean",
        }
    }
}

pub fn to_entity_name(config: &GenerationConfig, name: &str) -> String {
    naming::convert(name, config.convert_case_entity)
}

pub fn to_file_name(config: &GenerationConfig, name: &str) -> String {
    naming::convert(name, config.convert_case_file)
}

pub fn to_property_name(config: &GenerationConfig, name: &str) -> String {
    naming::convert(name, config.convert_case_property)
}

/// Type of a relation property: `T[]` for to-many, wrapped in `Promise<...>` when lazy
pub fn to_relation(config: &GenerationConfig, entity_type: &str, kind: Option<RelationKind>) -> String {
    let mut ty = entity_type.to_string();
    if kind.is_some_and(|k| k.is_to_many()) {
        ty.push_str("[]");
    }
    if config.lazy {
        ty = format!("Promise<{}>", ty);
    }
    ty
}

/// Map a logical column type to its documentation category.
///
/// Total: anything unrecognized is documented as a string.
pub fn swagger_type(tsc_type: &str) -> SwaggerType {
    match tsc_type {
        "number" => SwaggerType::Number,
        "boolean" => SwaggerType::Boolean,
        _ => SwaggerType::String,
    }
}

/// Optional format hint: `date-time` for dates, `int32` for integer-backed numbers
pub fn swagger_format(tsc_type: &str, db_type: &str) -> Option<&'static str> {
    match tsc_type {
        "Date" => Some("date-time"),
        "number" if db_type.contains("int") => Some("int32"),
        _ => None,
    }
}

/// Visibility keyword followed by a space, or nothing
pub fn property_visibility(config: &GenerationConfig) -> String {
    match config.property_visibility {
        PropertyVisibility::None => String::new(),
        other => format!("{} ", other),
    }
}

pub fn default_export(config: &GenerationConfig) -> &'static str {
    match config.export_type {
        ExportType::Default => "default",
        ExportType::Named => "",
    }
}

/// Import clause for a generated class: `Name` for default exports, `{Name}` otherwise
pub fn local_import(config: &GenerationConfig, name: &str) -> String {
    match config.export_type {
        ExportType::Default => name.to_string(),
        ExportType::Named => format!("{{{}}}", name),
    }
}

pub fn strict_mode(config: &GenerationConfig) -> &'static str {
    match config.strict_mode {
        StrictMode::None => "",
        other => other.as_str(),
    }
}

/// Route permission decorator, e.g. `@permission('system:userProfile:list')`.
///
/// Empty when permission decorators are disabled.
pub fn permission(config: &GenerationConfig, entity_name: &str, operation: &str) -> String {
    if !config.add_permission_identifier {
        return String::new();
    }
    let entity = naming::to_camel_case(entity_name);
    let key = if config.permission_identifier_prefix.is_empty() {
        format!("{}:{}", entity, operation)
    } else {
        format!("{}:{}:{}", config.permission_identifier_prefix, entity, operation)
    };
    format!("{}('{}')", config.permission_identifier, key)
}

/// Serialize a value as a TypeScript literal.
///
/// Object keys that are valid identifiers are written unquoted; everything else
/// (other keys, strings, numbers) is written exactly as JSON would.
pub fn json_literal(value: &JsonValue) -> String {
    let mut out = String::new();
    write_literal(value, &mut out);
    out
}

fn write_literal(value: &JsonValue, out: &mut String) {
    match value {
        JsonValue::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&object_key(key));
                out.push(':');
                write_literal(item, out);
            }
            out.push('}');
        }
        JsonValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_literal(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Escape text for a single-quoted literal: backslashes, quotes and line breaks
pub fn escape_newlines(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
}

/// Object key for a TypeScript literal: bare when it is an identifier, quoted otherwise
pub fn object_key(key: &str) -> String {
    if IDENTIFIER.is_match(key) {
        key.to_string()
    } else {
        JsonValue::String(key.to_string()).to_string()
    }
}

/// Helper set bound to one invocation's configuration
#[derive(Debug, Clone)]
pub struct HelperRegistry {
    config: Arc<GenerationConfig>,
    diagnostics: Diagnostics,
}

impl HelperRegistry {
    pub fn new(config: GenerationConfig, diagnostics: Diagnostics) -> Self {
        Self {
            config: Arc::new(config),
            diagnostics,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Register every helper on `env`, replacing any helper of the same name
    pub fn install(&self, env: &mut Environment<'_>) {
        self.install_naming(env);
        self.install_typing(env);
        self.install_tokens(env);
        install_logic(env);
    }

    fn install_naming(&self, env: &mut Environment<'_>) {
        let (config, diagnostics) = (self.config.clone(), self.diagnostics.clone());
        env.add_function("toEntityName", move |name: Value| {
            name_arg(&name, "toEntityName", &diagnostics)
                .map(|n| to_entity_name(&config, &n))
                .unwrap_or_default()
        });

        let (config, diagnostics) = (self.config.clone(), self.diagnostics.clone());
        env.add_function("toFileName", move |name: Value| {
            name_arg(&name, "toFileName", &diagnostics)
                .map(|n| to_file_name(&config, &n))
                .unwrap_or_default()
        });

        let (config, diagnostics) = (self.config.clone(), self.diagnostics.clone());
        env.add_function("toPropertyName", move |name: Value| {
            name_arg(&name, "toPropertyName", &diagnostics)
                .map(|n| to_property_name(&config, &n))
                .unwrap_or_default()
        });

        let (config, diagnostics) = (self.config.clone(), self.diagnostics.clone());
        env.add_function("toColumnProperty", move |column: Value| {
            let Some(name) = name_arg(&attr(&column, "tscName"), "toColumnProperty", &diagnostics)
            else {
                return String::new();
            };
            let mut property = to_property_name(&config, &name);
            if attr(&column, "isNullable").is_true() {
                property.push('?');
            }
            property
        });

        let (config, diagnostics) = (self.config.clone(), self.diagnostics.clone());
        env.add_function(
            "toPermission",
            move |entity_name: Value, operation: String| {
                name_arg(&entity_name, "toPermission", &diagnostics)
                    .map(|n| permission(&config, &n, &operation))
                    .unwrap_or_default()
            },
        );
    }

    fn install_typing(&self, env: &mut Environment<'_>) {
        let (config, diagnostics) = (self.config.clone(), self.diagnostics.clone());
        env.add_function(
            "toRelation",
            move |entity_type: Value, relation_type: Value| -> Result<String, Error> {
                let Some(entity_type) = name_arg(&entity_type, "toRelation", &diagnostics) else {
                    return Ok(String::new());
                };
                let kind = match relation_type.as_str() {
                    Some(kind) => Some(kind.parse::<RelationKind>().map_err(|e| {
                        Error::new(ErrorKind::InvalidOperation, e.to_string())
                    })?),
                    None => {
                        diagnostics.record(
                            "toRelation",
                            format!("missing relation type for '{}'", entity_type),
                        );
                        None
                    }
                };
                Ok(to_relation(&config, &entity_type, kind))
            },
        );

        env.add_function("toColumnType", |column: Value| {
            let mut ty = attr(&column, "tscType")
                .as_str()
                .unwrap_or("string")
                .to_string();
            if attr(&column, "isArray").is_true() {
                ty.push_str("[]");
            }
            ty
        });

        env.add_function("toSwaggerType", |column: Value| {
            let tsc_type = attr(&column, "tscType");
            swagger_type(tsc_type.as_str().unwrap_or_default()).as_str()
        });

        env.add_function("toSwaggerFormat", |column: Value| {
            let tsc_type = attr(&column, "tscType");
            let db_type = attr(&column, "dbType");
            match swagger_format(
                tsc_type.as_str().unwrap_or_default(),
                db_type.as_str().unwrap_or_default(),
            ) {
                Some(format) => Value::from(format),
                None => Value::from(()),
            }
        });

        env.add_function("isPrimaryKey", |column: Value| attr(&column, "isPrimary").is_true());
        env.add_function("isGenerated", |column: Value| attr(&column, "isGenerated").is_true());

        env.add_function("json", |value: Value| -> Result<String, Error> {
            let json = serde_json::to_value(&value)
                .map_err(|e| Error::new(ErrorKind::BadSerialization, e.to_string()))?;
            Ok(json_literal(&json))
        });

        env.add_function("escapeNewlines", |text: Value| match text.as_str() {
            Some(s) => Value::from(escape_newlines(s)),
            None => text,
        });

        env.add_function("objectKey", |key: String| object_key(&key));
    }

    fn install_tokens(&self, env: &mut Environment<'_>) {
        let config = self.config.clone();
        env.add_function("printPropertyVisibility", move || property_visibility(&config));

        let config = self.config.clone();
        env.add_function("defaultExport", move || default_export(&config));

        let config = self.config.clone();
        env.add_function("strictMode", move || strict_mode(&config));

        let (config, diagnostics) = (self.config.clone(), self.diagnostics.clone());
        env.add_function("localImport", move |name: Value| {
            name_arg(&name, "localImport", &diagnostics)
                .map(|n| local_import(&config, &n))
                .unwrap_or_default()
        });
    }
}

/// Comparison and boolean helpers.
///
/// `and`/`or` return one of their operands, the way the template conditionals
/// of the generated files expect.
fn install_logic(env: &mut Environment<'_>) {
    env.add_function("and", logical_and);
    env.add_function("or", logical_or);
    env.add_function("eq", |a: Value, b: Value| a == b);
    env.add_function("ne", |a: Value, b: Value| a != b);
    env.add_function("gt", |a: Value, b: Value| a > b);
    env.add_function("gte", |a: Value, b: Value| a >= b);
    env.add_function("lt", |a: Value, b: Value| a < b);
    env.add_function("lte", |a: Value, b: Value| a <= b);
}

pub fn logical_and(a: Value, b: Value) -> Value {
    if a.is_true() {
        b
    } else {
        a
    }
}

pub fn logical_or(a: Value, b: Value) -> Value {
    if a.is_true() {
        a
    } else {
        b
    }
}

fn attr(value: &Value, name: &str) -> Value {
    value.get_attr(name).unwrap_or(Value::UNDEFINED)
}

/// Non-empty string argument, or a recorded diagnostic
fn name_arg(value: &Value, helper: &'static str, diagnostics: &Diagnostics) -> Option<String> {
    match value.as_str() {
        Some(s) if !s.is_empty() => Some(s.to_string()),
        _ => {
            let shown = if value.is_undefined() {
                "undefined".to_string()
            } else {
                format!("{:?}", value)
            };
            diagnostics.record(helper, format!("{} received invalid input: {}", helper, shown));
            None
        }
    }
}
