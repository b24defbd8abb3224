//! Field, schema and compiler options

use crate::types::DeclaredType;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

/// Named validation callable attached to a field
pub type Validator = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Default value of a field: a fixed value or a factory evaluated per document
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    /// Produce the default for a new document
    pub fn evaluate(&self) -> Value {
        match self {
            DefaultValue::Value(v) => v.clone(),
            DefaultValue::Factory(f) => f(),
        }
    }

    /// The fixed value, if this is not a factory
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            DefaultValue::Value(v) => Some(v),
            DefaultValue::Factory(_) => None,
        }
    }

    pub fn is_factory(&self) -> bool {
        matches!(self, DefaultValue::Factory(_))
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(v) => write!(f, "Value({v})"),
            DefaultValue::Factory(_) => f.write_str("Factory"),
        }
    }
}

/// Whether a value counts as "unset" for default inference.
///
/// Null, `false`, zero, the empty string and empty arrays/objects are all empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0 || f.is_nan()).unwrap_or(false),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Per-field configuration
///
/// Everything here is handed to the persistence engine unchanged, except
/// `type_override` which the compiler consumes during resolution.
#[derive(Clone, Default)]
pub struct FieldOptions {
    /// Explicit type; always wins over the declared type
    pub type_override: Option<DeclaredType>,
    pub default: Option<DefaultValue>,
    pub required: Option<bool>,
    pub enum_values: Option<Vec<Value>>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub lowercase: bool,
    pub uppercase: bool,
    pub trim: bool,
    pub index: bool,
    pub unique: bool,
    pub sparse: bool,
    pub select: Option<bool>,
    pub immutable: bool,
    pub alias: Option<String>,
    pub validators: Vec<(String, Validator)>,
    /// Engine-specific keys passed through verbatim
    pub extra: Map<String, Value>,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, ty: impl Into<DeclaredType>) -> Self {
        self.type_override = Some(ty.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    pub fn default_with<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Factory(Arc::new(factory)));
        self
    }

    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }

    pub fn enum_values(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.enum_values = Some(values.into_iter().collect());
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn lowercase(mut self) -> Self {
        self.lowercase = true;
        self
    }

    pub fn uppercase(mut self) -> Self {
        self.uppercase = true;
        self
    }

    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn index(mut self) -> Self {
        self.index = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn sparse(mut self) -> Self {
        self.sparse = true;
        self
    }

    pub fn select(mut self, select: bool) -> Self {
        self.select = Some(select);
        self
    }

    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn validate<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validators.push((name.into(), Arc::new(check)));
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Run every validator against a value, returning the names of those that failed
    pub fn failed_validators(&self, value: &Value) -> Vec<&str> {
        self.validators
            .iter()
            .filter(|(_, check)| !check(value))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Serializable view of the options, as handed to the engine
    pub fn describe(&self) -> Map<String, Value> {
        let mut out = Map::new();
        match &self.default {
            Some(DefaultValue::Value(v)) => {
                out.insert("default".into(), v.clone());
            }
            Some(DefaultValue::Factory(_)) => {
                out.insert("default_factory".into(), json!(true));
            }
            None => {}
        }
        if let Some(required) = self.required {
            out.insert("required".into(), json!(required));
        }
        if let Some(values) = &self.enum_values {
            out.insert("enum".into(), Value::Array(values.clone()));
        }
        if let Some(min) = self.min {
            out.insert("min".into(), json!(min));
        }
        if let Some(max) = self.max {
            out.insert("max".into(), json!(max));
        }
        if let Some(len) = self.min_length {
            out.insert("min_length".into(), json!(len));
        }
        if let Some(len) = self.max_length {
            out.insert("max_length".into(), json!(len));
        }
        if let Some(pattern) = &self.pattern {
            out.insert("match".into(), json!(pattern));
        }
        for (key, set) in [
            ("lowercase", self.lowercase),
            ("uppercase", self.uppercase),
            ("trim", self.trim),
            ("index", self.index),
            ("unique", self.unique),
            ("sparse", self.sparse),
            ("immutable", self.immutable),
        ] {
            if set {
                out.insert(key.into(), json!(true));
            }
        }
        if let Some(select) = self.select {
            out.insert("select".into(), json!(select));
        }
        if let Some(alias) = &self.alias {
            out.insert("alias".into(), json!(alias));
        }
        if !self.validators.is_empty() {
            let names: Vec<&str> = self.validators.iter().map(|(n, _)| n.as_str()).collect();
            out.insert("validate".into(), json!(names));
        }
        for (key, value) in &self.extra {
            out.insert(key.clone(), value.clone());
        }
        out
    }
}

impl fmt::Debug for FieldOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOptions")
            .field("type_override", &self.type_override)
            .field("options", &self.describe())
            .finish()
    }
}

/// Schema-level options
///
/// Unset values are filled from the base schema when a class extends another,
/// except `id`, which belongs to each class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    /// Auto-generate the identity field (on unless disabled)
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimize: Option<bool>,
}

impl SchemaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress the auto-generated identity field (typical for embedded schemas)
    pub fn without_id() -> Self {
        Self {
            id: Some(false),
            ..Self::default()
        }
    }

    pub fn version_key(mut self, enabled: bool) -> Self {
        self.version_key = Some(enabled);
        self
    }

    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = Some(enabled);
        self
    }

    pub fn strict(mut self, enabled: bool) -> Self {
        self.strict = Some(enabled);
        self
    }

    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    pub fn minimize(mut self, enabled: bool) -> Self {
        self.minimize = Some(enabled);
        self
    }

    pub fn has_identity(&self) -> bool {
        self.id.unwrap_or(true)
    }

    /// Fill unset values from the base schema's options
    pub fn inherit(&self, base: &SchemaOptions) -> SchemaOptions {
        SchemaOptions {
            id: self.id,
            version_key: self.version_key.or(base.version_key),
            timestamps: self.timestamps.or(base.timestamps),
            strict: self.strict.or(base.strict),
            collection: self.collection.clone().or_else(|| base.collection.clone()),
            minimize: self.minimize.or(base.minimize),
        }
    }
}

/// Compiler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Infer defaults from a transient instance of each class
    pub infer_defaults: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            infer_defaults: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(is_empty_value(&Value::Null));
        assert!(is_empty_value(&json!(false)));
        assert!(is_empty_value(&json!(0)));
        assert!(is_empty_value(&json!(0.0)));
        assert!(is_empty_value(&json!("")));
        assert!(is_empty_value(&json!([])));
        assert!(is_empty_value(&json!({})));

        assert!(!is_empty_value(&json!(true)));
        assert!(!is_empty_value(&json!(254)));
        assert!(!is_empty_value(&json!("name")));
        assert!(!is_empty_value(&json!(["1"])));
        assert!(!is_empty_value(&json!({"heloo": "hello"})));
    }

    #[test]
    fn test_describe_options() {
        let options = FieldOptions::new()
            .default_value("x")
            .required()
            .enum_values(vec![json!("A"), json!("B")])
            .unique()
            .validate("non_empty", |v| !is_empty_value(v))
            .extra("ref", "User");

        let described = options.describe();
        assert_eq!(described["default"], json!("x"));
        assert_eq!(described["required"], json!(true));
        assert_eq!(described["enum"], json!(["A", "B"]));
        assert_eq!(described["unique"], json!(true));
        assert_eq!(described["validate"], json!(["non_empty"]));
        assert_eq!(described["ref"], json!("User"));
        assert!(!described.contains_key("index"));
    }

    #[test]
    fn test_factory_default() {
        let options = FieldOptions::new().default_with(|| json!(42));
        let default = options.default.as_ref().unwrap();
        assert!(default.is_factory());
        assert!(default.as_value().is_none());
        assert_eq!(default.evaluate(), json!(42));
        assert_eq!(options.describe()["default_factory"], json!(true));
    }

    #[test]
    fn test_failed_validators() {
        let options = FieldOptions::new()
            .validate("positive", |v| v.as_f64().map(|n| n > 0.0).unwrap_or(false))
            .validate("small", |v| v.as_f64().map(|n| n < 10.0).unwrap_or(false));

        assert!(options.failed_validators(&json!(5)).is_empty());
        assert_eq!(options.failed_validators(&json!(50)), vec!["small"]);
    }

    #[test]
    fn test_schema_options_inherit() {
        let base = SchemaOptions::without_id().timestamps(true).strict(false);
        let child = SchemaOptions::new().strict(true);

        let merged = child.inherit(&base);
        assert_eq!(merged.id, None);
        assert!(merged.has_identity());
        assert_eq!(merged.timestamps, Some(true));
        assert_eq!(merged.strict, Some(true));
    }

    #[test]
    fn test_schema_options_serde() {
        let options: SchemaOptions = serde_json::from_str(r#"{"_id": false, "timestamps": true}"#).unwrap();
        assert!(!options.has_identity());
        assert_eq!(options.timestamps, Some(true));

        let json = serde_json::to_value(SchemaOptions::without_id()).unwrap();
        assert_eq!(json, json!({"_id": false}));
    }

    #[test]
    fn test_compiler_config_default() {
        assert!(CompilerConfig::default().infer_defaults);
        let config: CompilerConfig = serde_json::from_str(r#"{"infer_defaults": false}"#).unwrap();
        assert!(!config.infer_defaults);
        let config: CompilerConfig = serde_json::from_str("{}").unwrap();
        assert!(config.infer_defaults);
    }
}
