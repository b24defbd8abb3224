//! Compiled schema artifact
//!
//! A [`CompiledSchema`] is what the persistence engine consumes: the merged and
//! resolved field map, schema-level options, and the behavior maps. It is
//! sealed once and shared through `Arc`.

use crate::class::{InstanceMethod, MethodMap, StaticMap, StaticMethod};
use crate::options::{FieldOptions, SchemaOptions};
use crate::types::TypeVariant;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// One resolved field
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub resolved_type: TypeVariant,
    pub options: FieldOptions,
}

impl FieldDescriptor {
    /// Evaluated default, if the field has one
    pub fn default_value(&self) -> Option<Value> {
        self.options.default.as_ref().map(|d| d.evaluate())
    }

    pub fn describe(&self) -> Value {
        let mut out = self.options.describe();
        out.insert("type".into(), self.resolved_type.describe());
        Value::Object(out)
    }
}

pub struct CompiledSchema {
    pub(crate) name: String,
    pub(crate) fields: Vec<(String, FieldDescriptor)>,
    pub(crate) options: SchemaOptions,
    pub(crate) methods: MethodMap,
    pub(crate) statics: StaticMap,
    pub(crate) base: Option<Arc<CompiledSchema>>,
}

impl CompiledSchema {
    /// Name of the class this schema was compiled from
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }

    /// Field names in merge order: base fields first, then new own fields
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    pub fn has_identity(&self) -> bool {
        self.options.has_identity()
    }

    /// Schema of the base class, if the class extended one
    pub fn base(&self) -> Option<&Arc<CompiledSchema>> {
        self.base.as_ref()
    }

    /// Methods declared directly on this class
    pub fn methods(&self) -> &MethodMap {
        &self.methods
    }

    /// Statics declared directly on this class
    pub fn statics(&self) -> &StaticMap {
        &self.statics
    }

    /// Look up an instance method, own entries shadowing inherited ones
    pub fn method(&self, name: &str) -> Option<&InstanceMethod> {
        self.methods
            .get(name)
            .or_else(|| self.base.as_ref().and_then(|b| b.method(name)))
    }

    pub fn static_fn(&self, name: &str) -> Option<&StaticMethod> {
        self.statics
            .get(name)
            .or_else(|| self.base.as_ref().and_then(|b| b.static_fn(name)))
    }

    pub fn all_methods(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = self.methods.keys().map(String::as_str).collect();
        if let Some(base) = &self.base {
            names.extend(base.all_methods());
        }
        names
    }

    pub fn all_statics(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = self.statics.keys().map(String::as_str).collect();
        if let Some(base) = &self.base {
            names.extend(base.all_statics());
        }
        names
    }

    /// Evaluated defaults of every field that has one
    pub fn defaults(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter_map(|(name, f)| f.default_value().map(|v| (name.clone(), v)))
            .collect()
    }

    /// JSON descriptor for inspection and engine hand-off
    pub fn describe(&self) -> Value {
        let fields: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, f)| (name.clone(), f.describe()))
            .collect();

        json!({
            "name": self.name,
            "fields": fields,
            "options": serde_json::to_value(&self.options).unwrap_or_default(),
            "methods": self.all_methods(),
            "statics": self.all_statics(),
        })
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("options", &self.options)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("statics", &self.statics.keys().collect::<Vec<_>>())
            .field("base", &self.base.as_ref().map(|b| b.name()))
            .finish()
    }
}
