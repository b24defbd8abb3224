use crate::class::SchemaClass;
use crate::options::{is_empty_value, CompilerConfig, DefaultValue, SchemaOptions};
use crate::resolver::TypeResolver;
use crate::schema::{CompiledSchema, FieldDescriptor};
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Compiles declared classes into sealed schemas
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a class, or return its schema if it is already sealed.
    ///
    /// A sealed schema is never rebuilt; options passed for an already
    /// compiled class are ignored.
    pub fn compile_schema(
        &self,
        class: &Arc<SchemaClass>,
        options: SchemaOptions,
    ) -> Result<Arc<CompiledSchema>> {
        if let Some(schema) = class.compiled() {
            if options != SchemaOptions::default() {
                warn!(class = class.name(), "schema already sealed, ignoring options");
            }
            return Ok(schema.clone());
        }

        TypeResolver::new(self).compile(class, &options)
    }

    pub(crate) fn build_schema(
        &self,
        resolver: &mut TypeResolver<'_>,
        class: &Arc<SchemaClass>,
        options: &SchemaOptions,
    ) -> Result<Arc<CompiledSchema>> {
        let base = match class.base() {
            Some(base) => Some(resolver.embed(base)?),
            None => None,
        };

        let instance = if self.config.infer_defaults {
            Some(construct_instance(class)?)
        } else {
            None
        };

        let mut fields: Vec<(String, FieldDescriptor)> = base
            .as_ref()
            .map(|b| b.fields.clone())
            .unwrap_or_default();

        for decl in class.registry().iter() {
            let declared = decl.effective_type().ok_or_else(|| Error::InvalidFieldType {
                class: class.name().to_string(),
                field: decl.name.clone(),
            })?;
            let resolved_type = resolver.resolve(declared)?;
            trace!(class = class.name(), field = %decl.name, ty = ?resolved_type, "resolved field");

            let descriptor = FieldDescriptor {
                resolved_type,
                options: decl.options.clone(),
            };
            match fields.iter_mut().find(|(name, _)| *name == decl.name) {
                Some((_, existing)) => *existing = descriptor,
                None => fields.push((decl.name.clone(), descriptor)),
            }
        }

        if let Some(instance) = &instance {
            infer_defaults(class.name(), &mut fields, instance);
        }

        let options = match &base {
            Some(base) => options.inherit(base.options()),
            None => options.clone(),
        };

        debug!(
            class = class.name(),
            fields = fields.len(),
            base = base.as_ref().map(|b| b.name()),
            "compiled schema"
        );

        Ok(Arc::new(CompiledSchema {
            name: class.name().to_string(),
            fields,
            options,
            methods: class.methods().clone(),
            statics: class.statics().clone(),
            base,
        }))
    }
}

fn construct_instance(class: &SchemaClass) -> Result<Map<String, Value>> {
    let instance = class.instantiate().map_err(|e| Error::SchemaConstruction {
        class: class.name().to_string(),
        reason: format!("{e:#}"),
    })?;

    match instance {
        Value::Object(map) => Ok(map),
        other => Err(Error::SchemaConstruction {
            class: class.name().to_string(),
            reason: format!("constructor produced {other} instead of an object"),
        }),
    }
}

// Fields with an explicit default keep it.
fn infer_defaults(class: &str, fields: &mut [(String, FieldDescriptor)], instance: &Map<String, Value>) {
    for (name, descriptor) in fields.iter_mut() {
        if descriptor.options.default.is_some() {
            continue;
        }
        if let Some(value) = instance.get(name.as_str()) {
            if !is_empty_value(value) {
                trace!(class, field = %name, default = %value, "inferred default");
                descriptor.options.default = Some(DefaultValue::Value(value.clone()));
            }
        }
    }
}
