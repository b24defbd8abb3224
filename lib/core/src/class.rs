//! Class declarations
//!
//! A [`SchemaClass`] is the declared shape of a document type: its own
//! fields, an optional base class, an optional constructor used for default
//! inference, and the instance/static behavior attached to it. Classes are
//! built once through [`SchemaClassBuilder`] and never change afterwards,
//! apart from the compiled schema cached on first compilation.

use crate::compiler::Compiler;
use crate::options::{FieldOptions, SchemaOptions};
use crate::registry::{FieldDecl, FieldRegistry};
use crate::schema::CompiledSchema;
use crate::types::DeclaredType;
use crate::Result;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Builds a transient instance whose field values seed inferred defaults
pub type Constructor = Arc<dyn Fn() -> anyhow::Result<Value> + Send + Sync>;

/// Instance behavior: receives the document and call arguments
pub type InstanceMethod = Arc<dyn Fn(&Value, &[Value]) -> Value + Send + Sync>;

/// Static behavior: receives call arguments only
pub type StaticMethod = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

pub type MethodMap = BTreeMap<String, InstanceMethod>;
pub type StaticMap = BTreeMap<String, StaticMethod>;

/// External source of declared field types
pub trait TypeReflector {
    fn declared_type(&self, class: &str, field: &str) -> Option<DeclaredType>;
}

pub struct SchemaClass {
    name: String,
    base: Option<Arc<SchemaClass>>,
    registry: FieldRegistry,
    constructor: Option<Constructor>,
    methods: MethodMap,
    statics: StaticMap,
    compiled: OnceLock<Arc<CompiledSchema>>,
}

impl SchemaClass {
    pub fn builder(name: impl Into<String>) -> SchemaClassBuilder {
        SchemaClassBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> Option<&Arc<SchemaClass>> {
        self.base.as_ref()
    }

    /// Fields declared directly on this class
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn methods(&self) -> &MethodMap {
        &self.methods
    }

    pub fn statics(&self) -> &StaticMap {
        &self.statics
    }

    /// The sealed schema, once this class has been compiled
    pub fn compiled(&self) -> Option<&Arc<CompiledSchema>> {
        self.compiled.get()
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    /// Constructor of this class, or the nearest ancestor that has one
    pub fn instance_constructor(&self) -> Option<&Constructor> {
        self.constructor
            .as_ref()
            .or_else(|| self.base.as_ref().and_then(|b| b.instance_constructor()))
    }

    /// Construct a throwaway instance. Classes without any constructor yield `{}`.
    pub fn instantiate(&self) -> anyhow::Result<Value> {
        match self.instance_constructor() {
            Some(construct) => construct(),
            None => Ok(json!({})),
        }
    }

    // First seal wins; later callers get the existing schema.
    pub(crate) fn seal(&self, schema: Arc<CompiledSchema>) -> Arc<CompiledSchema> {
        self.compiled.get_or_init(|| schema).clone()
    }
}

impl fmt::Debug for SchemaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaClass")
            .field("name", &self.name)
            .field("base", &self.base.as_ref().map(|b| b.name()))
            .field("fields", &self.registry.names())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("statics", &self.statics.keys().collect::<Vec<_>>())
            .field("compiled", &self.is_compiled())
            .finish()
    }
}

/// Builder for [`SchemaClass`]
pub struct SchemaClassBuilder {
    name: String,
    base: Option<Arc<SchemaClass>>,
    fields: Vec<FieldDecl>,
    constructor: Option<Constructor>,
    methods: MethodMap,
    statics: StaticMap,
}

impl SchemaClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            fields: Vec::new(),
            constructor: None,
            methods: MethodMap::new(),
            statics: StaticMap::new(),
        }
    }

    /// Extend a base class.
    ///
    /// A field declared here under a name the base already has replaces the
    /// base field entirely, options included. Base options are not merged
    /// into the override.
    ///
    /// Inherited fields keep the default the base schema already carries,
    /// even when this class's constructor sets another value for them.
    /// Only inherited fields without a default pick one up from this
    /// class's instance.
    pub fn extends(mut self, base: &Arc<SchemaClass>) -> Self {
        self.base = Some(base.clone());
        self
    }

    pub fn field(mut self, decl: FieldDecl) -> Self {
        self.fields.push(decl);
        self
    }

    /// Declare a field whose type comes from a reflection source
    pub fn reflected_field(
        mut self,
        reflector: &dyn TypeReflector,
        name: impl Into<String>,
        options: FieldOptions,
    ) -> Self {
        let name = name.into();
        let declared = reflector.declared_type(&self.name, &name);
        self.fields.push(FieldDecl {
            name,
            declared,
            options,
        });
        self
    }

    pub fn constructor<F>(mut self, construct: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(construct));
        self
    }

    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    pub fn static_fn<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.statics.insert(name.into(), Arc::new(method));
        self
    }

    /// Register every field and produce the (uncompiled) class
    pub fn build(self) -> Result<Arc<SchemaClass>> {
        let mut registry = FieldRegistry::new(self.name.clone());
        for decl in self.fields {
            registry.register_decl(decl)?;
        }

        Ok(Arc::new(SchemaClass {
            name: self.name,
            base: self.base,
            registry,
            constructor: self.constructor,
            methods: self.methods,
            statics: self.statics,
            compiled: OnceLock::new(),
        }))
    }

    /// Build and compile with the default compiler configuration
    pub fn schema(self, options: SchemaOptions) -> Result<Arc<SchemaClass>> {
        self.schema_with(&Compiler::default(), options)
    }

    pub fn schema_with(self, compiler: &Compiler, options: SchemaOptions) -> Result<Arc<SchemaClass>> {
        let class = self.build()?;
        compiler.compile_schema(&class, options)?;
        Ok(class)
    }
}
