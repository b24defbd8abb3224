use crate::engine::PersistenceEngine;
use crate::{Error, Result};
use docschema_core::{
    BoundModel, CompiledSchema, Compiler, InstanceMethod, SchemaClass, SchemaOptions, StaticMap,
    StaticMethod,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// What a collection is bound to: a sealed schema or a class still to compile
#[derive(Debug, Clone)]
pub enum SchemaSource {
    Compiled(Arc<CompiledSchema>),
    Class(Arc<SchemaClass>),
}

impl SchemaSource {
    fn into_schema(self, compiler: &Compiler) -> Result<Arc<CompiledSchema>> {
        match self {
            SchemaSource::Compiled(schema) => Ok(schema),
            SchemaSource::Class(class) => Ok(compiler.compile_schema(&class, SchemaOptions::default())?),
        }
    }
}

impl From<Arc<CompiledSchema>> for SchemaSource {
    fn from(schema: Arc<CompiledSchema>) -> Self {
        SchemaSource::Compiled(schema)
    }
}

impl From<&Arc<CompiledSchema>> for SchemaSource {
    fn from(schema: &Arc<CompiledSchema>) -> Self {
        SchemaSource::Compiled(schema.clone())
    }
}

impl From<Arc<SchemaClass>> for SchemaSource {
    fn from(class: Arc<SchemaClass>) -> Self {
        SchemaSource::Class(class)
    }
}

impl From<&Arc<SchemaClass>> for SchemaSource {
    fn from(class: &Arc<SchemaClass>) -> Self {
        SchemaSource::Class(class.clone())
    }
}

/// A compiled schema bound to a named collection
pub struct ModelHandle<M> {
    collection: String,
    schema: Arc<CompiledSchema>,
    skip_init: bool,
    model: M,
    statics: StaticMap,
}

impl<M> ModelHandle<M> {
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn schema(&self) -> &Arc<CompiledSchema> {
        &self.schema
    }

    pub fn skip_init(&self) -> bool {
        self.skip_init
    }

    /// The engine's model object
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Statics declared on the model itself
    pub fn statics(&self) -> &StaticMap {
        &self.statics
    }

    /// Model statics first, then the schema chain
    pub fn static_fn(&self, name: &str) -> Option<&StaticMethod> {
        self.statics.get(name).or_else(|| self.schema.static_fn(name))
    }

    pub fn method(&self, name: &str) -> Option<&InstanceMethod> {
        self.schema.method(name)
    }

    /// Call a static by name
    pub fn call_static(&self, name: &str, args: &[Value]) -> Option<Value> {
        self.static_fn(name).map(|f| f(args))
    }
}

impl<M> fmt::Debug for ModelHandle<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("collection", &self.collection)
            .field("schema", &self.schema.name())
            .field("skip_init", &self.skip_init)
            .field("statics", &self.statics.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<M: Send + Sync> BoundModel for ModelHandle<M> {
    fn collection_name(&self) -> &str {
        &self.collection
    }

    fn schema(&self) -> &Arc<CompiledSchema> {
        &self.schema
    }
}

/// Collection declaration: source schema, optional name, model statics
pub struct CollectionDecl {
    name: Option<String>,
    source: SchemaSource,
    skip_init: bool,
    statics: StaticMap,
    compiler: Compiler,
}

impl CollectionDecl {
    pub fn new(source: impl Into<SchemaSource>) -> Self {
        Self {
            name: None,
            source: source.into(),
            skip_init: false,
            statics: StaticMap::new(),
            compiler: Compiler::default(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn skip_init(mut self, skip: bool) -> Self {
        self.skip_init = skip;
        self
    }

    /// Compiler used when the source class still needs compiling
    pub fn compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn static_fn<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.statics.insert(name.into(), Arc::new(method));
        self
    }

    pub fn bind<E: PersistenceEngine>(self, engine: &E) -> Result<Arc<ModelHandle<E::Model>>> {
        let schema = self.source.into_schema(&self.compiler)?;
        let collection = collection_name(self.name.as_deref(), &schema)?;

        let model = engine
            .model(&collection, &schema, self.skip_init)
            .map_err(|e| Error::Engine {
                collection: collection.clone(),
                reason: format!("{e:#}"),
            })?;

        debug!(collection = %collection, schema = schema.name(), skip_init = self.skip_init, "bound collection");

        Ok(Arc::new(ModelHandle {
            collection,
            schema,
            skip_init: self.skip_init,
            model,
            statics: self.statics,
        }))
    }
}

/// Bind a schema (compiling it first if needed) to a collection.
///
/// Without a non-empty name, the schema's class name is used.
pub fn bind_collection<E: PersistenceEngine>(
    engine: &E,
    name: Option<&str>,
    source: impl Into<SchemaSource>,
    skip_init: bool,
) -> Result<Arc<ModelHandle<E::Model>>> {
    let mut decl = CollectionDecl::new(source).skip_init(skip_init);
    if let Some(name) = name {
        decl = decl.name(name);
    }
    decl.bind(engine)
}

fn collection_name(explicit: Option<&str>, schema: &CompiledSchema) -> Result<String> {
    explicit
        .filter(|n| !n.is_empty())
        .or(Some(schema.name()).filter(|n| !n.is_empty()))
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidCollectionName(schema.name().to_string()))
}
