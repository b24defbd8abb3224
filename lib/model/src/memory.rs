use crate::engine::PersistenceEngine;
use ahash::AHashMap;
use docschema_core::CompiledSchema;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Model registered with the in-memory engine
#[derive(Debug, Clone)]
pub struct InMemoryModel {
    name: String,
    schema: Arc<CompiledSchema>,
    initialized: bool,
}

impl InMemoryModel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Arc<CompiledSchema> {
        &self.schema
    }

    /// False when the model was registered with skip-init
    pub fn initialized(&self) -> bool {
        self.initialized
    }
}

/// Reference engine that only keeps a name -> model registry
#[derive(Default)]
pub struct InMemoryEngine {
    models: Arc<RwLock<AHashMap<String, InMemoryModel>>>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<InMemoryModel> {
        self.models.read().get(name).cloned()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.models.read().contains_key(name)
    }

    /// Registered model names, sorted
    #[must_use]
    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }
}

impl PersistenceEngine for InMemoryEngine {
    type Model = InMemoryModel;

    fn model(
        &self,
        name: &str,
        schema: &Arc<CompiledSchema>,
        skip_init: bool,
    ) -> anyhow::Result<InMemoryModel> {
        let mut models = self.models.write();

        if let Some(existing) = models.get(name) {
            if !Arc::ptr_eq(&existing.schema, schema) {
                anyhow::bail!(
                    "cannot overwrite model '{name}' (schema '{}') with schema '{}'",
                    existing.schema.name(),
                    schema.name()
                );
            }
            if existing.initialized == skip_init {
                anyhow::bail!(
                    "model '{name}' is already registered with skip_init={}",
                    !existing.initialized
                );
            }
            return Ok(existing.clone());
        }

        let model = InMemoryModel {
            name: name.to_string(),
            schema: schema.clone(),
            initialized: !skip_init,
        };
        models.insert(name.to_string(), model.clone());
        debug!(model = name, schema = schema.name(), skip_init, "registered model");
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docschema_core::{Compiler, FieldDecl, Primitive, SchemaClass, SchemaOptions};

    fn schema(name: &str) -> Arc<CompiledSchema> {
        let class = SchemaClass::builder(name)
            .field(FieldDecl::new("name", Primitive::String))
            .build()
            .unwrap();
        Compiler::default().compile_schema(&class, SchemaOptions::new()).unwrap()
    }

    #[test]
    fn test_register_model() {
        let engine = InMemoryEngine::new();
        let user = schema("User");

        let model = engine.model("user", &user, false).unwrap();
        assert_eq!(model.name(), "user");
        assert!(model.initialized());
        assert!(Arc::ptr_eq(model.schema(), &user));
        assert!(engine.contains("user"));
        assert_eq!(engine.model_names(), vec!["user".to_string()]);
    }

    #[test]
    fn test_rebind_same_schema_returns_existing() {
        let engine = InMemoryEngine::new();
        let user = schema("User");

        let first = engine.model("user", &user, true).unwrap();
        let again = engine.model("user", &user, true).unwrap();
        assert!(!again.initialized());
        assert_eq!(again.initialized(), first.initialized());
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_rebind_with_other_skip_init_rejected() {
        let engine = InMemoryEngine::new();
        let user = schema("User");
        engine.model("user", &user, true).unwrap();

        let err = engine.model("user", &user, false).unwrap_err();
        assert!(err.to_string().contains("already registered with skip_init=true"));
        assert!(!engine.get("user").unwrap().initialized());
    }

    #[test]
    fn test_rebind_different_schema_rejected() {
        let engine = InMemoryEngine::new();
        engine.model("user", &schema("User"), false).unwrap();

        let err = engine.model("user", &schema("Other"), false).unwrap_err();
        assert!(err.to_string().contains("cannot overwrite model 'user'"));
    }
}
