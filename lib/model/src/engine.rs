use docschema_core::CompiledSchema;
use std::sync::Arc;

/// Boundary to the persistence engine.
///
/// The binder hands over a collection name, the sealed schema and the
/// skip-init flag, and stores whatever model object comes back without
/// interpreting it.
pub trait PersistenceEngine {
    type Model: Send + Sync + 'static;

    fn model(
        &self,
        name: &str,
        schema: &Arc<CompiledSchema>,
        skip_init: bool,
    ) -> anyhow::Result<Self::Model>;
}

impl<E: PersistenceEngine + ?Sized> PersistenceEngine for Arc<E> {
    type Model = E::Model;

    fn model(
        &self,
        name: &str,
        schema: &Arc<CompiledSchema>,
        skip_init: bool,
    ) -> anyhow::Result<Self::Model> {
        (**self).model(name, schema, skip_init)
    }
}
