pub mod binder;
pub mod engine;
pub mod error;
pub mod memory;

pub use binder::{bind_collection, CollectionDecl, ModelHandle, SchemaSource};
pub use engine::PersistenceEngine;
pub use error::{Error, Result};
pub use memory::{InMemoryEngine, InMemoryModel};
