//! # docschema
//!
//! Declarative schema compiler for document mappers.
//!
//! Declare document classes with typed fields, defaults, methods and statics;
//! docschema resolves field types, merges inheritance, infers defaults from a
//! throwaway instance and seals an immutable schema. Binding a schema to a
//! collection produces a model handle for the persistence engine.
//!
//! ## Quick Start
//!
//! ```rust
//! use docschema::prelude::*;
//! use serde_json::json;
//!
//! // Embedded schema without its own identity field
//! let auth = SchemaClass::builder("UserAuth")
//!     .field(FieldDecl::new("name", Primitive::String))
//!     .field(FieldDecl::new("type", Primitive::Number))
//!     .constructor(|| Ok(json!({"name": "name", "type": 254})))
//!     .schema(SchemaOptions::without_id())
//!     .unwrap();
//!
//! // Top-level class, compiled when it is bound
//! let user = SchemaClass::builder("UserSchema")
//!     .field(FieldDecl::new("auths", DeclaredType::array_of(&auth)))
//!     .field(FieldDecl::new("date", Primitive::Date))
//!     .build()
//!     .unwrap();
//!
//! let engine = InMemoryEngine::new();
//! let model = CollectionDecl::new(&user)
//!     .name("user")
//!     .static_fn("getAll", |_| json!([]))
//!     .bind(&engine)
//!     .unwrap();
//!
//! assert_eq!(model.collection(), "user");
//! assert!(model.schema().field("auths").unwrap().resolved_type.is_array());
//! ```
//!
//! ## Crate Structure
//!
//! - [`docschema-core`](https://docs.rs/docschema-core) - declarations, type resolution, compilation
//! - [`docschema-model`](https://docs.rs/docschema-model) - collection binding and the engine boundary

// Re-export core types
pub use docschema_core::{
    enum_values, BoundModel, ClassRef, CompiledSchema, Compiler, CompilerConfig, DeclaredType,
    DefaultValue, FieldDecl, FieldDescriptor, FieldOptions, FieldRegistry, Primitive, SchemaClass,
    SchemaClassBuilder, SchemaEnum, SchemaOptions, TypeReflector, TypeResolver, TypeVariant,
};

// Re-export model binding
pub use docschema_model::{
    bind_collection, CollectionDecl, InMemoryEngine, InMemoryModel, ModelHandle,
    PersistenceEngine, SchemaSource,
};

/// Core errors (declaration and compilation)
pub use docschema_core::{Error, Result};

/// Binding errors
pub mod model {
    pub use docschema_model::{Error, Result};
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        bind_collection, enum_values, ClassRef, CollectionDecl, CompiledSchema, Compiler,
        CompilerConfig, DeclaredType, FieldDecl, FieldOptions, InMemoryEngine, ModelHandle,
        PersistenceEngine, Primitive, SchemaClass, SchemaEnum, SchemaOptions, TypeVariant,
    };
}
