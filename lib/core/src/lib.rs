//! # docschema Core
//!
//! Core library for docschema: turns declared document classes into sealed
//! schema descriptors for a document-mapping engine.
//!
//! This crate provides the declaration and compilation pipeline:
//!
//! - [`FieldRegistry`] - per-class accumulator of field declarations
//! - [`TypeResolver`] - maps declared types onto [`TypeVariant`]s
//! - [`Compiler`] - merges inheritance, infers defaults, seals [`CompiledSchema`]s
//! - [`SchemaClass`] - a declared class, built with [`SchemaClassBuilder`]
//!
//! ## Example
//!
//! ```rust
//! use docschema_core::{FieldDecl, FieldOptions, Primitive, SchemaClass, SchemaOptions};
//! use serde_json::json;
//!
//! let auth = SchemaClass::builder("UserAuth")
//!     .field(FieldDecl::new("name", Primitive::String))
//!     .field(FieldDecl::new("type", Primitive::Number).options(FieldOptions::new().required()))
//!     .constructor(|| Ok(json!({"name": "name", "type": 254})))
//!     .schema(SchemaOptions::without_id())
//!     .unwrap();
//!
//! let schema = auth.compiled().unwrap();
//! assert_eq!(schema.field("type").unwrap().default_value(), Some(json!(254)));
//! ```

pub mod class;
pub mod compiler;
pub mod enums;
pub mod error;
pub mod options;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod types;

pub use class::{
    Constructor, InstanceMethod, MethodMap, SchemaClass, SchemaClassBuilder, StaticMap, StaticMethod,
    TypeReflector,
};
pub use compiler::Compiler;
pub use enums::{enum_values, SchemaEnum};
pub use error::{Error, Result};
pub use options::{is_empty_value, CompilerConfig, DefaultValue, FieldOptions, SchemaOptions, Validator};
pub use registry::{FieldDecl, FieldRegistry};
pub use resolver::TypeResolver;
pub use schema::{CompiledSchema, FieldDescriptor};
pub use types::{BoundModel, ClassRef, DeclaredType, Primitive, TypeVariant};
