//! Field type model
//!
//! Two layers:
//! - [`DeclaredType`] - what a field declaration says its type is
//! - [`TypeVariant`] - what the type resolver turned it into
//!
//! Only resolved variants ever appear inside a compiled schema.

use crate::class::SchemaClass;
use crate::schema::CompiledSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// Scalar types understood by the document mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    Number,
    Boolean,
    Date,
    Buffer,
    Map,
    BigInt,
    ObjectId,
    Decimal128,
    Uuid,
}

impl Primitive {
    /// Returns the type name used in schema descriptors
    pub fn type_name(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::Date => "date",
            Primitive::Buffer => "buffer",
            Primitive::Map => "map",
            Primitive::BigInt => "bigint",
            Primitive::ObjectId => "objectid",
            Primitive::Decimal128 => "decimal128",
            Primitive::Uuid => "uuid",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A compiled schema bound to a persistent collection.
///
/// Embedding a bound model in another schema embeds its underlying
/// schema, never the live model.
pub trait BoundModel: fmt::Debug + Send + Sync {
    fn collection_name(&self) -> &str;
    fn schema(&self) -> &Arc<CompiledSchema>;
}

/// Forward reference to a class that is defined later.
///
/// Needed for self-embedding and mutually embedding declarations, which the
/// resolver then rejects as cycles. The reference is weak: it does not keep
/// its class alive, so a class that refers to itself can still be dropped.
#[derive(Clone)]
pub struct ClassRef {
    name: String,
    slot: Arc<OnceLock<Weak<SchemaClass>>>,
}

impl ClassRef {
    pub fn forward(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: Arc::new(OnceLock::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Point the reference at its class. Returns false if it was already defined.
    pub fn define(&self, class: &Arc<SchemaClass>) -> bool {
        self.slot.set(Arc::downgrade(class)).is_ok()
    }

    /// The referenced class, if defined and still alive
    pub fn get(&self) -> Option<Arc<SchemaClass>> {
        self.slot.get().and_then(Weak::upgrade)
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRef")
            .field("name", &self.name)
            .field("defined", &self.get().is_some())
            .finish()
    }
}

/// The declared type of a field, before resolution
#[derive(Clone)]
pub enum DeclaredType {
    /// Scalar type, passed through unchanged
    Primitive(Primitive),
    /// Generic object with no static structure; resolves to mixed
    Object,
    /// Already compiled schema, embedded as-is
    Schema(Arc<CompiledSchema>),
    /// Bound model; its schema is embedded
    Model(Arc<dyn BoundModel>),
    /// Declared class, compiled on first embedding
    Class(Arc<SchemaClass>),
    /// Class defined after this declaration
    Forward(ClassRef),
    /// Homogeneous array; only the first element type is kept
    Array(Vec<DeclaredType>),
}

impl DeclaredType {
    pub fn string() -> Self {
        DeclaredType::Primitive(Primitive::String)
    }

    pub fn number() -> Self {
        DeclaredType::Primitive(Primitive::Number)
    }

    pub fn boolean() -> Self {
        DeclaredType::Primitive(Primitive::Boolean)
    }

    pub fn date() -> Self {
        DeclaredType::Primitive(Primitive::Date)
    }

    pub fn class(class: &Arc<SchemaClass>) -> Self {
        DeclaredType::Class(class.clone())
    }

    pub fn schema(schema: &Arc<CompiledSchema>) -> Self {
        DeclaredType::Schema(schema.clone())
    }

    pub fn model<M: BoundModel + 'static>(model: &Arc<M>) -> Self {
        let model: Arc<dyn BoundModel> = model.clone();
        DeclaredType::Model(model)
    }

    pub fn forward(reference: &ClassRef) -> Self {
        DeclaredType::Forward(reference.clone())
    }

    /// Array of a single element type
    pub fn array_of(element: impl Into<DeclaredType>) -> Self {
        DeclaredType::Array(vec![element.into()])
    }

    /// Array marker with no element type
    pub fn untyped_array() -> Self {
        DeclaredType::Array(Vec::new())
    }
}

impl From<Primitive> for DeclaredType {
    fn from(p: Primitive) -> Self {
        DeclaredType::Primitive(p)
    }
}

impl From<&Arc<SchemaClass>> for DeclaredType {
    fn from(class: &Arc<SchemaClass>) -> Self {
        DeclaredType::Class(class.clone())
    }
}

impl From<&Arc<CompiledSchema>> for DeclaredType {
    fn from(schema: &Arc<CompiledSchema>) -> Self {
        DeclaredType::Schema(schema.clone())
    }
}

impl fmt::Debug for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Primitive(p) => write!(f, "Primitive({p})"),
            DeclaredType::Object => f.write_str("Object"),
            DeclaredType::Schema(s) => write!(f, "Schema({})", s.name()),
            DeclaredType::Model(m) => write!(f, "Model({})", m.collection_name()),
            DeclaredType::Class(c) => write!(f, "Class({})", c.name()),
            DeclaredType::Forward(r) => write!(f, "Forward({})", r.name()),
            DeclaredType::Array(elems) => f.debug_list().entries(elems).finish(),
        }
    }
}

/// Resolved field type, as stored in a compiled schema
#[derive(Clone)]
pub enum TypeVariant {
    Primitive(Primitive),
    Embedded(Arc<CompiledSchema>),
    ArrayOf(Box<TypeVariant>),
    /// Payload shape unknown statically; accepted as-is
    Mixed,
}

impl TypeVariant {
    pub fn type_name(&self) -> &'static str {
        match self {
            TypeVariant::Primitive(p) => p.type_name(),
            TypeVariant::Embedded(_) => "embedded",
            TypeVariant::ArrayOf(_) => "array",
            TypeVariant::Mixed => "mixed",
        }
    }

    pub fn as_embedded(&self) -> Option<&Arc<CompiledSchema>> {
        match self {
            TypeVariant::Embedded(schema) => Some(schema),
            _ => None,
        }
    }

    /// Element type of an array variant
    pub fn element(&self) -> Option<&TypeVariant> {
        match self {
            TypeVariant::ArrayOf(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeVariant::ArrayOf(_))
    }

    /// JSON rendering for schema descriptors
    pub fn describe(&self) -> Value {
        match self {
            TypeVariant::Primitive(p) => json!(p.type_name()),
            TypeVariant::Embedded(schema) => schema.describe(),
            TypeVariant::ArrayOf(inner) => json!([inner.describe()]),
            TypeVariant::Mixed => json!("mixed"),
        }
    }
}

/// Embedded schemas compare by identity.
impl PartialEq for TypeVariant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeVariant::Primitive(a), TypeVariant::Primitive(b)) => a == b,
            (TypeVariant::Embedded(a), TypeVariant::Embedded(b)) => Arc::ptr_eq(a, b),
            (TypeVariant::ArrayOf(a), TypeVariant::ArrayOf(b)) => a == b,
            (TypeVariant::Mixed, TypeVariant::Mixed) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for TypeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeVariant::Primitive(p) => write!(f, "Primitive({p})"),
            TypeVariant::Embedded(s) => write!(f, "Embedded({})", s.name()),
            TypeVariant::ArrayOf(inner) => write!(f, "ArrayOf({inner:?})"),
            TypeVariant::Mixed => f.write_str("Mixed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_type_names() {
        assert_eq!(Primitive::String.type_name(), "string");
        assert_eq!(Primitive::BigInt.type_name(), "bigint");
        assert_eq!(Primitive::ObjectId.to_string(), "objectid");
    }

    #[test]
    fn test_primitive_serde_lowercase() {
        let json = serde_json::to_string(&Primitive::Decimal128).unwrap();
        assert_eq!(json, "\"decimal128\"");
        let parsed: Primitive = serde_json::from_str("\"date\"").unwrap();
        assert_eq!(parsed, Primitive::Date);
    }

    #[test]
    fn test_variant_describe() {
        let variant = TypeVariant::ArrayOf(Box::new(TypeVariant::Primitive(Primitive::String)));
        assert_eq!(variant.describe(), json!(["string"]));
        assert_eq!(TypeVariant::Mixed.describe(), json!("mixed"));
        assert_eq!(variant.type_name(), "array");
        assert_eq!(variant.element(), Some(&TypeVariant::Primitive(Primitive::String)));
    }

    #[test]
    fn test_forward_ref_starts_undefined() {
        let reference = ClassRef::forward("Node");
        assert_eq!(reference.name(), "Node");
        assert!(reference.get().is_none());
        assert_eq!(format!("{:?}", DeclaredType::forward(&reference)), "Forward(Node)");
    }

    #[test]
    fn test_self_referencing_class_is_freed() {
        use crate::registry::FieldDecl;

        let reference = ClassRef::forward("Node");
        let node = SchemaClass::builder("Node")
            .field(FieldDecl::new("next", DeclaredType::forward(&reference)))
            .build()
            .unwrap();
        assert!(reference.define(&node));
        assert!(Arc::ptr_eq(&reference.get().unwrap(), &node));

        let weak = Arc::downgrade(&node);
        drop(node);
        assert!(weak.upgrade().is_none());
        assert!(reference.get().is_none());
    }

    #[test]
    fn test_array_of_debug() {
        let ty = DeclaredType::array_of(Primitive::Number);
        assert_eq!(format!("{ty:?}"), "[Primitive(number)]");
    }
}
