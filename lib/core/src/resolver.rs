use crate::class::SchemaClass;
use crate::compiler::Compiler;
use crate::options::SchemaOptions;
use crate::schema::CompiledSchema;
use crate::types::{DeclaredType, TypeVariant};
use crate::{Error, Result};
use std::sync::Arc;
use tracing::trace;

/// Resolves declared field types into schema type variants.
///
/// Holds the stack of classes whose compilation is in progress, so a class
/// that ends up embedding itself is reported instead of recursing forever.
pub struct TypeResolver<'c> {
    compiler: &'c Compiler,
    in_progress: Vec<Arc<SchemaClass>>,
}

impl<'c> TypeResolver<'c> {
    pub fn new(compiler: &'c Compiler) -> Self {
        Self {
            compiler,
            in_progress: Vec::new(),
        }
    }

    pub fn resolve(&mut self, candidate: &DeclaredType) -> Result<TypeVariant> {
        match candidate {
            DeclaredType::Schema(schema) => Ok(TypeVariant::Embedded(schema.clone())),
            DeclaredType::Model(model) => Ok(TypeVariant::Embedded(model.schema().clone())),
            DeclaredType::Class(class) => self.embed(class).map(TypeVariant::Embedded),
            DeclaredType::Forward(reference) => {
                let class = reference
                    .get()
                    .ok_or_else(|| Error::UndefinedReference(reference.name().to_string()))?;
                self.embed(&class).map(TypeVariant::Embedded)
            }
            DeclaredType::Array(elements) => {
                let mut resolved = elements
                    .iter()
                    .map(|element| self.resolve(element))
                    .collect::<Result<Vec<_>>>()?;
                let element = if resolved.is_empty() {
                    TypeVariant::Mixed
                } else {
                    resolved.swap_remove(0)
                };
                Ok(TypeVariant::ArrayOf(Box::new(element)))
            }
            DeclaredType::Object => Ok(TypeVariant::Mixed),
            DeclaredType::Primitive(p) => Ok(TypeVariant::Primitive(*p)),
        }
    }

    /// Compiled schema of a class, compiling it with default options on first use
    pub(crate) fn embed(&mut self, class: &Arc<SchemaClass>) -> Result<Arc<CompiledSchema>> {
        if let Some(schema) = class.compiled() {
            trace!(class = class.name(), "reusing sealed schema");
            return Ok(schema.clone());
        }
        self.compile(class, &SchemaOptions::default())
    }

    pub(crate) fn compile(
        &mut self,
        class: &Arc<SchemaClass>,
        options: &SchemaOptions,
    ) -> Result<Arc<CompiledSchema>> {
        if let Some(pos) = self.in_progress.iter().position(|c| Arc::ptr_eq(c, class)) {
            let mut path: Vec<String> = self.in_progress[pos..]
                .iter()
                .map(|c| c.name().to_string())
                .collect();
            path.push(class.name().to_string());
            return Err(Error::CyclicSchemaReference { path });
        }

        let compiler = self.compiler;
        self.in_progress.push(class.clone());
        let result = compiler.build_schema(self, class, options);
        self.in_progress.pop();

        Ok(class.seal(result?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FieldDecl;
    use crate::types::{ClassRef, Primitive};

    fn resolve(ty: &DeclaredType) -> Result<TypeVariant> {
        let compiler = Compiler::default();
        TypeResolver::new(&compiler).resolve(ty)
    }

    #[test]
    fn test_primitive_passes_through() {
        assert_eq!(
            resolve(&DeclaredType::string()).unwrap(),
            TypeVariant::Primitive(Primitive::String)
        );
        assert_eq!(
            resolve(&Primitive::BigInt.into()).unwrap(),
            TypeVariant::Primitive(Primitive::BigInt)
        );
    }

    #[test]
    fn test_object_is_mixed() {
        assert_eq!(resolve(&DeclaredType::Object).unwrap(), TypeVariant::Mixed);
    }

    #[test]
    fn test_untyped_array_is_array_of_mixed() {
        let resolved = resolve(&DeclaredType::untyped_array()).unwrap();
        assert_eq!(resolved, TypeVariant::ArrayOf(Box::new(TypeVariant::Mixed)));
    }

    #[test]
    fn test_array_keeps_first_element() {
        let ty = DeclaredType::Array(vec![DeclaredType::number(), DeclaredType::string()]);
        let resolved = resolve(&ty).unwrap();
        assert_eq!(
            resolved,
            TypeVariant::ArrayOf(Box::new(TypeVariant::Primitive(Primitive::Number)))
        );
    }

    #[test]
    fn test_compiled_schema_is_reused() {
        let class = SchemaClass::builder("Auth")
            .field(FieldDecl::new("name", Primitive::String))
            .schema(SchemaOptions::without_id())
            .unwrap();
        let schema = class.compiled().unwrap().clone();

        let resolved = resolve(&DeclaredType::schema(&schema)).unwrap();
        assert!(Arc::ptr_eq(resolved.as_embedded().unwrap(), &schema));
    }

    #[test]
    fn test_uncompiled_class_is_compiled_once() {
        let class = SchemaClass::builder("Auth")
            .field(FieldDecl::new("name", Primitive::String))
            .build()
            .unwrap();
        assert!(!class.is_compiled());

        let first = resolve(&DeclaredType::class(&class)).unwrap();
        let second = resolve(&DeclaredType::array_of(&class)).unwrap();

        let sealed = class.compiled().unwrap();
        assert!(Arc::ptr_eq(first.as_embedded().unwrap(), sealed));
        assert!(Arc::ptr_eq(
            second.element().unwrap().as_embedded().unwrap(),
            sealed
        ));
        assert!(sealed.has_identity());
    }

    #[test]
    fn test_self_embedding_is_cyclic() {
        let reference = ClassRef::forward("Node");
        let node = SchemaClass::builder("Node")
            .field(FieldDecl::new("children", DeclaredType::array_of(DeclaredType::forward(&reference))))
            .build()
            .unwrap();
        assert!(reference.define(&node));

        let err = resolve(&DeclaredType::class(&node)).unwrap_err();
        match err {
            Error::CyclicSchemaReference { path } => assert_eq!(path, vec!["Node", "Node"]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!node.is_compiled());
    }

    #[test]
    fn test_mutual_embedding_is_cyclic() {
        let b_ref = ClassRef::forward("B");
        let a = SchemaClass::builder("A")
            .field(FieldDecl::new("b", DeclaredType::forward(&b_ref)))
            .build()
            .unwrap();
        let b = SchemaClass::builder("B")
            .field(FieldDecl::new("a", DeclaredType::class(&a)))
            .build()
            .unwrap();
        b_ref.define(&b);

        let err = resolve(&DeclaredType::class(&a)).unwrap_err();
        match err {
            Error::CyclicSchemaReference { path } => assert_eq!(path, vec!["A", "B", "A"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_undefined_forward_reference() {
        let reference = ClassRef::forward("Later");
        let err = resolve(&DeclaredType::forward(&reference)).unwrap_err();
        assert!(matches!(err, Error::UndefinedReference(name) if name == "Later"));
    }
}
