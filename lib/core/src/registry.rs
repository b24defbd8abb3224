use crate::options::FieldOptions;
use crate::types::DeclaredType;
use crate::{Error, Result};

/// A single field declaration
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    /// `None` when the type source had nothing for this field
    pub declared: Option<DeclaredType>,
    pub options: FieldOptions,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: impl Into<DeclaredType>) -> Self {
        Self {
            name: name.into(),
            declared: Some(ty.into()),
            options: FieldOptions::default(),
        }
    }

    /// Field whose type must come from the `type` option
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared: None,
            options: FieldOptions::default(),
        }
    }

    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    /// The type resolution should use: the explicit option first, then the declared type
    pub fn effective_type(&self) -> Option<&DeclaredType> {
        self.options.type_override.as_ref().or(self.declared.as_ref())
    }
}

/// Per-class accumulator of field declarations, kept in declaration order
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    class: String,
    fields: Vec<FieldDecl>,
}

impl FieldRegistry {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: Vec::new(),
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// Register a field. A repeated name replaces the earlier declaration in place.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        declared: Option<DeclaredType>,
        options: FieldOptions,
    ) -> Result<()> {
        self.register_decl(FieldDecl {
            name: name.into(),
            declared,
            options,
        })
    }

    pub fn register_decl(&mut self, decl: FieldDecl) -> Result<()> {
        if decl.name.is_empty() {
            return Err(Error::InvalidFieldName(self.class.clone()));
        }
        if decl.effective_type().is_none() {
            return Err(Error::InvalidFieldType {
                class: self.class.clone(),
                field: decl.name,
            });
        }

        match self.fields.iter_mut().find(|f| f.name == decl.name) {
            Some(existing) => *existing = decl,
            None => self.fields.push(decl),
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDecl> {
        self.fields.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;
    use serde_json::json;

    #[test]
    fn test_register_keeps_declaration_order() {
        let mut registry = FieldRegistry::new("User");
        registry.register("name", Some(DeclaredType::string()), FieldOptions::new()).unwrap();
        registry.register("age", Some(DeclaredType::number()), FieldOptions::new()).unwrap();

        assert_eq!(registry.names(), vec!["name", "age"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_latest_registration_wins() {
        let mut registry = FieldRegistry::new("User");
        registry.register("name", Some(DeclaredType::string()), FieldOptions::new()).unwrap();
        registry.register("age", Some(DeclaredType::number()), FieldOptions::new()).unwrap();
        registry
            .register("name", Some(DeclaredType::string()), FieldOptions::new().default_value("x"))
            .unwrap();

        assert_eq!(registry.names(), vec!["name", "age"]);
        let name = registry.get("name").unwrap();
        assert_eq!(name.options.default.as_ref().unwrap().as_value(), Some(&json!("x")));
    }

    #[test]
    fn test_untyped_field_rejected() {
        let mut registry = FieldRegistry::new("User");
        let err = registry.register_decl(FieldDecl::untyped("payload")).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidFieldType { ref class, ref field } if class == "User" && field == "payload"
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_untyped_field_with_override_accepted() {
        let mut registry = FieldRegistry::new("User");
        let decl = FieldDecl::untyped("created")
            .options(FieldOptions::new().with_type(Primitive::Date));
        registry.register_decl(decl).unwrap();

        let created = registry.get("created").unwrap();
        assert!(matches!(
            created.effective_type(),
            Some(DeclaredType::Primitive(Primitive::Date))
        ));
    }

    #[test]
    fn test_override_beats_declared_type() {
        let decl = FieldDecl::new("count", Primitive::String)
            .options(FieldOptions::new().with_type(Primitive::Number));
        assert!(matches!(
            decl.effective_type(),
            Some(DeclaredType::Primitive(Primitive::Number))
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = FieldRegistry::new("User");
        let err = registry.register("", Some(DeclaredType::string()), FieldOptions::new());
        assert!(matches!(err, Err(Error::InvalidFieldName(_))));
    }
}
