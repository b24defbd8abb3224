use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid field type: '{class}.{field}' has no declared type and no explicit type option")]
    InvalidFieldType { class: String, field: String },

    #[error("Invalid field name in '{0}': field names cannot be empty")]
    InvalidFieldName(String),

    #[error("Schema construction failed for '{class}': {reason}")]
    SchemaConstruction { class: String, reason: String },

    #[error("Cyclic schema reference: {}", path.join(" -> "))]
    CyclicSchemaReference { path: Vec<String> },

    #[error("Undefined schema reference: '{0}' was declared but never defined")]
    UndefinedReference(String),
}
