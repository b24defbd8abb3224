use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] docschema_core::Error),

    #[error("Invalid collection name: no name given for schema '{0}'")]
    InvalidCollectionName(String),

    #[error("Engine rejected model '{collection}': {reason}")]
    Engine { collection: String, reason: String },
}
