use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NametagError {
    #[error("Invalid tag name: {0:?} is empty once whitespace and '@' are removed")]
    InvalidTagName(String),

    #[error("File name is outside the tag grammar (no extension): {0}")]
    OutOfGrammar(String),

    #[error("Rename failed: {from} -> {to}: {reason}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },

    #[error("Failed to write {what}: {reason}")]
    PersistenceWrite { what: &'static str, reason: String },

    #[error("Failed to read {what}: {reason}")]
    PersistenceRead { what: &'static str, reason: String },

    #[error("Unsupported {what} schema version {found} (expected {expected})")]
    UnsupportedVersion {
        what: &'static str,
        found: u32,
        expected: u32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, NametagError>;
