use std::path::PathBuf;

use thiserror::Error;

use crate::models::store::LocalStorage;

pub mod codec;
pub mod json;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to load store from '{path}': {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store file '{path}' does not contain valid JSON")]
    Corrupted { path: PathBuf },

    #[error("Failed to save store to '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {type_name} to JSON: {source}")]
    SerializeFailed {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to create backup at '{path}': {source}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to cleanup old backups in '{dir}': {source}")]
    CleanupFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing field '{field}' in '{record}'")]
    MissingField { record: String, field: String },

    #[error("Unknown field '{field}' in '{record}'")]
    UnknownField { record: String, field: String },

    #[error("Field '{field}' should hold {expected}")]
    UnexpectedShape {
        field: String,
        expected: &'static str,
    },

    #[error("Invalid '{record}': {source}")]
    InvalidRecord {
        record: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for '{field}' in '{record}': {source}")]
    InvalidField {
        record: String,
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

pub trait Storage {
    /// Returns `None` when no database has been created yet.
    fn load(&self) -> Result<Option<LocalStorage>, StorageError>;
    fn save(&self, store: &LocalStorage) -> Result<(), StorageError>;
}
