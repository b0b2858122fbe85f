//! Configuration for the SQLite events backend.
use serde::Deserialize;
use serde::Serialize;

/// SQLite specific configuration for the events interface.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Conf {
    /// Path to the SQLite DB file.
    pub path: String,
}

/// The SQLite events backend configuration is not valid.
#[derive(Debug, thiserror::Error)]
#[error("the SQLite events backend configuration is not valid")]
pub struct ConfError;
