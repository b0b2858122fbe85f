//! Configuration for the SQLite grant store backend.
use serde::Deserialize;
use serde::Serialize;

/// SQLite specific configuration for the grant store interface.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Conf {
    /// Path to the SQLite DB file.
    pub path: String,
}

/// The SQLite grant store backend configuration is not valid.
#[derive(Debug, thiserror::Error)]
#[error("the SQLite grant store backend configuration is not valid")]
pub struct ConfError;
