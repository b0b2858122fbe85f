//! Data object storing kubegate's configuration.
use serde::Deserialize;
use serde::Serialize;

/// Global configuration for the KubeGate process.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conf {
    /// Events Streaming Platform service configuration.
    pub events: BackendConf,

    /// Persistent grant store service configuration.
    pub store: BackendConf,

    /// Credential signing configuration.
    pub token: TokenConf,
}

/// Unstructured configuration for runtime selected service backends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackendConf {
    /// ID of the backend selected to provide the service.
    pub backend: String,

    /// Backend specific configuration options.
    #[serde(default, flatten)]
    pub options: serde_json::Value,
}

/// Configuration of credential signing and lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenConf {
    /// Symmetric secret used to sign and verify credentials.
    ///
    /// Loaded once at process start and treated as immutable thereafter.
    pub secret: String,

    /// Credential lifetime in seconds.
    ///
    /// Expiry is the only credential revocation mechanism so keep this short
    /// relative to the sensitivity of the access granted.
    #[serde(default = "TokenConf::default_ttl")]
    pub ttl: u64,
}

impl TokenConf {
    fn default_ttl() -> u64 {
        24 * 60 * 60
    }
}
