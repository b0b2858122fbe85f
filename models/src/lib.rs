//! Data model shared across the KubeGate access-control crates.
//!
//! The types in this crate are plain data: they carry no behaviour beyond
//! construction helpers and the role satisfaction lattice.
//! Resolution logic lives in `kubegate-access` and persistence in the
//! `kubegate-store` backends.
mod auth;
mod grant;
mod snapshot;

pub use self::auth::AuthContext;
pub use self::auth::Principal;
pub use self::auth::Role;
pub use self::auth::RoleParseError;
pub use self::grant::GrantRecord;
pub use self::grant::GrantSubject;
pub use self::grant::GroupBinding;
pub use self::grant::MalformedGrant;
pub use self::snapshot::AuthorizationSnapshot;
