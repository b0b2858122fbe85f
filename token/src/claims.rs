//! Claims carried inside a signed credential.
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use kubegate_models::GrantRecord;
use kubegate_models::Role;

/// Claim set signed into every issued credential.
///
/// The `role` and `clusters` fields are delimited-string projections kept for
/// consumers of the wire format; the embedded `cluster_grants` list is the
/// typed payload receivers use to reconstruct per-cluster role and namespace
/// scope without a store round trip.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Username the credential was issued to.
    pub username: String,

    /// Comma-joined platform roles held at issuance.
    pub role: String,

    /// Comma-joined names of the clusters covered by the grant list.
    pub clusters: String,

    /// Grants backing the credential, enough to authorize without the store.
    #[serde(default)]
    pub cluster_grants: Vec<GrantRecord>,

    /// Unix timestamp the credential was issued at.
    pub iat: i64,

    /// Unix timestamp the credential expires at.
    pub exp: i64,
}

impl CredentialClaims {
    /// Decode the role projection back into the typed role set.
    ///
    /// Unknown role names are skipped, matching how role claims attached by
    /// the identity layer are read.
    pub fn roles(&self) -> BTreeSet<Role> {
        Role::parse_list(&self.role)
    }
}
