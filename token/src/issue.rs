//! Serialise resolved authorization snapshots into signed credentials.
use std::collections::BTreeSet;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use time::OffsetDateTime;

use kubegate_models::AuthorizationSnapshot;
use kubegate_models::GrantRecord;
use kubegate_models::Role;

use crate::CredentialClaims;
use crate::CredentialError;

/// Issue signed, expiring credentials from resolved authorization state.
#[derive(Clone)]
pub struct CredentialIssuer {
    header: Header,
    key: EncodingKey,
}

impl CredentialIssuer {
    /// Initialise an issuer signing with the process-wide symmetric secret.
    pub fn new(secret: &[u8]) -> CredentialIssuer {
        CredentialIssuer {
            header: Header::new(Algorithm::HS256),
            key: EncodingKey::from_secret(secret),
        }
    }

    /// Sign the given authorization state into a credential valid for `ttl`.
    ///
    /// The full grant objects are embedded so receivers can reconstruct
    /// per-cluster role and namespace scope without a store round trip.
    /// A signing failure aborts issuance, an unsigned credential is never
    /// returned.
    pub fn issue(
        &self,
        username: &str,
        roles: &BTreeSet<Role>,
        grants: &[GrantRecord],
        ttl: Duration,
    ) -> Result<String, CredentialError> {
        let clusters: BTreeSet<&str> = grants.iter().map(|grant| grant.cluster.as_str()).collect();
        let clusters: Vec<&str> = clusters.into_iter().collect();
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = CredentialClaims {
            username: username.to_string(),
            role: Role::join_list(roles),
            clusters: clusters.join(","),
            cluster_grants: grants.to_vec(),
            iat: now,
            exp: now + ttl.as_secs() as i64,
        };
        jsonwebtoken::encode(&self.header, &claims, &self.key).map_err(CredentialError::Signing)
    }

    /// Issue a credential directly from a resolved [`AuthorizationSnapshot`].
    pub fn issue_snapshot(
        &self,
        snapshot: &AuthorizationSnapshot,
        ttl: Duration,
    ) -> Result<String, CredentialError> {
        self.issue(&snapshot.username, &snapshot.roles, &snapshot.grants, ttl)
    }
}
