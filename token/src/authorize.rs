//! Answer authorization questions from decoded credentials.
use std::collections::BTreeSet;

use kubegate_models::Role;

use crate::CredentialClaims;
use crate::CredentialError;
use crate::CredentialValidator;

/// Outcome of an authorization check.
///
/// A denied check is a normal, expected outcome and is therefore a value,
/// not an error: "access denied" and "system broken" stay distinguishable at
/// every call site.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AuthorizationDecision {
    /// The operation is allowed, restricted to the given namespaces.
    ///
    /// An empty namespace set means the access is unrestricted.
    Authorized { namespaces: BTreeSet<String> },

    /// No grant in the credential covers the requested operation.
    NotAuthorized,
}

impl AuthorizationDecision {
    /// Check if the decision allows the operation.
    pub fn is_authorized(&self) -> bool {
        matches!(self, AuthorizationDecision::Authorized { .. })
    }
}

/// Authorize per-request operations from a credential alone.
///
/// Handlers needing live truth (grant mutations) should resolve against the
/// store instead; everything else trusts the embedded grant list until the
/// credential expires.
#[derive(Clone)]
pub struct RequestAuthorizer {
    validator: CredentialValidator,
}

impl RequestAuthorizer {
    /// Initialise an authorizer verifying with the process-wide symmetric secret.
    pub fn new(secret: &[u8]) -> RequestAuthorizer {
        RequestAuthorizer {
            validator: CredentialValidator::new(secret),
        }
    }

    /// Wrap an existing [`CredentialValidator`].
    pub fn from_validator(validator: CredentialValidator) -> RequestAuthorizer {
        RequestAuthorizer { validator }
    }

    /// Decide if the credential allows an operation on a cluster.
    ///
    /// Signature and expiry are verified first and fail the call with the
    /// matching [`CredentialError`] kind. A platform administrator credential
    /// is authorized unconditionally; otherwise the embedded grant list must
    /// contain an enabled grant for the target cluster whose role meets the
    /// requirement and, for namespace-scoped operations, whose scope covers
    /// the target namespace.
    pub fn authorize(
        &self,
        credential: &str,
        cluster: &str,
        required: Role,
        namespace: Option<&str>,
    ) -> Result<AuthorizationDecision, CredentialError> {
        let claims = self.validator.validate(credential)?;
        Ok(Self::decide(&claims, cluster, required, namespace))
    }

    /// Decide from already verified claims.
    pub fn decide(
        claims: &CredentialClaims,
        cluster: &str,
        required: Role,
        namespace: Option<&str>,
    ) -> AuthorizationDecision {
        // Platform admin is the maximum privilege and is never narrowed by
        // per-cluster grants.
        if claims.roles().contains(&Role::PlatformAdmin) {
            return AuthorizationDecision::Authorized {
                namespaces: BTreeSet::new(),
            };
        }

        for grant in &claims.cluster_grants {
            if grant.cluster != cluster || !grant.enabled {
                continue;
            }
            if !grant.role.satisfies(required) {
                continue;
            }
            if let Some(namespace) = namespace {
                if !grant.allows_namespace(namespace) {
                    continue;
                }
            }
            return AuthorizationDecision::Authorized {
                namespaces: grant.namespaces.clone(),
            };
        }
        AuthorizationDecision::NotAuthorized
    }
}
