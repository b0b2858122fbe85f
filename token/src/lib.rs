//! Signed credentials for the KubeGate control plane.
//!
//! A credential is the sole carrier of authorization state between issuance
//! and expiry: once a login or refresh resolves a principal's grants the
//! result is signed into a compact token and downstream request handlers
//! trust the decoded claims without re-querying storage.
//!
//! Credentials are stateless: they are never looked up by key, only decoded
//! and verified in place. There is no revocation mechanism: a compromised
//! credential remains usable until its natural expiry, so the configured
//! lifetime must stay short relative to the sensitivity of the access it
//! grants.
//!
//! The credential lifecycle is `Issued → Valid (until expiry) → Expired`,
//! with an orthogonal `Invalid` terminal state reachable at any time if the
//! signature does not verify (tamper or wrong key). Validation reports
//! expired and invalid credentials as distinct error kinds so callers can
//! trigger a refresh flow instead of an error page.
mod authorize;
mod claims;
mod errors;
mod extract;
mod issue;
mod validate;

#[cfg(test)]
mod tests;

pub use self::authorize::AuthorizationDecision;
pub use self::authorize::RequestAuthorizer;
pub use self::claims::CredentialClaims;
pub use self::errors::CredentialError;
pub use self::extract::bearer_credential;
pub use self::extract::CredentialReader;
pub use self::issue::CredentialIssuer;
pub use self::validate::CredentialValidator;
