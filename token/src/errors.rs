//! Errors returned by the kubegate-token crate.

/// Errors issuing or verifying signed credentials.
///
/// Verification failures carry no detail beyond their kind: `Invalid` and
/// `Expired` are the only facts a caller may act on, and the signing secret
/// must never travel with an error.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The credential has passed its expiry time.
    ///
    /// Distinct from [`CredentialError::Invalid`] so callers can trigger a
    /// re-login flow instead of treating the request as hostile.
    #[error("the credential has passed its expiry time")]
    Expired,

    /// The credential signature or structure did not verify.
    #[error("the credential signature or structure did not verify")]
    Invalid,

    /// Signing the credential claims failed; no credential was issued.
    #[error("signing the credential claims failed")]
    Signing(#[source] jsonwebtoken::errors::Error),
}
