//! Decode and verify signed credentials.
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;

use crate::CredentialClaims;
use crate::CredentialError;

/// Verify credential signatures and expiry and decode the claim set.
#[derive(Clone)]
pub struct CredentialValidator {
    key: DecodingKey,
    validation: Validation,
}

impl CredentialValidator {
    /// Initialise a validator verifying with the process-wide symmetric secret.
    pub fn new(secret: &[u8]) -> CredentialValidator {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        CredentialValidator {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verify a credential and return its decoded claims.
    ///
    /// Signature and expiry are checked before any claim is surfaced: a
    /// tampered credential never yields a successful decode. Expired and
    /// invalid credentials fail with distinct error kinds.
    pub fn validate(&self, credential: &str) -> Result<CredentialClaims, CredentialError> {
        jsonwebtoken::decode::<CredentialClaims>(credential, &self.key, &self.validation)
            .map(|decoded| decoded.claims)
            .map_err(|error| match error.kind() {
                ErrorKind::ExpiredSignature => CredentialError::Expired,
                _ => CredentialError::Invalid,
            })
    }
}
