//! Read credentials from request transports.
use anyhow::Result;

/// Read credential material from a variety of request sources.
///
/// For example in HTTP(S) requests metadata should be extracted from headers.
pub trait CredentialReader {
    /// Look for a metadata value with the given key.
    ///
    /// Returns `None` if the entry is missing or an `Err` if the metadata
    /// could not be read or decoded.
    fn metadata(&self, name: &str) -> Result<Option<&str>>;
}

#[cfg(feature = "actix-web")]
impl CredentialReader for actix_web::HttpRequest {
    fn metadata(&self, name: &str) -> Result<Option<&str>> {
        match self.headers().get(name) {
            None => Ok(None),
            Some(header) => {
                let value = header.to_str()?;
                Ok(Some(value))
            }
        }
    }
}

/// Extract the bearer credential attached to a request, if any.
///
/// The credential is an opaque string carried in the standard
/// `Authorization: Bearer <token>` header.
pub fn bearer_credential<'a>(reader: &'a dyn CredentialReader) -> Result<Option<&'a str>> {
    let value = reader.metadata("Authorization")?;
    let credential = value
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|credential| !credential.is_empty());
    Ok(credential)
}
