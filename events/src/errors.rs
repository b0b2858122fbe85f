//! Errors returned by the kubegate-events crate.

/// Errors dealing with events.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unable to decode event payload into the specified type.
    #[error("unable to decode event payload into the specified type")]
    PayloadDecode,

    /// Unable to encode the given payload into an event.
    #[error("unable to encode the given payload into an event")]
    PayloadEncode,
}
