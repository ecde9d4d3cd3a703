//! Decode error type for polymorphic containers.

use thiserror::Error;

/// Failures surfaced while decoding a [`PolyType`](crate::PolyType).
///
/// Duplicate registrations are not represented here: they panic at
/// registration time.
#[derive(Debug, Error)]
pub enum PolyTypeError {
    /// The input is not a well-formed JSON object.
    #[error("{0}")]
    MalformedInput(#[source] serde_json::Error),
    /// The discriminator field is missing, `null` or an empty string.
    #[error("type must be specified")]
    EmptyDiscriminator,
    /// No factory is registered under the discriminator.
    #[error("type \"{0}\" is not supported")]
    UnsupportedType(String),
    /// The variant was resolved but the payload did not decode into it.
    #[error("{source}")]
    PayloadDecode {
        discriminator: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PolyTypeError {
    /// Returns the discriminator this error refers to, when one was read.
    pub fn discriminator(&self) -> Option<&str> {
        match self {
            PolyTypeError::UnsupportedType(name) => Some(name),
            PolyTypeError::PayloadDecode { discriminator, .. } => Some(discriminator),
            PolyTypeError::MalformedInput(_) | PolyTypeError::EmptyDiscriminator => None,
        }
    }
}
