//! Error types for UPI payment links

use thiserror::Error;

/// Result type alias for payment link operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding or decoding a payment link
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The payee address is empty, so no link can be produced
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// A field name that is not part of the payment form
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Invalid link format
    #[error("Invalid URI format: {0}")]
    InvalidUri(String),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Whether this is the missing payee condition surfaced to the user
    pub fn is_missing_required(&self) -> bool {
        matches!(self, Error::MissingRequiredField(_))
    }
}
