//! Encoding and decoding of UPI payment links
//!
//! ## Link Format
//!
//! ```text
//! upi://pay?pa=merchant%40bank&pn=Corner%20Store&am=12.50&cu=INR
//! ```
//!
//! `pa` is always present and always first. Every other parameter appears
//! only when its field is non-empty, in the fixed order of
//! [`FieldName::ALL`]. Values are percent-encoded the way
//! `encodeURIComponent` does it, so links match what browser-based
//! generators emit byte for byte.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::str::FromStr;

use crate::{Error, FieldName, PaymentFields, Result, UPI_ACTION, UPI_SCHEME};

/// Characters escaped in a parameter value: everything except ASCII
/// alphanumerics and `- _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode one parameter value
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Ordered `(key, encoded value)` pairs for the non-empty fields.
///
/// Fails with [`Error::MissingRequiredField`] when the payee address is
/// empty.
pub fn encode_pairs(fields: &PaymentFields) -> Result<Vec<(&'static str, String)>> {
    if fields.payee_vpa.is_empty() {
        return Err(Error::MissingRequiredField(FieldName::PayeeVpa.form_name()));
    }

    Ok(fields
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(field, value)| (field.key(), encode_component(value)))
        .collect())
}

/// Build the payment link for `fields`
pub fn encode_uri(fields: &PaymentFields) -> Result<String> {
    let query = encode_pairs(fields)?
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let uri = format!("{}://{}?{}", UPI_SCHEME, UPI_ACTION, query);
    tracing::debug!(%uri, "encoded payment link");
    Ok(uri)
}

/// Parse a payment link back into its fields.
///
/// Unknown parameters are ignored. Fields absent from the link, including
/// the currency, come back empty.
pub fn parse_uri(uri_str: &str) -> Result<PaymentFields> {
    let url = url::Url::parse(uri_str)?;

    if url.scheme() != UPI_SCHEME {
        return Err(Error::InvalidUri(format!(
            "Scheme must be {}, got {}",
            UPI_SCHEME,
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(action) if action == UPI_ACTION => {}
        Some(action) => {
            return Err(Error::InvalidUri(format!("Unknown action: {}", action)));
        }
        None => return Err(Error::InvalidUri("Missing action".to_string())),
    }

    if !matches!(url.path(), "" | "/") {
        return Err(Error::InvalidUri(format!("Unexpected path: {}", url.path())));
    }

    let query = url.query().unwrap_or("");
    let mut fields = PaymentFields::empty();

    for param in query.split('&').filter(|p| !p.is_empty()) {
        let mut parts = param.splitn(2, '=');
        let name = parts.next().unwrap_or("");
        let value = parts.next().unwrap_or("");

        let Some(field) = FieldName::from_key(name) else {
            // Ignore unknown parameters for forward compatibility
            continue;
        };

        fields.set(field, decode_component(value)?);
    }

    if fields.payee_vpa.is_empty() {
        return Err(Error::MissingRequiredField(FieldName::PayeeVpa.form_name()));
    }

    Ok(fields)
}

fn decode_component(value: &str) -> Result<String> {
    let spaced = value.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| Error::InvalidUri(format!("Invalid parameter encoding: {}", e)))
}

/// An encoded payment link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentUri {
    uri: String,
    fields: PaymentFields,
}

impl PaymentUri {
    /// Encode `fields` into a link
    pub fn new(fields: PaymentFields) -> Result<Self> {
        let uri = encode_uri(&fields)?;
        Ok(Self { uri, fields })
    }

    /// The link text
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// The fields the link was built from
    pub fn fields(&self) -> &PaymentFields {
        &self.fields
    }

    /// Consume self and return the link text
    pub fn into_string(self) -> String {
        self.uri
    }
}

impl FromStr for PaymentUri {
    type Err = Error;

    /// Parses and re-encodes, yielding the canonical parameter order
    fn from_str(s: &str) -> Result<Self> {
        Self::new(parse_uri(s)?)
    }
}

impl std::fmt::Display for PaymentUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

impl AsRef<str> for PaymentUri {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}
