//! # UPI payment links
//!
//! This crate builds the `upi://pay` deep links that payment apps read from a
//! scanned QR code, and holds the payment form those links are built from.
//!
//! ## Overview
//!
//! - [`FormState`] holds the in-progress form. Any field can be set to any
//!   string; nothing is validated while editing.
//! - [`encode_uri`] turns the form into a link. The payee address is the
//!   only required field; empty fields are left out.
//! - [`normalize_amount`] applies the two-decimal display rule when an
//!   amount field loses focus.
//!
//! ## Link Format
//!
//! ```text
//! upi://pay?pa=merchant%40bank&pn=Corner%20Store&am=12.50&cu=INR
//! ```
//!
//! ## Example
//!
//! ```
//! use upiqr_uri::{FieldName, FormState};
//!
//! let mut form = FormState::new();
//! form.commit(FieldName::PayeeVpa, "m@b");
//! form.commit(FieldName::Amount, "5");
//!
//! assert_eq!(form.encode().unwrap(), "upi://pay?pa=m%40b&am=5.00&cu=INR");
//! ```

mod amount;
mod error;
mod fields;
mod uri;

pub use amount::{is_amount_field, normalize_amount};
pub use error::{Error, Result};
pub use fields::{FieldName, FormState, PaymentFields};
pub use uri::{encode_component, encode_pairs, encode_uri, parse_uri, PaymentUri};

/// Link scheme
pub const UPI_SCHEME: &str = "upi";

/// Link action (the authority part of the link)
pub const UPI_ACTION: &str = "pay";

/// Currency a new form starts with
pub const DEFAULT_CURRENCY: &str = "INR";

/// Currencies offered by the form
pub const SUPPORTED_CURRENCIES: [&str; 3] = ["INR", "USD", "EUR"];
