//! Payment form fields and the mutable form state that holds them

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{amount::normalize_amount, encode_uri, Error, Result, DEFAULT_CURRENCY};

/// One named field of the payment form.
///
/// Variants are declared in the order their parameters appear in an encoded
/// link; [`FieldName::ALL`] preserves that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldName {
    /// Payee virtual payment address (the only required field)
    PayeeVpa,
    /// Payee display name
    PayeeName,
    /// Fixed transaction amount
    Amount,
    /// Currency code
    Currency,
    /// Free-text transaction note
    TransactionNote,
    /// Merchant code
    MerchantCode,
    /// Minimum amount the payer may enter
    MinimumAmount,
    /// Maximum amount the payer may enter
    MaximumAmount,
    /// Transaction reference
    TransactionRef,
    /// Merchant category code (MCC)
    MerchantCategoryCode,
    /// Merchant city
    MerchantCity,
    /// Merchant postal (PIN) code
    MerchantPinCode,
}

impl FieldName {
    /// All fields in link order.
    pub const ALL: [FieldName; 12] = [
        FieldName::PayeeVpa,
        FieldName::PayeeName,
        FieldName::Amount,
        FieldName::Currency,
        FieldName::TransactionNote,
        FieldName::MerchantCode,
        FieldName::MinimumAmount,
        FieldName::MaximumAmount,
        FieldName::TransactionRef,
        FieldName::MerchantCategoryCode,
        FieldName::MerchantCity,
        FieldName::MerchantPinCode,
    ];

    /// Query parameter key used in the encoded link
    pub fn key(&self) -> &'static str {
        match self {
            Self::PayeeVpa => "pa",
            Self::PayeeName => "pn",
            Self::Amount => "am",
            Self::Currency => "cu",
            Self::TransactionNote => "tn",
            Self::MerchantCode => "mc",
            Self::MinimumAmount => "mam",
            Self::MaximumAmount => "mxam",
            Self::TransactionRef => "tr",
            Self::MerchantCategoryCode => "mcc",
            Self::MerchantCity => "mcity",
            Self::MerchantPinCode => "mpin",
        }
    }

    /// Name of the field in a serialized form
    pub fn form_name(&self) -> &'static str {
        match self {
            Self::PayeeVpa => "payeeVPA",
            Self::PayeeName => "payeeName",
            Self::Amount => "amount",
            Self::Currency => "currency",
            Self::TransactionNote => "transactionNote",
            Self::MerchantCode => "merchantCode",
            Self::MinimumAmount => "minimumAmount",
            Self::MaximumAmount => "maximumAmount",
            Self::TransactionRef => "transactionRef",
            Self::MerchantCategoryCode => "merchantCategoryCode",
            Self::MerchantCity => "merchantCity",
            Self::MerchantPinCode => "merchantPinCode",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::PayeeVpa => "Payee VPA",
            Self::PayeeName => "Payee Name",
            Self::Amount => "Amount",
            Self::Currency => "Currency",
            Self::TransactionNote => "Transaction Note",
            Self::MerchantCode => "Merchant Code",
            Self::MinimumAmount => "Minimum Amount",
            Self::MaximumAmount => "Maximum Amount",
            Self::TransactionRef => "Transaction Reference",
            Self::MerchantCategoryCode => "Merchant Category Code",
            Self::MerchantCity => "Merchant City",
            Self::MerchantPinCode => "Merchant PIN Code",
        }
    }

    /// Whether the two-decimal display rule applies to this field
    pub fn is_amount(&self) -> bool {
        matches!(
            self,
            Self::Amount | Self::MinimumAmount | Self::MaximumAmount
        )
    }

    /// Look up a field by its query parameter key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl FromStr for FieldName {
    type Err = Error;

    /// Accepts the form name, the link key, or a kebab/snake-case alias,
    /// ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let alias = match folded.as_str() {
            "vpa" => Some(Self::PayeeVpa),
            "name" => Some(Self::PayeeName),
            "note" => Some(Self::TransactionNote),
            "minamount" => Some(Self::MinimumAmount),
            "maxamount" => Some(Self::MaximumAmount),
            "txref" => Some(Self::TransactionRef),
            "city" => Some(Self::MerchantCity),
            "pincode" => Some(Self::MerchantPinCode),
            _ => None,
        };

        alias
            .or_else(|| {
                Self::ALL.into_iter().find(|f| {
                    f.key() == folded || f.form_name().to_ascii_lowercase() == folded
                })
            })
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.form_name())
    }
}

/// Values of every payment form field.
///
/// All members are free-form text; an empty string means the parameter is
/// omitted from the link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentFields {
    #[serde(rename = "payeeVPA")]
    pub payee_vpa: String,
    pub payee_name: String,
    pub amount: String,
    pub currency: String,
    pub transaction_note: String,
    pub merchant_code: String,
    pub minimum_amount: String,
    pub maximum_amount: String,
    pub transaction_ref: String,
    pub merchant_category_code: String,
    pub merchant_city: String,
    pub merchant_pin_code: String,
}

impl Default for PaymentFields {
    fn default() -> Self {
        Self {
            payee_vpa: String::new(),
            payee_name: String::new(),
            amount: String::new(),
            currency: DEFAULT_CURRENCY.to_string(),
            transaction_note: String::new(),
            merchant_code: String::new(),
            minimum_amount: String::new(),
            maximum_amount: String::new(),
            transaction_ref: String::new(),
            merchant_category_code: String::new(),
            merchant_city: String::new(),
            merchant_pin_code: String::new(),
        }
    }
}

impl PaymentFields {
    /// Fields with every member empty, including the currency
    pub fn empty() -> Self {
        Self {
            currency: String::new(),
            ..Self::default()
        }
    }

    /// Default fields with the given payee address
    pub fn with_payee(vpa: impl Into<String>) -> Self {
        Self {
            payee_vpa: vpa.into(),
            ..Self::default()
        }
    }

    /// Current value of a field
    pub fn get(&self, field: FieldName) -> &str {
        match field {
            FieldName::PayeeVpa => &self.payee_vpa,
            FieldName::PayeeName => &self.payee_name,
            FieldName::Amount => &self.amount,
            FieldName::Currency => &self.currency,
            FieldName::TransactionNote => &self.transaction_note,
            FieldName::MerchantCode => &self.merchant_code,
            FieldName::MinimumAmount => &self.minimum_amount,
            FieldName::MaximumAmount => &self.maximum_amount,
            FieldName::TransactionRef => &self.transaction_ref,
            FieldName::MerchantCategoryCode => &self.merchant_category_code,
            FieldName::MerchantCity => &self.merchant_city,
            FieldName::MerchantPinCode => &self.merchant_pin_code,
        }
    }

    fn slot_mut(&mut self, field: FieldName) -> &mut String {
        match field {
            FieldName::PayeeVpa => &mut self.payee_vpa,
            FieldName::PayeeName => &mut self.payee_name,
            FieldName::Amount => &mut self.amount,
            FieldName::Currency => &mut self.currency,
            FieldName::TransactionNote => &mut self.transaction_note,
            FieldName::MerchantCode => &mut self.merchant_code,
            FieldName::MinimumAmount => &mut self.minimum_amount,
            FieldName::MaximumAmount => &mut self.maximum_amount,
            FieldName::TransactionRef => &mut self.transaction_ref,
            FieldName::MerchantCategoryCode => &mut self.merchant_category_code,
            FieldName::MerchantCity => &mut self.merchant_city,
            FieldName::MerchantPinCode => &mut self.merchant_pin_code,
        }
    }

    /// Replace the value of a single field
    pub fn set(&mut self, field: FieldName, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    /// Iterate over `(field, value)` pairs in link order
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> + '_ {
        FieldName::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}

/// Holder for the in-progress payment form.
///
/// Accepts any string for any field; validation only happens when the form
/// is encoded.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    fields: PaymentFields,
}

impl FormState {
    /// Form with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Form preloaded with the given values
    pub fn from_fields(fields: PaymentFields) -> Self {
        Self { fields }
    }

    /// Replace exactly one field, leaving the others unchanged
    pub fn set(&mut self, field: FieldName, value: impl Into<String>) {
        self.fields.set(field, value);
    }

    /// Current values of every field
    pub fn get(&self) -> &PaymentFields {
        &self.fields
    }

    /// Consume the form and return its values
    pub fn into_fields(self) -> PaymentFields {
        self.fields
    }

    /// Loss of focus on a field: amount-class fields get the two-decimal
    /// display rule, everything else is left alone.
    pub fn blur(&mut self, field: FieldName) {
        if !field.is_amount() {
            return;
        }
        let slot = self.fields.slot_mut(field);
        if slot.is_empty() {
            return;
        }
        let formatted = normalize_amount(slot);
        if formatted != *slot {
            tracing::debug!(field = %field, from = %slot, to = %formatted, "normalized amount");
            *slot = formatted;
        }
    }

    /// Set a field and immediately apply [`FormState::blur`] to it
    pub fn commit(&mut self, field: FieldName, value: impl Into<String>) {
        self.set(field, value);
        self.blur(field);
    }

    /// Restore every field to its default value
    pub fn reset(&mut self) {
        self.fields = PaymentFields::default();
    }

    /// Encode the current values as a payment link
    pub fn encode(&self) -> Result<String> {
        encode_uri(&self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let fields = PaymentFields::default();
        assert_eq!(fields.currency, "INR");
        assert!(fields
            .iter()
            .filter(|(f, _)| *f != FieldName::Currency)
            .all(|(_, v)| v.is_empty()));
    }

    #[test]
    fn test_set_replaces_only_one_field() {
        let mut state = FormState::new();
        state.set(FieldName::PayeeName, "Asha");
        state.set(FieldName::MerchantCity, "Pune");
        state.set(FieldName::PayeeName, "Ravi");

        let fields = state.get();
        assert_eq!(fields.payee_name, "Ravi");
        assert_eq!(fields.merchant_city, "Pune");
        assert_eq!(fields.currency, "INR");
        assert_eq!(fields.payee_vpa, "");
    }

    #[test]
    fn test_set_accepts_malformed_values() {
        let mut state = FormState::new();
        state.set(FieldName::Amount, "twelve rupees");
        assert_eq!(state.get().amount, "twelve rupees");
    }

    #[test]
    fn test_blur_normalizes_amount_fields_only() {
        let mut state = FormState::new();
        state.set(FieldName::Amount, "5");
        state.set(FieldName::MinimumAmount, "1.5");
        state.set(FieldName::MaximumAmount, "10.");
        state.set(FieldName::MerchantPinCode, "411001");

        for field in FieldName::ALL {
            state.blur(field);
        }

        let fields = state.get();
        assert_eq!(fields.amount, "5.00");
        assert_eq!(fields.minimum_amount, "1.50");
        assert_eq!(fields.maximum_amount, "10.00");
        assert_eq!(fields.merchant_pin_code, "411001");
    }

    #[test]
    fn test_blur_leaves_empty_amount_empty() {
        let mut state = FormState::new();
        state.commit(FieldName::Amount, "");
        assert_eq!(state.get().amount, "");
    }

    #[test]
    fn test_reset() {
        let mut state = FormState::new();
        state.set(FieldName::Currency, "USD");
        state.set(FieldName::PayeeVpa, "x@y");
        state.reset();
        assert_eq!(state.get(), &PaymentFields::default());
    }

    #[test]
    fn test_field_name_parsing() {
        assert_eq!("payeeVPA".parse::<FieldName>().unwrap(), FieldName::PayeeVpa);
        assert_eq!("pa".parse::<FieldName>().unwrap(), FieldName::PayeeVpa);
        assert_eq!("payee-vpa".parse::<FieldName>().unwrap(), FieldName::PayeeVpa);
        assert_eq!("min-amount".parse::<FieldName>().unwrap(), FieldName::MinimumAmount);
        assert_eq!("MXAM".parse::<FieldName>().unwrap(), FieldName::MaximumAmount);
        assert_eq!(
            "merchant_pin_code".parse::<FieldName>().unwrap(),
            FieldName::MerchantPinCode
        );
        assert!(matches!(
            "iban".parse::<FieldName>(),
            Err(Error::UnknownField(name)) if name == "iban"
        ));
    }

    #[test]
    fn test_key_lookup() {
        for field in FieldName::ALL {
            assert_eq!(FieldName::from_key(field.key()), Some(field));
        }
        assert_eq!(FieldName::from_key("zz"), None);
    }

    #[test]
    fn test_amount_class() {
        let amounts: Vec<_> = FieldName::ALL.into_iter().filter(|f| f.is_amount()).collect();
        assert_eq!(
            amounts,
            vec![
                FieldName::Amount,
                FieldName::MinimumAmount,
                FieldName::MaximumAmount
            ]
        );
    }
}
