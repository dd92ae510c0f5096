//! Two-decimal display rule for amount fields
//!
//! The rule only pads: it never rounds, never truncates and never rejects
//! input. Values with more than two fractional digits, or that are not
//! numbers at all, pass through.

use crate::FieldName;

/// Format an amount string with exactly two fractional digits.
///
/// Empty input is returned unchanged. A single trailing `.00` or `.0` is
/// stripped first so that already-formatted values are stable.
pub fn normalize_amount(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let clean = value
        .strip_suffix(".00")
        .or_else(|| value.strip_suffix(".0"))
        .unwrap_or(value);

    let Some(fraction) = clean.split('.').nth(1) else {
        return format!("{}.00", clean);
    };

    // fraction length in UTF-16 units, as browsers measure it
    match fraction.encode_utf16().count() {
        0 => format!("{}00", clean),
        1 => format!("{}0", clean),
        _ => clean.to_string(),
    }
}

/// Whether the two-decimal rule applies to `field`
pub fn is_amount_field(field: FieldName) -> bool {
    field.is_amount()
}
