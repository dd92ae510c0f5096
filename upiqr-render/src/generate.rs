//! Form to image in one step

use thiserror::Error;
use upiqr_uri::{encode_uri, PaymentFields};

use crate::render::{QrOptions, Rasterizer, RenderedImage};

/// The two conditions a user can hit when generating a code.
///
/// Both leave the form editable; the user fixes the input or retries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// The payee address is empty, so nothing was encoded or rendered
    #[error("Payee VPA is required")]
    MissingRequiredField,

    /// The rasterizer failed; the cause is logged, not shown
    #[error("Failed to generate QR code. Please try again.")]
    RenderingFailed(String),
}

/// A payment link and its rendered code
#[derive(Debug, Clone)]
pub struct GeneratedCode {
    pub uri: String,
    pub image: RenderedImage,
}

/// Encode `fields` and render the resulting link
pub fn generate(
    fields: &PaymentFields,
    rasterizer: &dyn Rasterizer,
    options: &QrOptions,
) -> Result<GeneratedCode, GenerateError> {
    let uri = encode_uri(fields).map_err(|e| {
        tracing::debug!("encode rejected: {}", e);
        GenerateError::MissingRequiredField
    })?;

    let image = rasterizer.render(&uri, options).map_err(|e| {
        tracing::error!("QR code generation error: {}", e);
        GenerateError::RenderingFailed(e.to_string())
    })?;

    tracing::info!(format = %image.format, bytes = image.bytes.len(), "generated QR code");
    Ok(GeneratedCode { uri, image })
}
