//! # upiqr-render: QR codes for UPI payment links
//!
//! Turns a filled payment form into a scannable image and hands the image
//! to the user, either as a saved file or through a share program.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use upiqr_render::{generate, download, QrOptions, QrRasterizer};
//! use upiqr_uri::PaymentFields;
//!
//! let fields = PaymentFields::with_payee("merchant@bank");
//! let code = generate(&fields, &QrRasterizer, &QrOptions::default())?;
//! println!("{}", code.uri);
//! let path = download(&code.image, std::path::Path::new("."))?;
//! ```
//!
//! ## Failure model
//!
//! [`generate`] fails in exactly two ways, both recoverable: the payee
//! address is missing, or the image could not be rendered. The form stays
//! usable after either.

pub mod export;
pub mod generate;
pub mod render;

pub use export::{
    download, file_name, share_or_download, CommandShare, NoShare, ShareOutcome, ShareTarget,
    DEFAULT_FILE_STEM,
};
pub use generate::{generate, GenerateError, GeneratedCode};
pub use render::{
    parse_hex_color, QrFormat, QrOptions, QrRasterizer, Rasterizer, RenderError, RenderedImage,
    MAX_IMAGE_SIZE,
};

/// Default image width in pixels
pub const DEFAULT_WIDTH: u32 = 300;

/// Default quiet zone around the code, in modules
pub const DEFAULT_MARGIN: u32 = 2;

/// Default colour of dark modules
pub const DEFAULT_DARK: &str = "#000000";

/// Default colour of light modules and the margin
pub const DEFAULT_LIGHT: &str = "#FFFFFF";
