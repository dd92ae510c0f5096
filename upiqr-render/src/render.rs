//! QR code rasterization
//!
//! The rasterizer is a seam: [`generate`](crate::generate) only needs
//! something that turns text into image bytes, so tests and alternative
//! backends can plug in their own [`Rasterizer`].

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{ImageBuffer, ImageEncoder, Rgb};
use qrcode::QrCode;
use std::str::FromStr;
use thiserror::Error;

use crate::{DEFAULT_DARK, DEFAULT_LIGHT, DEFAULT_MARGIN, DEFAULT_WIDTH};

/// Largest image side, in pixels, the rasterizer will produce
pub const MAX_IMAGE_SIZE: u32 = 8192;

/// Errors raised while turning text into an image
#[derive(Debug, Error)]
pub enum RenderError {
    /// The data does not fit in any QR code version
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),

    /// A colour that is not `#RRGGBB`
    #[error("Invalid colour: {0}")]
    InvalidColor(String),

    /// Rendering options that cannot produce an image
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// QR code output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrFormat {
    /// PNG image bytes
    #[default]
    Png,
    /// SVG document
    Svg,
    /// Unicode art for terminal display
    Terminal,
}

impl QrFormat {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            QrFormat::Png => "png",
            QrFormat::Svg => "svg",
            QrFormat::Terminal => "terminal",
        }
    }

    /// Extension used when the image is saved
    pub fn file_extension(&self) -> &'static str {
        match self {
            QrFormat::Png => "png",
            QrFormat::Svg => "svg",
            QrFormat::Terminal => "txt",
        }
    }

    /// MIME type for data URIs
    pub fn mime_type(&self) -> &'static str {
        match self {
            QrFormat::Png => "image/png",
            QrFormat::Svg => "image/svg+xml",
            QrFormat::Terminal => "text/plain",
        }
    }
}

impl FromStr for QrFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(QrFormat::Png),
            "svg" => Ok(QrFormat::Svg),
            "terminal" | "term" | "text" => Ok(QrFormat::Terminal),
            other => Err(RenderError::InvalidOptions(format!(
                "unknown format: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for QrFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Options for QR code generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrOptions {
    /// Target image width in pixels (PNG and SVG)
    pub width: u32,
    /// Quiet zone (margin) in modules
    pub margin: u32,
    /// Dark module colour (hex, e.g. "#000000")
    pub dark: String,
    /// Light module and margin colour (hex, e.g. "#FFFFFF")
    pub light: String,
    /// Output format
    pub format: QrFormat,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            margin: DEFAULT_MARGIN,
            dark: DEFAULT_DARK.to_string(),
            light: DEFAULT_LIGHT.to_string(),
            format: QrFormat::Png,
        }
    }
}

impl QrOptions {
    /// Create options for PNG output
    pub fn png(width: u32) -> Self {
        Self {
            width,
            format: QrFormat::Png,
            ..Self::default()
        }
    }

    /// Create options for SVG output
    pub fn svg() -> Self {
        Self {
            format: QrFormat::Svg,
            ..Self::default()
        }
    }

    /// Create options for terminal output
    pub fn terminal() -> Self {
        Self {
            format: QrFormat::Terminal,
            ..Self::default()
        }
    }
}

/// A rendered code together with its format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub format: QrFormat,
    pub bytes: Vec<u8>,
}

impl RenderedImage {
    /// Base64 data URI suitable for embedding in HTML
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }

    /// The image as text, for SVG and terminal output
    pub fn as_text(&self) -> Option<&str> {
        match self.format {
            QrFormat::Png => None,
            QrFormat::Svg | QrFormat::Terminal => std::str::from_utf8(&self.bytes).ok(),
        }
    }
}

/// Turns encoded text into an image
pub trait Rasterizer {
    fn render(&self, data: &str, options: &QrOptions) -> Result<RenderedImage, RenderError>;
}

/// [`Rasterizer`] backed by the `qrcode` and `image` crates
#[derive(Debug, Clone, Copy, Default)]
pub struct QrRasterizer;

impl Rasterizer for QrRasterizer {
    fn render(&self, data: &str, options: &QrOptions) -> Result<RenderedImage, RenderError> {
        let code = QrCode::new(data.as_bytes())?;
        tracing::debug!(
            modules = code.width(),
            format = %options.format,
            "rendering QR code"
        );

        let bytes = match options.format {
            QrFormat::Png => generate_png(&code, options)?,
            QrFormat::Svg => generate_svg(&code, options)?.into_bytes(),
            QrFormat::Terminal => generate_terminal(&code).into_bytes(),
        };

        Ok(RenderedImage {
            format: options.format,
            bytes,
        })
    }
}

/// Parse `#RRGGBB` (leading `#` optional) into RGB components
pub fn parse_hex_color(color: &str) -> Result<[u8; 3], RenderError> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RenderError::InvalidColor(color.to_string()));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| RenderError::InvalidColor(color.to_string()))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// Pixel size of one module and of the whole image for a code that is
/// `modules` wide.
fn layout(modules: u32, options: &QrOptions) -> Result<(u32, u32), RenderError> {
    check_width(options)?;
    let total = options
        .margin
        .checked_mul(2)
        .and_then(|m| m.checked_add(modules))
        .filter(|total| *total <= MAX_IMAGE_SIZE)
        .ok_or_else(|| {
            RenderError::InvalidOptions(format!(
                "margin of {} modules does not fit in {} pixels",
                options.margin, MAX_IMAGE_SIZE
            ))
        })?;
    let scale = (options.width / total).max(1);
    Ok((scale, scale * total))
}

fn check_width(options: &QrOptions) -> Result<(), RenderError> {
    if options.width == 0 {
        return Err(RenderError::InvalidOptions("width must be positive".to_string()));
    }
    if options.width > MAX_IMAGE_SIZE {
        return Err(RenderError::InvalidOptions(format!(
            "width {} exceeds {} pixels",
            options.width, MAX_IMAGE_SIZE
        )));
    }
    Ok(())
}

fn css_color(color: &str) -> Result<String, RenderError> {
    let [r, g, b] = parse_hex_color(color)?;
    Ok(format!("#{:02X}{:02X}{:02X}", r, g, b))
}

fn generate_png(code: &QrCode, options: &QrOptions) -> Result<Vec<u8>, RenderError> {
    let dark = Rgb(parse_hex_color(&options.dark)?);
    let light = Rgb(parse_hex_color(&options.light)?);

    let modules = code.width() as u32;
    let (scale, size) = layout(modules, options)?;
    let colors = code.to_colors();
    let margin = options.margin;

    let image = ImageBuffer::from_fn(size, size, |x, y| {
        let (mx, my) = (x / scale, y / scale);
        let inside = (margin..margin + modules).contains(&mx)
            && (margin..margin + modules).contains(&my);
        if !inside {
            return light;
        }
        let index = ((my - margin) * modules + (mx - margin)) as usize;
        match colors[index] {
            qrcode::Color::Dark => dark,
            qrcode::Color::Light => light,
        }
    });

    let mut bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgb8,
    )?;

    Ok(bytes)
}

fn generate_svg(code: &QrCode, options: &QrOptions) -> Result<String, RenderError> {
    check_width(options)?;
    let dark = css_color(&options.dark)?;
    let light = css_color(&options.light)?;

    Ok(code
        .render::<qrcode::render::svg::Color<'_>>()
        .quiet_zone(options.margin > 0)
        .min_dimensions(options.width, options.width)
        .dark_color(qrcode::render::svg::Color(&dark))
        .light_color(qrcode::render::svg::Color(&light))
        .build())
}

fn generate_terminal(code: &QrCode) -> String {
    code.render::<char>()
        .quiet_zone(true)
        .module_dimensions(2, 1)
        .build()
}
