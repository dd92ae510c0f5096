//! Tool configuration.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use upiqr_render::{
    parse_hex_color, DEFAULT_DARK, DEFAULT_LIGHT, DEFAULT_MARGIN, DEFAULT_WIDTH,
};
use upiqr_uri::DEFAULT_CURRENCY;

/// Defaults for rendering and saving codes, overridable per command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolsConfig {
    /// Target PNG width in pixels.
    pub width: u32,
    /// Quiet zone in modules.
    pub margin: u32,
    /// Dark module colour.
    pub dark: String,
    /// Light module colour.
    pub light: String,
    /// Directory saved codes are written to.
    pub out_dir: PathBuf,
    /// Currency a new form starts with.
    pub currency: String,
    /// Command that receives the saved file path when sharing.
    pub share_command: Option<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            margin: DEFAULT_MARGIN,
            dark: DEFAULT_DARK.to_string(),
            light: DEFAULT_LIGHT.to_string(),
            out_dir: PathBuf::from("."),
            currency: DEFAULT_CURRENCY.to_string(),
            share_command: None,
        }
    }
}

impl ToolsConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let width: u32 = lookup("UPIQR_WIDTH")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.width);

        let margin: u32 = lookup("UPIQR_MARGIN")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.margin);

        let dark = lookup("UPIQR_DARK").unwrap_or(defaults.dark);
        parse_hex_color(&dark).context("UPIQR_DARK must be a #RRGGBB colour")?;

        let light = lookup("UPIQR_LIGHT").unwrap_or(defaults.light);
        parse_hex_color(&light).context("UPIQR_LIGHT must be a #RRGGBB colour")?;

        let out_dir = lookup("UPIQR_OUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.out_dir);

        let currency = lookup("UPIQR_CURRENCY").unwrap_or(defaults.currency);

        let share_command = lookup("UPIQR_SHARE_CMD").filter(|s| !s.trim().is_empty());

        Ok(Self {
            width,
            margin,
            dark,
            light,
            out_dir,
            currency,
            share_command,
        })
    }
}
