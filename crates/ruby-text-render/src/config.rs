//! Loading [`RubyStyle`] from JSON configuration.

use std::path::Path;

use ruby_text::RubyStyle;

/// Style configuration could not be loaded.
#[derive(Debug)]
pub enum StyleLoadError {
    /// Reading the configuration file failed.
    Io(std::io::Error),
    /// The configuration was not valid style JSON.
    Json(serde_json::Error),
}

impl core::fmt::Display for StyleLoadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "style config read failed: {}", err),
            Self::Json(err) => write!(f, "style config parse failed: {}", err),
        }
    }
}

impl std::error::Error for StyleLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StyleLoadError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StyleLoadError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Parse a (possibly partial) JSON style. Missing fields take their defaults
/// and invalid values are repaired.
pub fn style_from_json(json: &str) -> Result<RubyStyle, StyleLoadError> {
    let style: RubyStyle = serde_json::from_str(json)?;
    Ok(style.sanitized())
}

/// Read and parse a JSON style file.
pub fn load_style_file(path: impl AsRef<Path>) -> Result<RubyStyle, StyleLoadError> {
    let raw = std::fs::read_to_string(path)?;
    style_from_json(&raw)
}

pub fn style_to_json(style: &RubyStyle) -> Result<String, StyleLoadError> {
    Ok(serde_json::to_string_pretty(style)?)
}
