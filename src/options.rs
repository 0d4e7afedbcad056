//! Caller-facing render options.
//!
//! Options arrive as a loose key/value map (usually JSON). The keys the
//! renderer understands are lifted into typed fields; everything else is kept
//! in [`RenderOptions::extra`] and forwarded to document export.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{PrinterError, Result};

const PX_PER_INCH: f64 = 96.0;
const CM_PER_INCH: f64 = 2.54;

/// Output requested by the caller, after `jpg` normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputKind {
    #[default]
    Pdf,
    Png,
    Jpeg,
    /// A type the renderer cannot capture. The raw value is kept for logging.
    Unrecognized(String),
}

impl OutputKind {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "pdf" => OutputKind::Pdf,
            "png" => OutputKind::Png,
            "jpg" | "jpeg" => OutputKind::Jpeg,
            _ => OutputKind::Unrecognized(raw.to_string()),
        }
    }

    /// File extension used for the destination path.
    pub fn extension(&self) -> String {
        match self {
            OutputKind::Pdf => "pdf".to_string(),
            OutputKind::Png => "png".to_string(),
            OutputKind::Jpeg => "jpeg".to_string(),
            OutputKind::Unrecognized(raw) => {
                let cleaned: String = raw
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_ascii_lowercase();
                if cleaned.is_empty() {
                    "bin".to_string()
                } else {
                    cleaned
                }
            }
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Unrecognized(raw) => write!(f, "{raw}"),
            other => write!(f, "{}", other.extension()),
        }
    }
}

/// A page length: bare numbers are CSS pixels, strings may carry `px`, `in`, `cm` or `mm`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Pixels(f64),
    Text(String),
}

impl Dimension {
    pub fn to_inches(&self) -> Result<f64> {
        match self {
            Dimension::Pixels(px) => Ok(px / PX_PER_INCH),
            Dimension::Text(text) => {
                let text = text.trim();
                let lower = text.to_ascii_lowercase();
                let (number, divisor) = if let Some(n) = lower.strip_suffix("px") {
                    (n, PX_PER_INCH)
                } else if let Some(n) = lower.strip_suffix("in") {
                    (n, 1.0)
                } else if let Some(n) = lower.strip_suffix("cm") {
                    (n, CM_PER_INCH)
                } else if let Some(n) = lower.strip_suffix("mm") {
                    (n, CM_PER_INCH * 10.0)
                } else {
                    (lower.as_str(), PX_PER_INCH)
                };
                let value: f64 = number.trim().parse().map_err(|_| {
                    PrinterError::invalid_options(format!("Invalid length: '{text}'"))
                })?;
                Ok(value / divisor)
            }
        }
    }

    /// Whole CSS pixels, rounded; used for viewports.
    pub fn to_pixels(&self) -> Result<u32> {
        let px = match self {
            Dimension::Pixels(px) => *px,
            Dimension::Text(_) => self.to_inches()? * PX_PER_INCH,
        };
        if !px.is_finite() || px < 0.0 {
            return Err(PrinterError::invalid_options(format!(
                "Invalid pixel size: {px}"
            )));
        }
        Ok(px.round() as u32)
    }

    /// Mirrors the "truthy" check callers rely on: zero and empty values count as absent.
    pub fn is_set(&self) -> bool {
        match self {
            Dimension::Pixels(px) => *px != 0.0 && !px.is_nan(),
            Dimension::Text(text) => !text.trim().is_empty(),
        }
    }
}

impl From<u32> for Dimension {
    fn from(px: u32) -> Self {
        Dimension::Pixels(f64::from(px))
    }
}

impl From<&str> for Dimension {
    fn from(text: &str) -> Self {
        Dimension::Text(text.to_string())
    }
}

/// Options accepted by [`crate::Printer::render_page`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// `pdf`, `png`, `jpg` or `jpeg`; defaults to `pdf`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
    /// Remaining keys, forwarded verbatim to document export.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from a JSON object such as `{"type": "png", "width": 1024}`.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(PrinterError::invalid_options(
                "render options must be a JSON object",
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.subdomain = Some(subdomain.into());
        self
    }

    pub fn with_size(mut self, width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self {
        self.width = Some(width.into());
        self.height = Some(height.into());
        self
    }

    pub fn with_width(mut self, width: impl Into<Dimension>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn with_height(mut self, height: impl Into<Dimension>) -> Self {
        self.height = Some(height.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn output_kind(&self) -> OutputKind {
        self.kind
            .as_deref()
            .map(OutputKind::parse)
            .unwrap_or_default()
    }

    pub(crate) fn width_set(&self) -> bool {
        self.width.as_ref().is_some_and(Dimension::is_set)
    }

    pub(crate) fn height_set(&self) -> bool {
        self.height.as_ref().is_some_and(Dimension::is_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn output_kind_defaults_to_pdf() {
        assert_eq!(RenderOptions::new().output_kind(), OutputKind::Pdf);
    }

    #[test]
    fn jpg_normalizes_to_jpeg() {
        let kind = OutputKind::parse("jpg");
        assert_eq!(kind, OutputKind::Jpeg);
        assert_eq!(kind.extension(), "jpeg");
        assert_eq!(OutputKind::parse("JPEG"), OutputKind::Jpeg);
    }

    #[test]
    fn unrecognized_kind_keeps_raw_value_and_sanitizes_extension() {
        let kind = OutputKind::parse("../bmp");
        assert_eq!(kind, OutputKind::Unrecognized("../bmp".to_string()));
        assert_eq!(kind.extension(), "bmp");
        assert_eq!(kind.to_string(), "../bmp");
        assert_eq!(OutputKind::parse("..").extension(), "bin");
    }

    #[test]
    fn from_value_splits_known_and_extra_keys() {
        let opts = RenderOptions::from_value(json!({
            "type": "png",
            "secure": true,
            "subdomain": "acme",
            "width": 1024,
            "height": "768px",
            "landscape": true,
            "margin": {"top": "2cm"}
        }))
        .unwrap();

        assert_eq!(opts.output_kind(), OutputKind::Png);
        assert!(opts.secure);
        assert_eq!(opts.subdomain.as_deref(), Some("acme"));
        assert_eq!(opts.width, Some(Dimension::Pixels(1024.0)));
        assert_eq!(opts.height, Some(Dimension::Text("768px".to_string())));
        assert_eq!(opts.extra.len(), 2);
        assert_eq!(opts.extra["landscape"], json!(true));
    }

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(RenderOptions::from_value(json!(["pdf"])).is_err());
    }

    #[test]
    fn dimension_units_convert_to_inches() {
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        assert!(close(Dimension::Pixels(96.0).to_inches().unwrap(), 1.0));
        assert!(close(Dimension::from("8.5in").to_inches().unwrap(), 8.5));
        assert!(close(Dimension::from("2.54cm").to_inches().unwrap(), 1.0));
        assert!(close(Dimension::from("25.4mm").to_inches().unwrap(), 1.0));
        assert!(close(Dimension::from("192").to_inches().unwrap(), 2.0));
        assert!(Dimension::from("wide").to_inches().is_err());
    }

    #[test]
    fn dimension_to_pixels_rounds() {
        assert_eq!(Dimension::from("1in").to_pixels().unwrap(), 96);
        assert_eq!(Dimension::Pixels(1023.6).to_pixels().unwrap(), 1024);
        assert!(Dimension::Pixels(-5.0).to_pixels().is_err());
    }

    #[test]
    fn zero_dimensions_are_not_set() {
        let opts = RenderOptions::new().with_size(0u32, "");
        assert!(!opts.width_set());
        assert!(!opts.height_set());
    }
}
