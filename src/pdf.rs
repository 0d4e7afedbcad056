//! Document export option negotiation.
//!
//! Defaults are expressed as the same loose key/value map callers use, so the
//! merge is a plain "caller wins" overlay. The merged map is then read into
//! [`PdfExportOptions`] and resolved to absolute inches by [`PdfExportOptions::resolve`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::options::{Dimension, RenderOptions};
use crate::{PrinterError, Result};

pub const DEFAULT_FORMAT: &str = "Letter";
pub const DEFAULT_MARGIN: &str = "1cm";

const MIN_SCALE: f64 = 0.1;
const MAX_SCALE: f64 = 2.0;

/// Named paper sizes in inches (width, height).
const PAPER_FORMATS: &[(&str, f64, f64)] = &[
    ("letter", 8.5, 11.0),
    ("legal", 8.5, 14.0),
    ("tabloid", 11.0, 17.0),
    ("ledger", 17.0, 11.0),
    ("a0", 33.1, 46.8),
    ("a1", 23.4, 33.1),
    ("a2", 16.54, 23.4),
    ("a3", 11.7, 16.54),
    ("a4", 8.27, 11.7),
    ("a5", 5.83, 8.27),
    ("a6", 4.13, 5.83),
];

pub fn paper_format(name: &str) -> Option<(f64, f64)> {
    let name = name.trim().to_ascii_lowercase();
    PAPER_FORMATS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, w, h)| (*w, *h))
}

pub fn default_pdf_options() -> Map<String, Value> {
    let defaults = json!({
        "format": DEFAULT_FORMAT,
        "scale": 1,
        "printBackground": true,
        "margin": {
            "top": DEFAULT_MARGIN,
            "bottom": DEFAULT_MARGIN,
            "left": DEFAULT_MARGIN,
            "right": DEFAULT_MARGIN
        }
    });
    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Overlays the caller's capture options on the export defaults.
///
/// When both `width` and `height` are set the default `format` is dropped so
/// the explicit size applies. The overlay is shallow: a caller `margin`
/// replaces the default margin object.
pub fn merge_pdf_options(capture: &RenderOptions) -> Map<String, Value> {
    let mut merged = default_pdf_options();
    if capture.width_set() && capture.height_set() {
        merged.remove("format");
    }

    for (key, dimension) in [("width", &capture.width), ("height", &capture.height)] {
        if let Some(dimension) = dimension {
            if let Ok(value) = serde_json::to_value(dimension) {
                merged.insert(key.to_string(), value);
            }
        }
    }

    for (key, value) in &capture.extra {
        if key == "path" {
            warn!(path = %value, "ignoring caller supplied export path");
            continue;
        }
        merged.insert(key.clone(), value.clone());
    }
    merged
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfMargin {
    pub top: Option<Dimension>,
    pub right: Option<Dimension>,
    pub bottom: Option<Dimension>,
    pub left: Option<Dimension>,
}

/// Export options after negotiation, still in caller units.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfExportOptions {
    pub format: Option<String>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub scale: Option<f64>,
    pub print_background: Option<bool>,
    pub landscape: Option<bool>,
    pub display_header_footer: Option<bool>,
    pub header_template: Option<String>,
    pub footer_template: Option<String>,
    pub page_ranges: Option<String>,
    #[serde(rename = "preferCSSPageSize")]
    pub prefer_css_page_size: Option<bool>,
    pub margin: Option<PdfMargin>,
    /// Keys the exporter does not understand.
    #[serde(flatten)]
    pub ignored: Map<String, Value>,
}

/// Export settings in absolute units, ready for the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPdf {
    pub paper_width: f64,
    pub paper_height: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub scale: f64,
    pub print_background: bool,
    pub landscape: bool,
    pub display_header_footer: bool,
    pub header_template: Option<String>,
    pub footer_template: Option<String>,
    pub page_ranges: Option<String>,
    pub prefer_css_page_size: bool,
}

impl PdfExportOptions {
    pub fn negotiate(capture: &RenderOptions) -> Result<Self> {
        let merged = merge_pdf_options(capture);
        let options: PdfExportOptions = serde_json::from_value(Value::Object(merged))
            .map_err(|e| PrinterError::invalid_options(format!("Invalid PDF options: {e}")))?;
        if !options.ignored.is_empty() {
            let keys: Vec<&str> = options.ignored.keys().map(String::as_str).collect();
            warn!(?keys, "ignoring unsupported PDF options");
        }
        Ok(options)
    }

    pub fn resolve(&self) -> Result<ResolvedPdf> {
        let (paper_width, paper_height) = match &self.format {
            Some(name) => paper_format(name).ok_or_else(|| {
                PrinterError::invalid_options(format!("Unknown paper format: {name}"))
            })?,
            None => {
                let (letter_w, letter_h) = (8.5, 11.0);
                (
                    inches_or(self.width.as_ref(), letter_w)?,
                    inches_or(self.height.as_ref(), letter_h)?,
                )
            }
        };

        let scale = self.scale.unwrap_or(1.0);
        if !(MIN_SCALE..=MAX_SCALE).contains(&scale) {
            return Err(PrinterError::invalid_options(format!(
                "PDF scale must be between {MIN_SCALE} and {MAX_SCALE}, got {scale}"
            )));
        }

        let margin = self.margin.clone().unwrap_or_default();
        Ok(ResolvedPdf {
            paper_width,
            paper_height,
            margin_top: inches_or(margin.top.as_ref(), 0.0)?,
            margin_right: inches_or(margin.right.as_ref(), 0.0)?,
            margin_bottom: inches_or(margin.bottom.as_ref(), 0.0)?,
            margin_left: inches_or(margin.left.as_ref(), 0.0)?,
            scale,
            print_background: self.print_background.unwrap_or(false),
            landscape: self.landscape.unwrap_or(false),
            display_header_footer: self.display_header_footer.unwrap_or(false),
            header_template: self.header_template.clone(),
            footer_template: self.footer_template.clone(),
            page_ranges: self.page_ranges.clone().filter(|r| !r.trim().is_empty()),
            prefer_css_page_size: self.prefer_css_page_size.unwrap_or(false),
        })
    }
}

fn inches_or(dimension: Option<&Dimension>, fallback: f64) -> Result<f64> {
    match dimension {
        Some(d) if d.is_set() => d.to_inches(),
        _ => Ok(fallback),
    }
}
