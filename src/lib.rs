//! Printer Library
//!
//! Renders root-relative application pages to PDF, PNG or JPEG files by
//! driving a headless Chromium per request.
//!
//! # Module Overview
//!
//! - [`compose`] - print-flagged URL composition
//! - [`planner`] - destination path and output kind planning
//! - [`pdf`] - PDF export defaults and option negotiation
//! - [`browser`] - browser sessions, network-idle navigation, capture
//! - [`printer`] - the `render_page` operation
//! - [`config`] - configuration file and environment support
//!
//! # Example
//!
//! ```no_run
//! use printer_lib::{Config, Printer, RenderOptions};
//!
//! # async fn example() -> printer_lib::Result<()> {
//! let config = Config {
//!     base_host: "app.example.com".to_string(),
//!     ..Config::default()
//! };
//! let printer = Printer::new(config)?;
//! let pdf = printer.render_page("/report?id=5", &RenderOptions::new()).await?;
//! println!("PDF written to {}", pdf.display());
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod compose;
pub mod config;
pub mod error;
pub mod options;
pub mod pdf;
pub mod planner;
pub mod printer;
pub mod viewport;

pub use browser::{
    BrowserDriver, BrowserManager, BrowserPage, BrowserSession, ChromiumDriver, ImageFormat,
};
pub use compose::{compose_url, PRINT_MARKER};
pub use config::{BrowserLaunchConfig, Config, NetworkIdleConfig};
pub use error::{ErrorCategory, ErrorPayload, PrinterError, Result};
pub use options::{Dimension, OutputKind, RenderOptions};
pub use pdf::{PdfExportOptions, PdfMargin};
pub use planner::OutputPlan;
pub use printer::{Printer, RenderedArtifact};
pub use viewport::Viewport;
