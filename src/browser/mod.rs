//! Headless browser sessions and page capture.
//!
//! # Module Structure
//!
//! - [`driver`] - `BrowserDriver` / `BrowserSession` / `BrowserPage` traits
//! - [`chromium`] - chromiumoxide implementation of the driver traits
//! - [`manager`] - per-render session launch and close with concurrency limiting
//! - [`capture`] - navigation plus PDF export or image snapshot
//! - [`network_idle`] - in-flight request tracking for the network-idle wait
//!
//! # Example
//!
//! ```no_run
//! use printer_lib::{Config, Printer, RenderOptions};
//!
//! # async fn example() -> printer_lib::Result<()> {
//! let printer = Printer::new(Config::default())?;
//! let png = printer
//!     .render_page("/shot", &RenderOptions::new().with_type("png").with_size(1024u32, 768u32))
//!     .await?;
//! println!("Screenshot saved to {:?}", png);
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod chromium;
pub mod driver;
pub mod manager;
pub mod network_idle;

pub use capture::{capture, requested_viewport, CaptureOutcome};
pub use chromium::ChromiumDriver;
pub use driver::{BrowserDriver, BrowserPage, BrowserSession, ImageFormat};
pub use manager::{ActiveSession, BrowserManager};
