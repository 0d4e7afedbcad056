//! Seams between the renderer and the headless browser.
//!
//! One render launches one [`BrowserSession`] and opens one [`BrowserPage`]
//! in it. [`super::ChromiumDriver`] is the production implementation; tests
//! plug in recording fakes.

use std::path::Path;

use async_trait::async_trait;

use crate::config::{BrowserLaunchConfig, NetworkIdleConfig};
use crate::pdf::PdfExportOptions;
use crate::{Result, Viewport};

/// Image encodings a page can snapshot to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Starts a fresh browser process. Errors are launch failures.
    async fn launch(&self, config: &BrowserLaunchConfig) -> Result<Box<dyn BrowserSession>>;
}

#[async_trait]
pub trait BrowserSession: Send {
    async fn new_page(&mut self) -> Result<Box<dyn BrowserPage>>;

    /// Terminates the browser process and releases its resources.
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait BrowserPage: Send {
    /// Navigates and returns once the network has been idle for the configured window.
    async fn goto(&mut self, url: &str, idle: &NetworkIdleConfig) -> Result<()>;

    async fn pdf(&mut self, options: &PdfExportOptions, path: &Path) -> Result<()>;

    async fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Writes a full-page snapshot to `path`.
    async fn screenshot(&mut self, format: ImageFormat, path: &Path) -> Result<()>;
}
