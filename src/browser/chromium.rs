//! Chromium driver built on chromiumoxide (Chrome DevTools Protocol).

use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, PrintToPdfParams};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::stream;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::debug;

use super::driver::{BrowserDriver, BrowserPage, BrowserSession, ImageFormat};
use super::network_idle::{wait_for_network_idle, RequestEvent};
use crate::config::{BrowserLaunchConfig, NetworkIdleConfig};
use crate::pdf::{PdfExportOptions, ResolvedPdf};
use crate::{PrinterError, Result, Viewport};

#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumDriver;

fn cdp_error(context: &'static str) -> impl Fn(CdpError) -> PrinterError {
    move |err| PrinterError::browser(format!("{context}: {err}"))
}

fn browser_config(config: &BrowserLaunchConfig) -> Result<BrowserConfig> {
    let mut builder = BrowserConfig::builder()
        .no_sandbox()
        .request_timeout(config.request_timeout)
        .args(config.launch_args());
    if !config.headless {
        builder = builder.with_head();
    }
    if let Some(executable) = &config.executable {
        builder = builder.chrome_executable(executable);
    }
    if let Some(dir) = &config.user_data_dir {
        builder = builder.user_data_dir(dir);
    }
    builder.build().map_err(PrinterError::Launch)
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn launch(&self, config: &BrowserLaunchConfig) -> Result<Box<dyn BrowserSession>> {
        let (browser, mut handler) = Browser::launch(browser_config(config)?)
            .await
            .map_err(|e| PrinterError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(error = %err, "browser handler error");
                }
            }
        });

        Ok(Box::new(ChromiumSession {
            browser,
            handler_task,
            closed: false,
        }))
    }
}

/// A running Chromium process. Dropping it without `close` kills the process.
pub struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    closed: bool,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn new_page(&mut self) -> Result<Box<dyn BrowserPage>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(cdp_error("failed to open page"))?;
        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let closed = shutdown(&mut self.browser).await;
        self.handler_task.abort();
        closed
    }
}

/// The steps of tearing a browser process down.
#[async_trait]
trait BrowserProcess: Send {
    /// Asks the browser to exit over CDP.
    async fn close(&mut self) -> Result<()>;
    async fn kill(&mut self);
    /// Reaps the exited process.
    async fn wait(&mut self);
}

#[async_trait]
impl BrowserProcess for Browser {
    async fn close(&mut self) -> Result<()> {
        Browser::close(self)
            .await
            .map(|_| ())
            .map_err(cdp_error("failed to close browser"))
    }

    async fn kill(&mut self) {
        if let Some(Err(err)) = Browser::kill(self).await {
            debug!(error = %err, "failed to kill browser process");
        }
    }

    async fn wait(&mut self) {
        if let Err(err) = Browser::wait(self).await {
            debug!(error = %err, "failed to reap browser process");
        }
    }
}

/// Closes gracefully, killing the process first when the CDP close fails so
/// the final `wait` cannot hang on a browser that is still running.
async fn shutdown<P: BrowserProcess + ?Sized>(process: &mut P) -> Result<()> {
    let closed = process.close().await;
    if let Err(err) = &closed {
        debug!(error = %err, "graceful close failed, killing browser process");
        process.kill().await;
    }
    process.wait().await;
    closed
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

pub struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn goto(&mut self, url: &str, idle: &NetworkIdleConfig) -> Result<()> {
        // Subscribe before navigating so the first requests are seen.
        let sent = self
            .page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(cdp_error("failed to watch requests"))?
            .map(|e| RequestEvent::Sent(e.request_id.inner().clone()));
        let finished = self
            .page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(cdp_error("failed to watch requests"))?
            .map(|e| RequestEvent::Finished(e.request_id.inner().clone()));
        let failed = self
            .page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(cdp_error("failed to watch requests"))?
            .map(|e| RequestEvent::Finished(e.request_id.inner().clone()));

        self.page
            .goto(url)
            .await
            .map_err(cdp_error("navigation failed"))?;

        let events = stream::select(sent, stream::select(finished, failed));
        wait_for_network_idle(events, idle.window).await;
        Ok(())
    }

    async fn pdf(&mut self, options: &PdfExportOptions, path: &Path) -> Result<()> {
        let params = print_params(&options.resolve()?);
        let bytes = self
            .page
            .pdf(params)
            .await
            .map_err(cdp_error("PDF export failed"))?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    async fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        let params = SetDeviceMetricsOverrideParams::new(
            i64::from(viewport.width),
            i64::from(viewport.height),
            1.0,
            false,
        );
        self.page
            .execute(params)
            .await
            .map_err(cdp_error("failed to set viewport"))?;
        Ok(())
    }

    async fn screenshot(&mut self, format: ImageFormat, path: &Path) -> Result<()> {
        let format = match format {
            ImageFormat::Png => CaptureScreenshotFormat::Png,
            ImageFormat::Jpeg => CaptureScreenshotFormat::Jpeg,
        };
        let params = ScreenshotParams::builder()
            .format(format)
            .full_page(true)
            .build();
        let bytes = self
            .page
            .screenshot(params)
            .await
            .map_err(cdp_error("screenshot failed"))?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}

fn print_params(pdf: &ResolvedPdf) -> PrintToPdfParams {
    let mut builder = PrintToPdfParams::builder()
        .landscape(pdf.landscape)
        .display_header_footer(pdf.display_header_footer)
        .print_background(pdf.print_background)
        .scale(pdf.scale)
        .paper_width(pdf.paper_width)
        .paper_height(pdf.paper_height)
        .margin_top(pdf.margin_top)
        .margin_bottom(pdf.margin_bottom)
        .margin_left(pdf.margin_left)
        .margin_right(pdf.margin_right)
        .prefer_css_page_size(pdf.prefer_css_page_size);
    if let Some(header) = &pdf.header_template {
        builder = builder.header_template(header.clone());
    }
    if let Some(footer) = &pdf.footer_template {
        builder = builder.footer_template(footer.clone());
    }
    if let Some(ranges) = &pdf.page_ranges {
        builder = builder.page_ranges(ranges.clone());
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingProcess {
        close_fails: bool,
        steps: Vec<&'static str>,
    }

    #[async_trait]
    impl BrowserProcess for RecordingProcess {
        async fn close(&mut self) -> Result<()> {
            self.steps.push("close");
            if self.close_fails {
                return Err(PrinterError::browser("failed to close browser: channel closed"));
            }
            Ok(())
        }

        async fn kill(&mut self) {
            self.steps.push("kill");
        }

        async fn wait(&mut self) {
            self.steps.push("wait");
        }
    }

    #[tokio::test]
    async fn shutdown_reaps_after_graceful_close() {
        let mut process = RecordingProcess::default();
        shutdown(&mut process).await.unwrap();
        assert_eq!(process.steps, vec!["close", "wait"]);
    }

    #[tokio::test]
    async fn shutdown_kills_before_reaping_when_close_fails() {
        let mut process = RecordingProcess {
            close_fails: true,
            ..RecordingProcess::default()
        };
        let err = shutdown(&mut process).await.unwrap_err();
        assert!(err.to_string().contains("channel closed"));
        assert_eq!(process.steps, vec!["close", "kill", "wait"]);
    }

    #[test]
    fn print_params_carry_resolved_values() {
        let resolved = PdfExportOptions::negotiate(&crate::RenderOptions::new())
            .unwrap()
            .resolve()
            .unwrap();
        let params = print_params(&resolved);
        assert_eq!(params.paper_width, Some(8.5));
        assert_eq!(params.paper_height, Some(11.0));
        assert_eq!(params.scale, Some(1.0));
        assert_eq!(params.print_background, Some(true));
        assert!(params.header_template.is_none());
        assert!(params.page_ranges.is_none());
    }

    #[tokio::test]
    async fn launch_fails_for_missing_binary() {
        let config = BrowserLaunchConfig {
            executable: Some(PathBuf::from("/definitely/not/chromium")),
            ..BrowserLaunchConfig::default()
        };
        let result = ChromiumDriver.launch(&config).await;
        assert!(matches!(result, Err(PrinterError::Launch(_))));
    }
}
