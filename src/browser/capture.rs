//! Navigate-then-capture for a single render.

use tracing::{debug, error};

use super::driver::{BrowserPage, BrowserSession, ImageFormat};
use crate::config::NetworkIdleConfig;
use crate::options::{Dimension, OutputKind, RenderOptions};
use crate::pdf::PdfExportOptions;
use crate::planner::OutputPlan;
use crate::{Result, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Written,
    /// The page was loaded but the output type is not capturable; nothing was written.
    Skipped,
}

/// Opens one page, waits for network idle at `url`, then writes the planned artifact.
pub async fn capture(
    session: &mut dyn BrowserSession,
    url: &str,
    plan: &OutputPlan,
    idle: &NetworkIdleConfig,
) -> Result<CaptureOutcome> {
    let mut page = session.new_page().await?;
    page.goto(url, idle).await?;

    match &plan.kind {
        OutputKind::Pdf => {
            let options = PdfExportOptions::negotiate(&plan.capture)?;
            debug!(?options, path = %plan.destination.display(), "exporting PDF");
            page.pdf(&options, &plan.destination).await?;
        }
        OutputKind::Png => snapshot(page.as_mut(), plan, ImageFormat::Png).await?,
        OutputKind::Jpeg => snapshot(page.as_mut(), plan, ImageFormat::Jpeg).await?,
        OutputKind::Unrecognized(raw) => {
            error!(kind = %raw, url, "unrecognized file type for printing");
            return Ok(CaptureOutcome::Skipped);
        }
    }

    Ok(CaptureOutcome::Written)
}

async fn snapshot(
    page: &mut dyn BrowserPage,
    plan: &OutputPlan,
    format: ImageFormat,
) -> Result<()> {
    if let Some(viewport) = requested_viewport(&plan.capture)? {
        page.set_viewport(viewport).await?;
    }
    page.screenshot(format, &plan.destination).await
}

/// Viewport for image captures; `None` when the caller set neither width nor height.
pub fn requested_viewport(options: &RenderOptions) -> Result<Option<Viewport>> {
    if !options.width_set() && !options.height_set() {
        return Ok(None);
    }
    let pixels = |d: &Option<Dimension>| -> Result<Option<u32>> {
        match d {
            Some(d) if d.is_set() => d.to_pixels().map(Some),
            _ => Ok(None),
        }
    };
    Ok(Some(Viewport::with_fallback(
        pixels(&options.width)?,
        pixels(&options.height)?,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan_output;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    type Shots = Arc<Mutex<Vec<(ImageFormat, PathBuf)>>>;

    struct ShotSession(Shots);
    struct ShotPage(Shots);

    #[async_trait]
    impl BrowserSession for ShotSession {
        async fn new_page(&mut self) -> Result<Box<dyn BrowserPage>> {
            Ok(Box::new(ShotPage(self.0.clone())))
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl BrowserPage for ShotPage {
        async fn goto(&mut self, _url: &str, _idle: &NetworkIdleConfig) -> Result<()> {
            Ok(())
        }

        async fn pdf(&mut self, _options: &PdfExportOptions, _path: &Path) -> Result<()> {
            Ok(())
        }

        async fn set_viewport(&mut self, _viewport: Viewport) -> Result<()> {
            Ok(())
        }

        async fn screenshot(&mut self, format: ImageFormat, path: &Path) -> Result<()> {
            self.0.lock().unwrap().push((format, path.to_path_buf()));
            Ok(())
        }
    }

    async fn capture_type(kind: &str) -> (CaptureOutcome, Vec<(ImageFormat, PathBuf)>, PathBuf) {
        let shots = Shots::default();
        let mut session = ShotSession(shots.clone());
        let plan = plan_output(Path::new("/artifacts"), &RenderOptions::new().with_type(kind));
        let idle = NetworkIdleConfig::default();
        let outcome = capture(&mut session, "http://localhost/x", &plan, &idle)
            .await
            .unwrap();
        let taken = shots.lock().unwrap().clone();
        (outcome, taken, plan.destination)
    }

    #[tokio::test]
    async fn written_images_always_take_exactly_one_snapshot() {
        let cases = [
            ("png", ImageFormat::Png),
            ("jpg", ImageFormat::Jpeg),
            ("JPEG", ImageFormat::Jpeg),
        ];
        for (kind, format) in cases {
            let (outcome, shots, destination) = capture_type(kind).await;
            assert_eq!(outcome, CaptureOutcome::Written, "{kind}");
            assert_eq!(shots, vec![(format, destination)], "{kind}");
        }
    }

    #[tokio::test]
    async fn unrecognized_type_is_skipped_without_snapshot() {
        let (outcome, shots, _) = capture_type("gif").await;
        assert_eq!(outcome, CaptureOutcome::Skipped);
        assert!(shots.is_empty());
    }

    #[test]
    fn no_viewport_without_dimensions() {
        assert_eq!(requested_viewport(&RenderOptions::new()).unwrap(), None);
    }

    #[test]
    fn viewport_uses_provided_dimensions() {
        let opts = RenderOptions::new().with_size(1024u32, 768u32);
        assert_eq!(
            requested_viewport(&opts).unwrap(),
            Some(Viewport {
                width: 1024,
                height: 768
            })
        );
    }

    #[test]
    fn viewport_defaults_missing_side() {
        let opts = RenderOptions::new().with_height("300px");
        assert_eq!(
            requested_viewport(&opts).unwrap(),
            Some(Viewport {
                width: 800,
                height: 300
            })
        );
    }

    #[test]
    fn viewport_rejects_bad_lengths() {
        let opts = RenderOptions::new().with_width("wide");
        assert!(requested_viewport(&opts).is_err());
    }
}
