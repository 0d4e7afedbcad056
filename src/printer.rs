//! The render operation: compose, plan, launch, capture, always close.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error};

use crate::browser::{capture, BrowserDriver, BrowserManager, CaptureOutcome, ChromiumDriver};
use crate::compose::compose_url;
use crate::config::Config;
use crate::options::{OutputKind, RenderOptions};
use crate::planner::{ensure_artifact_dir, plan_output};
use crate::{PrinterError, Result};

/// Result of a render call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArtifact {
    pub path: PathBuf,
    pub kind: OutputKind,
    pub url: String,
    /// False when the type was unrecognized and nothing was captured.
    pub written: bool,
}

/// Renders application pages to files. Configuration is fixed at construction.
pub struct Printer {
    config: Arc<Config>,
    artifact_root: PathBuf,
    manager: BrowserManager,
}

impl Printer {
    /// Creates a printer backed by headless Chromium.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_driver(config, Arc::new(ChromiumDriver))
    }

    pub fn with_driver(config: Config, driver: Arc<dyn BrowserDriver>) -> Result<Self> {
        config.validate()?;
        let artifact_root = config.artifact_root()?;
        let manager = BrowserManager::new(
            driver,
            config.browser.clone(),
            config.max_concurrent_sessions,
        );
        Ok(Self {
            config: Arc::new(config),
            artifact_root,
            manager,
        })
    }

    /// Renders `relative_path` and returns where the artifact was written.
    ///
    /// For an unrecognized `type` (and `strict_formats` off) the call still
    /// succeeds and returns a path that was never written.
    pub async fn render_page(&self, relative_path: &str, options: &RenderOptions) -> Result<PathBuf> {
        self.render(relative_path, options)
            .await
            .map(|artifact| artifact.path)
    }

    pub async fn render(
        &self,
        relative_path: &str,
        options: &RenderOptions,
    ) -> Result<RenderedArtifact> {
        debug!(relative_path, ?options, "render params in");

        let url = compose_url(
            relative_path,
            options.secure,
            options.subdomain.as_deref(),
            &self.config.base_host,
        )?;
        let plan = plan_output(&self.artifact_root, options);
        debug!(url = %url, kind = %plan.kind, path = %plan.destination.display(), "planned render");

        if let OutputKind::Unrecognized(raw) = &plan.kind {
            if self.config.strict_formats {
                error!(kind = %raw, url = %url, "unrecognized file type for printing");
                return Err(PrinterError::UnsupportedFormat(raw.clone()));
            }
        }

        ensure_artifact_dir(&plan.destination).await?;

        let mut session = self.manager.launch().await?;
        let outcome = capture(
            session.session_mut(),
            url.as_str(),
            &plan,
            &self.config.network_idle,
        )
        .await;
        session.close().await;

        match outcome {
            Ok(outcome) => Ok(RenderedArtifact {
                path: plan.destination,
                kind: plan.kind,
                url: url.to_string(),
                written: outcome == CaptureOutcome::Written,
            }),
            Err(err) => {
                error!(url = %url, kind = %plan.kind, error = %err, "render failed");
                Err(PrinterError::print(url.as_str(), plan.kind.to_string(), &err))
            }
        }
    }
}
