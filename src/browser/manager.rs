//! Browser session management.
//!
//! `BrowserManager` launches one isolated browser per render. Renders run
//! side by side; an optional semaphore caps how many browsers are alive at
//! once when `max_concurrent_sessions` is configured. A launched browser is handed out as an
//! [`ActiveSession`], whose `close` consumes it, so every session is closed at
//! most once; sessions dropped without `close` are torn down by the driver.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

use super::driver::{BrowserDriver, BrowserSession};
use crate::config::BrowserLaunchConfig;
use crate::{PrinterError, Result};

#[derive(Clone)]
pub struct BrowserManager {
    driver: Arc<dyn BrowserDriver>,
    options: BrowserLaunchConfig,
    semaphore: Option<Arc<Semaphore>>,
}

/// A launched browser, holding its concurrency permit until closed.
pub struct ActiveSession {
    session: Box<dyn BrowserSession>,
    _permit: Option<OwnedSemaphorePermit>,
}

impl BrowserManager {
    pub fn new(
        driver: Arc<dyn BrowserDriver>,
        options: BrowserLaunchConfig,
        max_concurrent_sessions: Option<usize>,
    ) -> Self {
        Self {
            driver,
            options,
            semaphore: max_concurrent_sessions.map(|n| Arc::new(Semaphore::new(n.max(1)))),
        }
    }

    /// Launches a fresh browser. Launch failures are not retried.
    pub async fn launch(&self) -> Result<ActiveSession> {
        let permit = match &self.semaphore {
            Some(semaphore) => Some(
                semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|_| PrinterError::Launch("Browser manager unavailable".to_string()))?,
            ),
            None => None,
        };

        debug!(
            args = ?self.options.launch_args(),
            executable = ?self.options.executable,
            headless = self.options.headless,
            "launching browser"
        );
        let session = self.driver.launch(&self.options).await.map_err(|err| match err {
            PrinterError::Launch(_) => err,
            other => PrinterError::Launch(other.to_string()),
        })?;

        Ok(ActiveSession {
            session,
            _permit: permit,
        })
    }
}

impl ActiveSession {
    pub fn session_mut(&mut self) -> &mut dyn BrowserSession {
        self.session.as_mut()
    }

    /// Closes the browser. Close failures are logged, never raised.
    pub async fn close(mut self) {
        if let Err(err) = self.session.close().await {
            warn!(error = %err, "failed to close browser session");
        }
    }
}
