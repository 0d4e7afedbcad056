use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{PrinterError, Result};

pub const ENV_BASE_HOST: &str = "PRINTER_BASE_HOST";
pub const ENV_ARTIFACT_DIR: &str = "PRINTER_ARTIFACT_DIR";
pub const ENV_CHROME_PATH: &str = "PRINTER_CHROME_PATH";

/// Launch args that are always passed. Only internal, same-application pages
/// are rendered, so the Chromium sandbox is disabled.
pub const SANDBOX_ARGS: [&str; 2] = ["--no-sandbox", "--disable-setuid-sandbox"];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host component of rendered URLs, e.g. `app.example.com` or `localhost:3000`.
    pub base_host: String,
    /// Directory that receives rendered artifacts.
    pub artifact_dir: PathBuf,
    /// Reject unknown output types instead of returning an unwritten path.
    pub strict_formats: bool,
    /// Upper bound on simultaneously running browsers. `None` lets every
    /// call launch immediately.
    pub max_concurrent_sessions: Option<usize>,
    pub browser: BrowserLaunchConfig,
    pub network_idle: NetworkIdleConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserLaunchConfig {
    pub executable: Option<PathBuf>,
    pub headless: bool,
    /// Extra Chromium args, appended after [`SANDBOX_ARGS`].
    pub args: Vec<String>,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub user_data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkIdleConfig {
    /// Quiet period with no in-flight requests that counts as idle.
    #[serde(with = "humantime_serde")]
    pub window: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_host: "localhost".to_string(),
            artifact_dir: PathBuf::from(".tmp/img"),
            strict_formats: false,
            max_concurrent_sessions: None,
            browser: BrowserLaunchConfig::default(),
            network_idle: NetworkIdleConfig::default(),
        }
    }
}

impl Default for BrowserLaunchConfig {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            args: Vec::new(),
            request_timeout: Duration::from_secs(30),
            user_data_dir: None,
        }
    }
}

impl Default for NetworkIdleConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(500),
        }
    }
}

impl BrowserLaunchConfig {
    /// Full argument list handed to the browser process.
    pub fn launch_args(&self) -> Vec<String> {
        SANDBOX_ARGS
            .iter()
            .map(|arg| arg.to_string())
            .chain(
                self.args
                    .iter()
                    .filter(|arg| !SANDBOX_ARGS.contains(&arg.as_str()))
                    .cloned(),
            )
            .collect()
    }
}

impl Config {
    /// Reads a TOML config file, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    PrinterError::Config(format!(
                        "Failed to read config {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::from_toml(&raw).map_err(|e| match e {
                    PrinterError::Config(msg) => {
                        PrinterError::Config(format!("{} ({})", msg, path.display()))
                    }
                    other => other,
                })
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| PrinterError::Config(format!("Invalid config: {e}")))
    }

    /// Applies `PRINTER_*` environment overrides on top of file/default values.
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(host) = non_empty(ENV_BASE_HOST) {
            self.base_host = host.trim().to_string();
        }
        if let Some(dir) = non_empty(ENV_ARTIFACT_DIR) {
            self.artifact_dir = PathBuf::from(dir);
        }
        if let Some(chrome) = non_empty(ENV_CHROME_PATH) {
            self.browser.executable = Some(PathBuf::from(chrome));
        }
    }

    pub fn validate(&self) -> Result<()> {
        let host = self.base_host.trim();
        if host.is_empty() {
            return Err(PrinterError::Config("base_host must not be empty".to_string()));
        }
        if host.contains("://") || host.contains('/') {
            return Err(PrinterError::Config(format!(
                "base_host must be a bare host (got '{host}'); the protocol is chosen per request"
            )));
        }
        if self.network_idle.window.is_zero() {
            return Err(PrinterError::Config(
                "network_idle.window must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Artifact directory as an absolute path.
    pub fn artifact_root(&self) -> Result<PathBuf> {
        if self.artifact_dir.is_absolute() {
            Ok(self.artifact_dir.clone())
        } else {
            Ok(std::env::current_dir()?.join(&self.artifact_dir))
        }
    }
}
