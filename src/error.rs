use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum PrinterError {
    #[error("Failed to prepare artifact directory {}: {source}", .path.display())]
    ArtifactDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Print error for {url} (type {kind}): {message}")]
    Print {
        url: String,
        kind: String,
        message: String,
    },

    #[error("Unsupported output type '{0}' (expected pdf, png, jpg or jpeg)")]
    UnsupportedFormat(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Invalid page path '{0}': it must stay on the configured host")]
    ForeignPath(String),

    #[error("Invalid render options: {0}")]
    InvalidOptions(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PrinterError {
    pub fn browser(message: impl Into<String>) -> Self {
        PrinterError::Browser(message.into())
    }

    pub fn invalid_options(message: impl Into<String>) -> Self {
        PrinterError::InvalidOptions(message.into())
    }

    /// Wraps a navigation or capture failure with the request context.
    pub fn print(url: impl Into<String>, kind: impl Into<String>, cause: &PrinterError) -> Self {
        PrinterError::Print {
            url: url.into(),
            kind: kind.into(),
            message: cause.to_string(),
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            PrinterError::ArtifactDir { .. } => ErrorPayload::new(
                ErrorCategory::Config,
                self.to_string(),
                "Check that the artifact directory (artifact_dir / --artifact-dir) is writable.",
            ),
            PrinterError::Launch(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("could not auto detect") || lower.contains("executable") {
                    ErrorPayload::new(
                        ErrorCategory::Browser,
                        self.to_string(),
                        "Install Chromium/Chrome or point browser.executable (PRINTER_CHROME_PATH) at the binary.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Browser,
                        self.to_string(),
                        "Check the browser launch args in the [browser] config section; run with --verbose for details.",
                    )
                }
            }
            PrinterError::Print { message, .. } => {
                let lower = message.to_ascii_lowercase();
                if lower.contains("timeout") || lower.contains("timed out") {
                    ErrorPayload::new(
                        ErrorCategory::Capture,
                        self.to_string(),
                        "The page did not settle in time; raise browser.request_timeout or check the page for hanging requests.",
                    )
                } else if lower.contains("paper format") {
                    ErrorPayload::new(
                        ErrorCategory::Capture,
                        self.to_string(),
                        "Use a known format (Letter, Legal, Tabloid, Ledger, A0-A6) or pass explicit width and height.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Capture,
                        self.to_string(),
                        "Verify the page renders at the composed URL and that base_host is reachable.",
                    )
                }
            }
            PrinterError::UnsupportedFormat(_) => ErrorPayload::new(
                ErrorCategory::Config,
                self.to_string(),
                "Use --type pdf, png, jpg or jpeg.",
            ),
            PrinterError::InvalidUrl(_) | PrinterError::ForeignPath(_) => ErrorPayload::new(
                ErrorCategory::Config,
                self.to_string(),
                "Pass a root-relative path such as /report?id=5 and a bare base_host (e.g., app.example.com).",
            ),
            PrinterError::InvalidOptions(_) | PrinterError::Serialization(_) => {
                ErrorPayload::new(
                    ErrorCategory::Config,
                    self.to_string(),
                    "Check option values; --option expects KEY=JSON (e.g., landscape=true).",
                )
            }
            PrinterError::Browser(_) => ErrorPayload::new(
                ErrorCategory::Browser,
                self.to_string(),
                "Re-run with --verbose; the browser process may have exited unexpectedly.",
            ),
            PrinterError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            PrinterError::Config(msg) => ErrorPayload::new(
                ErrorCategory::Config,
                msg.to_string(),
                "Check the config file and PRINTER_* environment variables.",
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, PrinterError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Browser,
    Capture,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
