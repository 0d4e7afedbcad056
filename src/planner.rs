//! Output planning: destination path, output kind and capture options.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::options::{OutputKind, RenderOptions};
use crate::{PrinterError, Result};

static LAST_STAMP: AtomicU64 = AtomicU64::new(0);

/// Where and how a single render writes its artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPlan {
    pub destination: PathBuf,
    pub kind: OutputKind,
    /// Caller options with `secure` and `subdomain` consumed.
    pub capture: RenderOptions,
}

/// Millisecond timestamp, bumped past the previous one so names never repeat within the process.
pub fn next_stamp() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let previous = LAST_STAMP
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(previous + 1)
}

pub fn plan_output(artifact_root: &Path, options: &RenderOptions) -> OutputPlan {
    plan_output_with_stamp(artifact_root, options, next_stamp())
}

pub fn plan_output_with_stamp(
    artifact_root: &Path,
    options: &RenderOptions,
    stamp: u64,
) -> OutputPlan {
    let kind = options.output_kind();
    let destination = artifact_root.join(format!("{stamp}.{}", kind.extension()));

    let mut capture = options.clone();
    capture.secure = false;
    capture.subdomain = None;

    OutputPlan {
        destination,
        kind,
        capture,
    }
}

/// Creates the destination's parent directory (recursively) if missing.
pub async fn ensure_artifact_dir(destination: &Path) -> Result<()> {
    let Some(dir) = destination.parent() else {
        return Ok(());
    };
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| PrinterError::ArtifactDir {
            path: dir.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_is_pdf_named_by_stamp() {
        let plan =
            plan_output_with_stamp(Path::new("/tmp/art"), &RenderOptions::new(), 1_700_000_000_123);
        assert_eq!(plan.kind, OutputKind::Pdf);
        assert_eq!(
            plan.destination,
            PathBuf::from("/tmp/art/1700000000123.pdf")
        );
    }

    #[test]
    fn jpg_plan_uses_jpeg_extension() {
        let opts = RenderOptions::new().with_type("jpg");
        let plan = plan_output_with_stamp(Path::new("/tmp/art"), &opts, 7);
        assert_eq!(plan.kind, OutputKind::Jpeg);
        assert_eq!(plan.destination, PathBuf::from("/tmp/art/7.jpeg"));
    }

    #[test]
    fn routing_options_are_stripped_from_capture_options() {
        let opts = RenderOptions::new()
            .secure(true)
            .with_subdomain("acme")
            .with_option("landscape", true);
        let plan = plan_output_with_stamp(Path::new("/tmp"), &opts, 1);
        assert!(!plan.capture.secure);
        assert!(plan.capture.subdomain.is_none());
        assert_eq!(plan.capture.extra["landscape"], serde_json::json!(true));
    }

    #[test]
    fn unrecognized_type_still_gets_a_destination() {
        let opts = RenderOptions::new().with_type("bmp");
        let plan = plan_output_with_stamp(Path::new("/tmp"), &opts, 9);
        assert_eq!(plan.kind, OutputKind::Unrecognized("bmp".to_string()));
        assert_eq!(plan.destination, PathBuf::from("/tmp/9.bmp"));
    }

    #[test]
    fn stamps_are_strictly_increasing() {
        let stamps: Vec<u64> = (0..50).map(|_| next_stamp()).collect();
        assert!(stamps.windows(2).all(|w| w[1] > w[0]), "{stamps:?}");
    }

    #[tokio::test]
    async fn ensure_artifact_dir_creates_nested_dirs() {
        let root = tempfile::tempdir().unwrap();
        let destination = root.path().join("a/b/c/1.pdf");
        ensure_artifact_dir(&destination).await.unwrap();
        assert!(root.path().join("a/b/c").is_dir());
    }

    #[tokio::test]
    async fn ensure_artifact_dir_reports_blocked_path() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let err = ensure_artifact_dir(&blocker.join("sub/1.pdf"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, PrinterError::ArtifactDir { ref path, .. } if path.ends_with("file/sub")),
            "got {err:?}"
        );
    }
}
