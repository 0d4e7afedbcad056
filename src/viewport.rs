use serde::{Deserialize, Serialize};

/// Width used when an image capture asks for a viewport without a usable width.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 800;
/// Height used when an image capture asks for a viewport without a usable height.
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl Viewport {
    /// Builds a viewport from optional pixel sizes; missing or zero sides use the defaults.
    pub fn with_fallback(width: Option<u32>, height: Option<u32>) -> Self {
        Self {
            width: width
                .filter(|w| *w > 0)
                .unwrap_or(DEFAULT_VIEWPORT_WIDTH),
            height: height
                .filter(|h| *h > 0)
                .unwrap_or(DEFAULT_VIEWPORT_HEIGHT),
        }
    }
}
