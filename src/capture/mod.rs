// capture/mod.rs - Capture Backend Seam and Session
//
// Platform capture backends live outside this crate. They plug in through
// `RegionCapture`, and `CaptureSession` ties a backend to the history store.

mod session;

pub use session::{CaptureError, CaptureSession};

use serde::{Deserialize, Serialize};

use crate::image::Image;

/// Screen region to capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rect with no area cannot be captured
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Trait for platform-specific region capture backends
///
/// One implementation exists per target platform; the owning application
/// selects it once at startup.
pub trait RegionCapture: Send {
    /// Capture the pixels currently on screen inside `rect`
    fn capture_region(&mut self, rect: CaptureRect) -> anyhow::Result<Image>;
}

impl<T: RegionCapture + ?Sized> RegionCapture for Box<T> {
    fn capture_region(&mut self, rect: CaptureRect) -> anyhow::Result<Image> {
        (**self).capture_region(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_rect() {
        assert!(CaptureRect::new(0, 0, 0, 10).is_empty());
        assert!(CaptureRect::new(0, 0, 10, 0).is_empty());
        assert!(!CaptureRect::new(-5, -5, 1, 1).is_empty());
    }
}
