//! Capture History - bounded store of captured screen regions
//!
//! This library keeps recently captured regions and, optionally, a
//! run-length compressed copy of their pixels under a count budget and a
//! memory budget.

// Configuration constants
pub mod config;

// Logging and persisted settings
pub mod logging;
pub mod settings;
pub mod settings_io;

// Pixel buffers and the snapshot codec
pub mod codec;
pub mod image;

// History store and capture backend seam
pub mod capture;
pub mod history;

// Re-export commonly used types
pub use capture::{CaptureError, CaptureRect, CaptureSession, RegionCapture};
pub use codec::{compress, decompress, CompressedImage};
pub use history::{CaptureHistory, HistoryEntry, HistoryId, HistoryStats};
pub use image::{Image, PixelFormat};
pub use settings::HistorySettings;
