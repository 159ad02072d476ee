//! Capture History Configuration Constants
//!
//! Centralized configuration for budgets, codec limits, and logging defaults.

/// History Budget Configuration
pub mod history {
    /// Default maximum number of retained history entries
    pub const DEFAULT_MAX_COUNT: usize = 50;

    /// Default ceiling for the sum of compressed payload sizes (128 MiB)
    pub const DEFAULT_MAX_MEMORY_BYTES: usize = 128 * 1024 * 1024;

    /// First identifier handed out by a fresh store
    pub const FIRST_ID: u32 = 1;
}

/// Pixel Buffer Configuration
pub mod image {
    /// Every supported pixel layout is 4 bytes per pixel
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Upper bound for a single pixel buffer (256 MiB)
    pub const MAX_IMAGE_BYTES: usize = 256 * 1024 * 1024;
}

/// Run-Length Codec Configuration
pub mod codec {
    /// Longest literal run a single record can carry (tag 0..=127)
    pub const MAX_LITERAL_RUN: usize = 128;

    /// Shortest run worth a repeat record (break-even point)
    pub const MIN_REPEAT_RUN: usize = 3;

    /// Longest run a single repeat record can carry (tag 128..=255)
    pub const MAX_REPEAT_RUN: usize = 130;

    /// Tags at or above this value are repeat records
    pub const REPEAT_TAG_BASE: u8 = 128;
}

/// Logging Configuration
pub mod logging {
    /// Application directory name used for log and settings locations
    pub const APP_DIR_NAME: &str = "CaptureHistory";

    /// Base name of the rolling log file
    pub const LOG_FILE_NAME: &str = "capture_history.log";

    /// Log retention period in days
    pub const LOG_RETENTION_DAYS: u32 = 30;
}
