use serde::{Deserialize, Serialize};

use crate::config;
use crate::logging::LogLevel;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistorySettings {
    // Budgets
    #[serde(default = "default_max_count")]
    pub max_count: usize,
    #[serde(default = "default_max_memory_bytes")]
    pub max_memory_bytes: usize,

    // Keep pixel snapshots alongside region metadata
    #[serde(default = "default_store_images")]
    pub store_images: bool,

    // Logging
    #[serde(default = "default_log_level")]
    pub log_level: String, // "Off", "Error", "Warn", "Info", "Debug", "Trace"
    #[serde(default = "default_log_to_file")]
    pub log_to_file: bool,
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u32,
}

// Default functions for serde
fn default_max_count() -> usize {
    config::history::DEFAULT_MAX_COUNT
}

fn default_max_memory_bytes() -> usize {
    config::history::DEFAULT_MAX_MEMORY_BYTES
}

fn default_store_images() -> bool {
    true
}

fn default_log_level() -> String {
    "Error".to_string() // Default: only errors
}

fn default_log_to_file() -> bool {
    false
}

fn default_log_retention_days() -> u32 {
    config::logging::LOG_RETENTION_DAYS
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_count: default_max_count(),
            max_memory_bytes: default_max_memory_bytes(),
            store_images: default_store_images(),
            log_level: default_log_level(),
            log_to_file: default_log_to_file(),
            log_retention_days: default_log_retention_days(),
        }
    }
}

impl HistorySettings {
    /// Replace values the store would reject with their defaults
    pub fn normalized(mut self) -> Self {
        if self.max_count == 0 {
            self.max_count = default_max_count();
        }
        if self.parsed_log_level().is_none() {
            self.log_level = default_log_level();
        }
        self
    }

    pub fn parsed_log_level(&self) -> Option<LogLevel> {
        self.log_level.parse().ok()
    }
}
