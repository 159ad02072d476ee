//! Capture session: one backend plus one history store
//!
//! This is the owning context for a `CaptureHistory`. Both the backend and
//! the history sit behind their own mutex, so a session can be shared
//! across threads with `Arc`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use super::{CaptureRect, RegionCapture};
use crate::history::{CaptureHistory, HistoryEntry, HistoryId, HistoryStats};
use crate::image::Image;
use crate::settings::HistorySettings;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("region width and height must be positive")]
    InvalidRegion,
    #[error("no capture history")]
    HistoryEmpty,
    #[error("history entry {0} not found")]
    EntryNotFound(HistoryId),
    #[error("region capture failed")]
    CaptureFailed(#[source] anyhow::Error),
}

pub struct CaptureSession<B: RegionCapture> {
    backend: Mutex<B>,
    history: Mutex<CaptureHistory>,
    store_images: AtomicBool,
}

impl<B: RegionCapture> CaptureSession<B> {
    pub fn new(backend: B) -> Self {
        Self::with_store(backend, CaptureHistory::new())
    }

    /// Build a session around an existing history store
    pub fn with_store(backend: B, history: CaptureHistory) -> Self {
        Self {
            backend: Mutex::new(backend),
            history: Mutex::new(history),
            store_images: AtomicBool::new(true),
        }
    }

    /// Build a session whose budgets and storage mode come from settings
    pub fn from_settings(backend: B, settings: &HistorySettings) -> Self {
        let session = Self::new(backend);
        session.apply_settings(settings);
        session
    }

    fn history(&self) -> MutexGuard<'_, CaptureHistory> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn grab(&self, rect: CaptureRect) -> Result<Image, CaptureError> {
        self.backend
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .capture_region(rect)
            .map_err(CaptureError::CaptureFailed)
    }

    /// Capture `rect`, record it in history and hand the pixels back
    pub fn capture_region(&self, rect: CaptureRect) -> Result<Image, CaptureError> {
        if rect.is_empty() {
            return Err(CaptureError::InvalidRegion);
        }

        tracing::debug!(
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "Capturing region"
        );
        let image = self.grab(rect)?;

        let snapshot = self.stores_images().then_some(&image);
        let id = self.history().record(rect, snapshot);

        tracing::info!(id = id.0, width = rect.width, height = rect.height, "Region captured");
        Ok(image)
    }

    /// Pixels for a past capture, from the stored snapshot or the screen
    pub fn recapture(&self, id: HistoryId) -> Result<Image, CaptureError> {
        let entry = {
            let history = self.history();
            let entry = *history.find_by_id(id).ok_or(CaptureError::EntryNotFound(id))?;
            if let Some(image) = history.get_image_by_id(id) {
                return Ok(image);
            }
            entry
        };
        self.recapture_from_screen(&entry)
    }

    /// Pixels for the newest capture
    pub fn recapture_last(&self) -> Result<Image, CaptureError> {
        let entry = {
            let history = self.history();
            let entry = *history.latest().ok_or(CaptureError::HistoryEmpty)?;
            if let Some(image) = history.get_image_by_id(entry.id) {
                return Ok(image);
            }
            entry
        };
        self.recapture_from_screen(&entry)
    }

    fn recapture_from_screen(&self, entry: &HistoryEntry) -> Result<Image, CaptureError> {
        tracing::debug!(id = entry.id.0, "No stored snapshot, recapturing from screen");
        self.grab(entry.region())
    }

    pub fn history_count(&self) -> usize {
        self.history().count()
    }

    pub fn history_entry(&self, index: usize) -> Option<HistoryEntry> {
        self.history().get_entry(index).copied()
    }

    pub fn history_clear(&self) {
        self.history().clear();
    }

    pub fn set_max_count(&self, max_count: usize) {
        self.history().set_max_count(max_count);
    }

    pub fn set_max_memory_bytes(&self, max_memory_bytes: usize) {
        self.history().set_max_memory_bytes(max_memory_bytes);
    }

    /// Whether new captures keep a pixel snapshot
    pub fn stores_images(&self) -> bool {
        self.store_images.load(Ordering::Relaxed)
    }

    /// Toggle snapshot storage for future captures (existing ones stay)
    pub fn set_store_images(&self, store_images: bool) {
        self.store_images.store(store_images, Ordering::Relaxed);
    }

    pub fn apply_settings(&self, settings: &HistorySettings) {
        self.set_store_images(settings.store_images);
        self.history().apply_settings(settings);
    }

    pub fn stats(&self) -> HistoryStats {
        self.history().stats()
    }

    /// Run `f` with the history locked
    pub fn with_history<R>(&self, f: impl FnOnce(&CaptureHistory) -> R) -> R {
        f(&self.history())
    }
}
