//! Capture history store
//!
//! Keeps a bounded, newest-first list of captured regions. Each entry may
//! own a compressed pixel snapshot. Two budgets apply:
//! - a count budget that drops whole entries, oldest first
//! - a memory budget on compressed bytes that drops only snapshots, oldest
//!   first, so the region can still be recaptured from its coordinates
//!
//! Eviction order depends on insertion order only. Reads never promote.

use std::collections::{HashMap, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::capture::CaptureRect;
use crate::codec::CompressedImage;
use crate::config::history::{DEFAULT_MAX_COUNT, DEFAULT_MAX_MEMORY_BYTES, FIRST_ID};
use crate::image::Image;
use crate::settings::HistorySettings;

/// Unique identifier of a history entry, never reused within a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HistoryId(pub u32);

impl std::fmt::Display for HistoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Region metadata for one capture (no pixels)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: HistoryId,
    pub region_x: i32,
    pub region_y: i32,
    pub region_width: u32,
    pub region_height: u32,
    /// Unix epoch seconds at insertion
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn region(&self) -> CaptureRect {
        CaptureRect::new(
            self.region_x,
            self.region_y,
            self.region_width,
            self.region_height,
        )
    }
}

/// Point-in-time usage figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub entries: usize,
    pub images: usize,
    pub compressed_bytes: usize,
    pub raw_bytes: usize,
    pub max_count: usize,
    pub max_memory_bytes: usize,
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Bounded history of captured regions with optional compressed snapshots
///
/// Not internally synchronized: wrap in a `Mutex` (see
/// [`CaptureSession`](crate::capture::CaptureSession)) for shared access.
#[derive(Debug)]
pub struct CaptureHistory {
    /// Newest first
    entries: VecDeque<HistoryEntry>,
    /// Ids here are always a subset of `entries`
    images: HashMap<HistoryId, CompressedImage>,
    /// Sum of `compressed_len()` over `images`
    total_bytes: usize,
    max_count: usize,
    max_memory_bytes: usize,
    next_id: u32,
}

impl Default for CaptureHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureHistory {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_COUNT, DEFAULT_MAX_MEMORY_BYTES)
    }

    /// Create a store with explicit budgets (a zero count keeps the default)
    pub fn with_limits(max_count: usize, max_memory_bytes: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            images: HashMap::new(),
            total_bytes: 0,
            max_count: if max_count > 0 {
                max_count
            } else {
                DEFAULT_MAX_COUNT
            },
            max_memory_bytes,
            next_id: FIRST_ID,
        }
    }

    /// Record a captured region, optionally with its pixels
    ///
    /// The image is compressed on the way in; the caller keeps ownership
    /// of the original buffer. Both budgets are enforced before returning.
    pub fn record(&mut self, region: CaptureRect, image: Option<&Image>) -> HistoryId {
        let id = HistoryId(self.next_id);
        self.next_id += 1;

        self.entries.push_front(HistoryEntry {
            id,
            region_x: region.x,
            region_y: region.y,
            region_width: region.width,
            region_height: region.height,
            timestamp: unix_now(),
        });

        if let Some(image) = image {
            let packed = CompressedImage::encode(image);
            tracing::debug!(
                id = id.0,
                raw_bytes = packed.raw_size,
                compressed_bytes = packed.compressed_len(),
                "Stored history snapshot"
            );
            self.total_bytes += packed.compressed_len();
            self.images.insert(id, packed);
        }

        self.trim_to_count();
        self.trim_to_memory();
        id
    }

    /// Number of live entries (with or without images)
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by reverse-chronological index (0 = newest)
    pub fn get_entry(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn find_by_id(&self, id: HistoryId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries, newest first
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Decompress the stored snapshot for `id` into a fresh image
    ///
    /// `None` means the id is unknown, the snapshot was evicted (or never
    /// supplied), or the destination could not be allocated. Callers
    /// recapture from the entry's region in that case.
    pub fn get_image_by_id(&self, id: HistoryId) -> Option<Image> {
        self.images.get(&id)?.decode()
    }

    pub fn has_image(&self, id: HistoryId) -> bool {
        self.images.contains_key(&id)
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Running total of compressed snapshot bytes
    pub fn compressed_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    pub fn max_memory_bytes(&self) -> usize {
        self.max_memory_bytes
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            entries: self.entries.len(),
            images: self.images.len(),
            compressed_bytes: self.total_bytes,
            raw_bytes: self.images.values().map(|img| img.raw_size).sum(),
            max_count: self.max_count,
            max_memory_bytes: self.max_memory_bytes,
        }
    }

    /// Drop every entry and snapshot; the id sequence keeps counting
    pub fn clear(&mut self) {
        tracing::debug!(
            entries = self.entries.len(),
            images = self.images.len(),
            "Clearing capture history"
        );
        self.entries.clear();
        self.images.clear();
        self.total_bytes = 0;
    }

    /// Update the count budget; zero is ignored
    pub fn set_max_count(&mut self, max_count: usize) {
        if max_count == 0 {
            tracing::debug!("Ignoring zero history count budget");
            return;
        }
        self.max_count = max_count;
        self.trim_to_count();
    }

    pub fn set_max_memory_bytes(&mut self, max_memory_bytes: usize) {
        self.max_memory_bytes = max_memory_bytes;
        self.trim_to_memory();
    }

    /// Apply both budgets from user settings
    pub fn apply_settings(&mut self, settings: &HistorySettings) {
        tracing::info!(
            max_count = settings.max_count,
            max_memory_bytes = settings.max_memory_bytes,
            "Applying history budgets"
        );
        self.set_max_count(settings.max_count);
        self.set_max_memory_bytes(settings.max_memory_bytes);
    }

    fn remove_image(&mut self, id: HistoryId) -> Option<usize> {
        let image = self.images.remove(&id)?;
        let freed = image.compressed_len();
        self.total_bytes -= freed;
        Some(freed)
    }

    fn trim_to_count(&mut self) {
        while self.entries.len() > self.max_count {
            let Some(oldest) = self.entries.pop_back() else {
                break;
            };
            let freed = self.remove_image(oldest.id).unwrap_or(0);
            tracing::debug!(
                id = oldest.id.0,
                freed_bytes = freed,
                "Evicted history entry"
            );
        }
    }

    fn trim_to_memory(&mut self) {
        if self.total_bytes <= self.max_memory_bytes {
            return;
        }

        let mut index = self.entries.len();
        while index > 0 && self.total_bytes > self.max_memory_bytes && !self.images.is_empty() {
            index -= 1;
            let id = self.entries[index].id;
            if let Some(freed) = self.remove_image(id) {
                tracing::debug!(
                    id = id.0,
                    freed_bytes = freed,
                    total_bytes = self.total_bytes,
                    "Evicted history snapshot, entry kept"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PixelFormat;

    fn rect(x: i32) -> CaptureRect {
        CaptureRect::new(x, 0, 10, 10)
    }

    fn solid(width: u32, height: u32, value: u8) -> Image {
        let mut img = Image::new(width, height, PixelFormat::Bgra8).unwrap();
        img.data_mut().fill(value);
        img
    }

    fn total_of_images(history: &CaptureHistory) -> usize {
        history.images.values().map(|i| i.compressed_len()).sum()
    }

    #[test]
    fn test_initially_empty() {
        let history = CaptureHistory::new();
        assert_eq!(history.count(), 0);
        assert!(history.get_entry(0).is_none());
        assert!(history.latest().is_none());
        assert_eq!(history.max_count(), DEFAULT_MAX_COUNT);
        assert_eq!(history.max_memory_bytes(), DEFAULT_MAX_MEMORY_BYTES);
    }

    #[test]
    fn test_record_metadata_only() {
        let mut history = CaptureHistory::new();
        let id = history.record(CaptureRect::new(10, 20, 30, 40), None);

        let entry = history.get_entry(0).unwrap();
        assert_eq!(entry.id, id);
        assert_eq!(entry.region(), CaptureRect::new(10, 20, 30, 40));
        assert!(entry.timestamp > 0);
        assert!(!history.has_image(id));
        assert!(history.get_image_by_id(id).is_none());
        assert_eq!(history.compressed_bytes(), 0);
    }

    #[test]
    fn test_newest_first_ordering() {
        let mut history = CaptureHistory::new();
        let a = history.record(rect(0), None);
        let b = history.record(rect(1), None);
        let c = history.record(rect(2), None);

        let ids: Vec<_> = history.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![c, b, a]);
        assert_eq!(history.latest().map(|e| e.id), Some(c));
    }

    #[test]
    fn test_image_round_trip_is_independent_copy() {
        let mut history = CaptureHistory::new();
        let mut img = solid(8, 8, 0x40);
        let id = history.record(rect(0), Some(&img));

        img.data_mut().fill(0);
        let stored = history.get_image_by_id(id).unwrap();
        assert!(stored.data().iter().all(|&b| b == 0x40));
        assert_eq!(history.compressed_bytes(), total_of_images(&history));
    }

    #[test]
    fn test_count_trim_drops_images_too() {
        let mut history = CaptureHistory::with_limits(2, usize::MAX);
        let first = history.record(rect(0), Some(&solid(4, 4, 1)));
        history.record(rect(1), Some(&solid(4, 4, 2)));
        history.record(rect(2), Some(&solid(4, 4, 3)));

        assert_eq!(history.count(), 2);
        assert!(history.find_by_id(first).is_none());
        assert!(!history.has_image(first));
        assert_eq!(history.image_count(), 2);
        assert_eq!(history.compressed_bytes(), total_of_images(&history));
    }

    #[test]
    fn test_set_max_count_trims_immediately() {
        let mut history = CaptureHistory::new();
        for i in 0..5 {
            history.record(rect(i), None);
        }
        history.set_max_count(3);
        assert_eq!(history.count(), 3);
        assert_eq!(history.get_entry(2).map(|e| e.region_x), Some(2));
    }

    #[test]
    fn test_zero_max_count_is_ignored() {
        let mut history = CaptureHistory::new();
        history.set_max_count(3);
        history.set_max_count(0);
        assert_eq!(history.max_count(), 3);
        assert_eq!(CaptureHistory::with_limits(0, 1).max_count(), DEFAULT_MAX_COUNT);
    }

    #[test]
    fn test_memory_trim_skips_entries_without_images() {
        let mut history = CaptureHistory::new();
        let bare = history.record(rect(0), None);
        let old = history.record(rect(1), Some(&solid(64, 64, 7)));
        let new = history.record(rect(2), Some(&solid(64, 64, 9)));

        let per_image = history.compressed_bytes() / 2;
        history.set_max_memory_bytes(per_image);

        assert!(history.find_by_id(bare).is_some());
        assert!(!history.has_image(old));
        assert!(history.has_image(new));
        assert_eq!(history.count(), 3);
        assert_eq!(history.compressed_bytes(), per_image);
    }

    #[test]
    fn test_zero_memory_budget_drops_all_images() {
        let mut history = CaptureHistory::new();
        history.record(rect(0), Some(&solid(4, 4, 1)));
        history.record(rect(1), Some(&solid(4, 4, 2)));
        history.set_max_memory_bytes(0);

        assert_eq!(history.image_count(), 0);
        assert_eq!(history.compressed_bytes(), 0);
        assert_eq!(history.count(), 2);
    }

    #[test]
    fn test_clear_keeps_id_sequence() {
        let mut history = CaptureHistory::new();
        let before = history.record(rect(0), Some(&solid(4, 4, 1)));
        history.clear();

        assert_eq!(history.count(), 0);
        assert_eq!(history.compressed_bytes(), 0);
        let after = history.record(rect(0), None);
        assert!(after > before);
    }

    #[test]
    fn test_stats_report_raw_and_compressed_sizes() {
        let mut history = CaptureHistory::with_limits(10, 1 << 20);
        history.record(rect(0), Some(&solid(10, 10, 3)));
        history.record(rect(1), None);

        let stats = history.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.images, 1);
        assert_eq!(stats.raw_bytes, 400);
        assert_eq!(stats.compressed_bytes, history.compressed_bytes());
        assert!(stats.compressed_bytes < stats.raw_bytes);
        assert_eq!(stats.max_count, 10);
        assert_eq!(stats.max_memory_bytes, 1 << 20);
    }

    #[test]
    fn test_apply_settings_runs_both_trims() {
        let mut history = CaptureHistory::new();
        for i in 0..4 {
            history.record(rect(i), Some(&solid(4, 4, i as u8)));
        }

        let settings = HistorySettings {
            max_count: 2,
            max_memory_bytes: 0,
            ..HistorySettings::default()
        };
        history.apply_settings(&settings);

        assert_eq!(history.count(), 2);
        assert_eq!(history.image_count(), 0);
    }
}
