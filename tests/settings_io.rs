use std::fs;
use std::path::PathBuf;

use capture_history::settings_io;
use capture_history::HistorySettings;

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(label: &str) -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "capture_history_test_{}_{}_{}",
            label,
            std::process::id(),
            nanos
        ));
        Self { path }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

#[test]
fn save_then_load_round_trips() {
    let temp = TempDir::new("round_trip");
    let settings = HistorySettings {
        max_count: 12,
        max_memory_bytes: 4096,
        store_images: false,
        log_level: "Debug".to_string(),
        ..HistorySettings::default()
    };

    settings_io::save_settings(&temp.path, &settings).unwrap();
    assert!(settings_io::settings_path(&temp.path).exists());

    let loaded = settings_io::load_settings_strict(&temp.path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn missing_file_yields_defaults() {
    let temp = TempDir::new("missing");
    assert_eq!(settings_io::load_settings(&temp.path), HistorySettings::default());
    assert!(settings_io::load_settings_strict(&temp.path).is_err());
}

#[test]
fn malformed_file_yields_defaults() {
    let temp = TempDir::new("malformed");
    fs::create_dir_all(&temp.path).unwrap();
    fs::write(settings_io::settings_path(&temp.path), "{ not json").unwrap();

    assert!(settings_io::load_settings_strict(&temp.path).is_err());
    assert_eq!(settings_io::load_settings(&temp.path), HistorySettings::default());
}

#[test]
fn zero_count_is_normalized_on_load() {
    let temp = TempDir::new("normalize");
    fs::create_dir_all(&temp.path).unwrap();
    fs::write(
        settings_io::settings_path(&temp.path),
        r#"{"max_count": 0, "max_memory_bytes": 100}"#,
    )
    .unwrap();

    let loaded = settings_io::load_settings(&temp.path);
    assert_eq!(loaded.max_count, 50);
    assert_eq!(loaded.max_memory_bytes, 100);
}
