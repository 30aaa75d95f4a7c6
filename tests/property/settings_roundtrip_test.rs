//! Property-based tests for settings persistence.
//!
//! Values written through `set_value` must be read back unchanged by a fresh
//! engine on the same file.

use proptest::prelude::*;
use smartmark::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use tempfile::TempDir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn set_values_survive_reload(
        timeout_ms in 1u64..=120_000u64,
        filter in "[a-z_]{1,12}=(trace|debug|info|warn|error)",
        max_rps in 1u32..=10_000u32,
        favorites_key in "[a-z][a-z0-9-]{0,30}",
        local_storage_path in proptest::option::of("/[a-z]{1,10}/[a-z]{1,10}\\.json"),
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json").to_string_lossy().to_string();

        let mut engine = SettingsEngine::new(Some(path.clone()));
        engine.load().unwrap();
        engine.set_value("sync.request_timeout_ms", serde_json::json!(timeout_ms)).unwrap();
        engine.set_value("logging.filter", serde_json::json!(filter)).unwrap();
        engine.set_value("server.max_requests_per_second", serde_json::json!(max_rps)).unwrap();
        engine.set_value("storage.favorites_key", serde_json::json!(favorites_key)).unwrap();
        engine.set_value("storage.local_storage_path", serde_json::json!(local_storage_path)).unwrap();

        let mut reloaded = SettingsEngine::new(Some(path));
        let loaded = reloaded.load().unwrap();

        prop_assert_eq!(&loaded, engine.get_settings());
        prop_assert_eq!(loaded.sync.request_timeout_ms, timeout_ms);
        prop_assert_eq!(loaded.storage.local_storage_path, local_storage_path);
    }
}
