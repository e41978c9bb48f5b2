// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Analysis config persistence through the service and both stores.

use plinth_config::{ConfigError, ConfigService, ConfigStore, FsConfigStore, MemoryConfigStore};
use plinth_core::AnalysisConfig;

fn tuned() -> AnalysisConfig {
    AnalysisConfig {
        max_ticks: 240,
        time_step: 1.0 / 60.0,
        debug: true,
        ..AnalysisConfig::default()
    }
}

#[test]
fn missing_analysis_config_falls_back_to_defaults() {
    let service = ConfigService::new(MemoryConfigStore::new());
    assert_eq!(service.load_analysis().expect("load"), AnalysisConfig::default());
    assert!(service.store().is_empty());
}

#[test]
fn analysis_config_round_trips_in_memory() {
    let service = ConfigService::new(MemoryConfigStore::new());
    service.save_analysis(&tuned()).expect("save");
    assert_eq!(service.load_analysis().expect("load"), tuned());
    assert_eq!(service.into_inner().len(), 1);
}

#[test]
fn analysis_config_round_trips_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FsConfigStore::with_root(dir.path().join("nested")).expect("store");
    let service = ConfigService::new(store);
    service.save_analysis(&tuned()).expect("save");
    let path = service
        .store()
        .path_for(AnalysisConfig::STORE_KEY)
        .expect("valid key");
    assert!(path.exists());
    assert_eq!(service.load_analysis().expect("load"), tuned());
}

#[test]
fn partial_file_keeps_unspecified_defaults() {
    let store = MemoryConfigStore::new();
    store
        .save_raw(AnalysisConfig::STORE_KEY, br#"{ "scaling": 10.0 }"#)
        .expect("save");
    let cfg = ConfigService::new(store).load_analysis().expect("load");
    assert!((cfg.scaling - 10.0).abs() < f32::EPSILON);
    assert_eq!(cfg.max_ticks, AnalysisConfig::default().max_ticks);
}

#[test]
fn corrupt_file_is_a_serde_error() {
    let store = MemoryConfigStore::new();
    store.save_raw("analysis", b"{ not json").expect("save");
    let err = ConfigService::new(store).load_analysis().unwrap_err();
    assert!(matches!(err, ConfigError::Serde(_)));
}

#[test]
fn path_like_keys_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FsConfigStore::with_root(dir.path()).expect("store");
    for key in ["", "..", "a/b", "a\\b"] {
        assert!(matches!(
            store.save_raw(key, b"{}"),
            Err(ConfigError::InvalidKey(_))
        ));
    }
    assert!(matches!(store.load_raw("absent"), Err(ConfigError::NotFound)));
}
