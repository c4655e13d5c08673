// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use camera_shell::constants::{FlipMethod, permission, pipeline};
use camera_shell::{AppError, Config};

#[test]
fn test_config_default() {
    let config = Config::default();

    assert!(
        !config.exit_on_denial,
        "Denial should only update the status line by default"
    );
    assert_eq!(config.permission_request_code, permission::REQUEST_CODE);
    assert_eq!(config.pipeline.source, pipeline::DEFAULT_SOURCE);
    assert_eq!(config.pipeline.flip, FlipMethod::Clockwise);
}

#[test]
fn test_config_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.exit_on_denial = true;
    config.pipeline.source = "videotestsrc".to_string();
    config.pipeline.flip = FlipMethod::None;

    config.save(&path).unwrap();
    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_config_partial_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "pipeline": { "width": 1920, "height": 1080 } }"#).unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.pipeline.width, 1920);
    assert_eq!(config.pipeline.height, 1080);
    assert_eq!(config.pipeline.sink, pipeline::DEFAULT_SINK);
    assert_eq!(config.permission_request_code, permission::REQUEST_CODE);
}

#[test]
fn test_config_invalid_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(Config::load(&path), Err(AppError::Config(_))));

    std::fs::write(&path, r#"{ "pipeline": { "source": "" } }"#).unwrap();
    assert!(matches!(Config::load(&path), Err(AppError::Config(_))));
    assert_eq!(Config::load_or_default(&path), Config::default());
}

#[test]
fn test_config_missing_file_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");

    assert!(matches!(Config::load(&path), Err(AppError::Storage(_))));
    assert_eq!(Config::load_or_default(&path), Config::default());
}

#[test]
fn test_config_default_path_is_under_app_dir() {
    // No config dir at all (e.g. bare CI containers) is allowed
    let Some(path) = Config::default_path() else {
        return;
    };
    assert!(path.ends_with("camera-shell/config.json"), "path was {:?}", path);
}
