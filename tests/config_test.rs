//! Integration tests for layered settings loading.
//!
//! These tests rely on SOLVIEW_* being unset in the test environment.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use solview::application::ApplicationError;
use solview::config::{local_config_path, Settings};

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "max_depth = 2\ncell_size = 40\n",
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).unwrap();

    assert_eq!(settings.max_depth, 2);
    assert_eq!(settings.cell_size, 40);
    assert_eq!(settings.input, PathBuf::from("solution.txt"));
}

#[test]
fn given_relative_input_in_local_config_when_load_then_resolved_against_work_dir() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "input = \"data/tree.txt\"\n").unwrap();

    let settings = Settings::load(Some(dir.path())).unwrap();

    assert_eq!(settings.input, dir.path().join("data/tree.txt"));
}

#[test]
fn given_invalid_local_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "max_depth = \"deep\"\n").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(
        matches!(result, Err(ApplicationError::Config { .. })),
        "got {result:?}"
    );
}

#[test]
fn given_no_local_config_when_load_then_uses_defaults() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path())).unwrap();

    assert_eq!(settings.max_depth, 5);
    assert_eq!(settings.cell_size, 60);
}
