// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use botconsole::config::{OutputTarget, Settings};
use botconsole::ConsoleError;
use tempfile::TempDir;

#[test]
fn test_settings_default_values() {
    let settings = Settings::default();
    assert!(settings.help.enabled);
    assert_eq!(settings.help.name, "help");
    assert!(settings.help.aliases.is_empty());
    assert_eq!(settings.errors.target, OutputTarget::Stderr);
    assert_eq!(settings.output.target, OutputTarget::Stdout);
    assert_eq!(settings.input.thread_name, "console-input");
}

#[test]
fn test_load_legacy_help_flag() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.json");
    std::fs::write(&path, r#"{"console_help_command": false}"#).unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert!(!settings.help.enabled);
}

#[test]
fn test_load_rejects_invalid_help_name() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.json");
    std::fs::write(&path, r#"{"help": {"name": "two words"}}"#).unwrap();

    assert!(matches!(
        Settings::load_from(&path),
        Err(ConsoleError::Config(_))
    ));
}

#[test]
fn test_load_rejects_malformed_json() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        Settings::load_from(&path),
        Err(ConsoleError::Json(_))
    ));
}

#[test]
fn test_save_then_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.json");

    let mut settings = Settings::default();
    settings.help.aliases = vec!["?".to_string(), "h".to_string()];
    settings.errors.report_unhandled = false;
    settings.logging.filter = "info".to_string();
    settings.save_to(&path).unwrap();

    assert_eq!(Settings::load_from(&path).unwrap(), settings);
}

#[test]
fn test_overwrites_corrupt_file_on_save() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("settings.json");
    std::fs::write(&path, "garbage").unwrap();

    Settings::default().save_to(&path).unwrap();
    assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());
}
