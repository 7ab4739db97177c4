// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for botconsole
//!
//! Handles loading and saving settings from ~/.botconsole/settings.json

use serde::{Deserialize, Serialize};

mod io;
mod migration;
mod validation;

/// Main settings structure, stored in ~/.botconsole/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Built-in help command
    #[serde(default)]
    pub help: HelpConfig,

    /// Reporting of unhandled command errors
    #[serde(default)]
    pub errors: ErrorsConfig,

    /// Where command output (help text) goes
    #[serde(default)]
    pub output: OutputConfig,

    /// Console input thread
    #[serde(default)]
    pub input: InputConfig,

    /// Log filter used by the binary
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// A standard stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    Stdout,
    Stderr,
}

/// Help command configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HelpConfig {
    /// Register the help command at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Command name
    #[serde(default = "default_help_name")]
    pub name: String,

    /// Extra names for the help command
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Unhandled error reporting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorsConfig {
    /// Print unhandled command errors when no error listener is registered
    #[serde(default = "default_true")]
    pub report_unhandled: bool,

    /// Stream for error reports
    #[serde(default = "default_error_target")]
    pub target: OutputTarget,
}

/// Command output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_output_target")]
    pub target: OutputTarget,
}

/// Input thread configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    /// Name of the dedicated input thread
    #[serde(default = "default_thread_name")]
    pub thread_name: String,

    /// Pause after a read error before reading again (milliseconds)
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `"warn,botconsole=debug"`
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: default_help_name(),
            aliases: Vec::new(),
        }
    }
}

impl Default for ErrorsConfig {
    fn default() -> Self {
        Self {
            report_unhandled: true,
            target: default_error_target(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            target: default_output_target(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            thread_name: default_thread_name(),
            error_backoff_ms: default_error_backoff_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_help_name() -> String {
    "help".to_string()
}

fn default_error_target() -> OutputTarget {
    OutputTarget::Stderr
}

fn default_output_target() -> OutputTarget {
    OutputTarget::Stdout
}

fn default_thread_name() -> String {
    "console-input".to_string()
}

fn default_error_backoff_ms() -> u64 {
    100
}

fn default_log_filter() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert!(settings.help.enabled);
        assert_eq!(settings.help.name, "help");
        assert!(settings.errors.report_unhandled);
        assert_eq!(settings.errors.target, OutputTarget::Stderr);
        assert_eq!(settings.output.target, OutputTarget::Stdout);
        assert_eq!(settings.input.thread_name, "console-input");
        assert_eq!(settings.input.error_backoff_ms, 100);
        assert_eq!(settings.logging.filter, "warn");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"help": {"aliases": ["?"]}, "errors": {"target": "stdout"}}"#)
                .unwrap();
        assert!(settings.help.enabled);
        assert_eq!(settings.help.aliases, vec!["?"]);
        assert_eq!(settings.errors.target, OutputTarget::Stdout);
        assert!(settings.errors.report_unhandled);
    }

    #[test]
    fn test_output_target_serializes_lowercase() {
        let json = serde_json::to_string(&OutputTarget::Stderr).unwrap();
        assert_eq!(json, "\"stderr\"");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");

        let mut settings = Settings::default();
        settings.help.name = "commands".to_string();
        settings.input.error_backoff_ms = 5;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let loaded = Settings::load_from(&temp.path().join("absent.json")).unwrap();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("dir").join("settings.json");

        Settings::default().save_to(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(&path, r#"{"host": {"token_env": "BOT_TOKEN"}}"#).unwrap();

        Settings::default().save_to(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["host"]["token_env"], "BOT_TOKEN");
        assert_eq!(raw["help"]["name"], "help");
    }

    #[test]
    fn test_default_path() {
        assert!(Settings::default_path().ends_with("settings.json"));
    }
}
