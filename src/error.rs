// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for botconsole
//!
//! Two layers: [`ConsoleError`] is returned synchronously to callers
//! (registration, configuration, runtime setup), while [`CommandError`]
//! describes a single failed invocation and only ever travels through the
//! `console_command_error` event.

use thiserror::Error;

/// Main error type for console operations
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Duplicate command name or alias at registration time
    #[error("Registration error: {0}")]
    Registration(String),

    /// A per-invocation error surfaced to a direct caller
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The console event loop was started twice
    #[error("Console is already running")]
    AlreadyRunning,
}

/// Errors raised while resolving or running a single console command
#[derive(Error, Debug)]
pub enum CommandError {
    /// The leading token did not resolve to any command or alias
    #[error("Console command \"{0}\" is not found")]
    NotFound(String),

    /// A global or per-command check rejected the invocation
    #[error("{0}")]
    CheckFailure(String),

    /// The command body rejected its arguments
    #[error("Bad argument: {0}")]
    BadArgument(String),

    /// The command body failed
    #[error("Command raised an exception: {0}")]
    Invoke(#[from] anyhow::Error),
}

impl CommandError {
    /// Stable kind name, printed by the default error reporter.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::NotFound(_) => "CommandNotFound",
            CommandError::CheckFailure(_) => "CheckFailure",
            CommandError::BadArgument(_) => "BadArgument",
            CommandError::Invoke(_) => "CommandInvokeError",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CommandError::NotFound(_))
    }

    pub fn is_check_failure(&self) -> bool {
        matches!(self, CommandError::CheckFailure(_))
    }

    /// Messages of the underlying causes, outermost first.
    ///
    /// Only `Invoke` carries a chain; the other variants are leaf errors.
    pub fn causes(&self) -> Vec<String> {
        match self {
            CommandError::Invoke(err) => err.chain().skip(1).map(|c| c.to_string()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;
