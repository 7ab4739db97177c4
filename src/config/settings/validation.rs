// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::error::{ConsoleError, Result};

use super::Settings;

fn is_valid_command_token(token: &str) -> bool {
    !token.is_empty() && !token.contains(char::is_whitespace)
}

impl Settings {
    /// Reject settings the console cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.help.enabled {
            if !is_valid_command_token(&self.help.name) {
                return Err(ConsoleError::Config(format!(
                    "help.name must be a single word, got {:?}",
                    self.help.name
                )));
            }
            if let Some(bad) = self
                .help
                .aliases
                .iter()
                .find(|alias| !is_valid_command_token(alias))
            {
                return Err(ConsoleError::Config(format!(
                    "help.aliases must be single words, got {:?}",
                    bad
                )));
            }
        }

        if self.input.thread_name.trim().is_empty() {
            return Err(ConsoleError::Config(
                "input.thread_name must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
