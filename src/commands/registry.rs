// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Command registry with alias and qualified-name resolution
//!
//! Names and aliases share one namespace per registry. Groups own a nested
//! registry, so lookups descend one token at a time.
//!
//! The registry is not synchronized. Register everything before the console
//! is shared with the input thread and the event loop.

use std::collections::HashMap;
use std::sync::Arc;

use super::Command;
use crate::error::{ConsoleError, Result};

/// Registry of console commands
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<Command>>,
    /// Aliases mapping alternate names to canonical command names
    aliases: HashMap<String, String>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command and its aliases.
    ///
    /// Fails without touching the registry if the name or any alias is
    /// already taken by a name or an alias.
    pub fn register(&mut self, command: Command) -> Result<Arc<Command>> {
        let name = command.name();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(ConsoleError::Registration(format!(
                "Invalid console command name {:?}",
                name
            )));
        }
        self.ensure_free(name)?;

        for (i, alias) in command.aliases().iter().enumerate() {
            if alias.is_empty() || alias.contains(char::is_whitespace) {
                return Err(ConsoleError::Registration(format!(
                    "Invalid alias {:?} for console command {}",
                    alias, name
                )));
            }
            if alias == name || command.aliases()[..i].contains(alias) {
                return Err(ConsoleError::Registration(format!(
                    "Console command {} declares {} more than once",
                    name, alias
                )));
            }
            self.ensure_free(alias)?;
        }

        let command = Arc::new(command);
        command.bind_children();

        for alias in command.aliases() {
            self.aliases
                .insert(alias.clone(), command.name().to_string());
        }
        self.commands
            .insert(command.name().to_string(), command.clone());

        tracing::debug!(
            target: "botconsole.registry",
            command = %command.name(),
            aliases = command.aliases().len(),
            "registered console command"
        );

        Ok(command)
    }

    fn ensure_free(&self, key: &str) -> Result<()> {
        if self.commands.contains_key(key) {
            return Err(ConsoleError::Registration(format!(
                "A console command with the name {} is already registered.",
                key
            )));
        }
        if self.aliases.contains_key(key) {
            return Err(ConsoleError::Registration(format!(
                "A console command with the alias {} is already registered.",
                key
            )));
        }
        Ok(())
    }

    /// Remove a command by name, or detach a single alias.
    ///
    /// A primary name removes the command with all its aliases. An alias
    /// only unbinds that alias; the command stays reachable otherwise.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<Command>> {
        if let Some(command) = self.commands.remove(name) {
            self.aliases.retain(|_, target| target != name);
            return Some(command);
        }

        let target = self.aliases.remove(name)?;
        self.commands.get(&target).cloned()
    }

    /// Single-token lookup by name or alias.
    pub fn get(&self, name: &str) -> Option<Arc<Command>> {
        // First try direct lookup
        if let Some(command) = self.commands.get(name) {
            return Some(command.clone());
        }
        // Then try alias resolution
        self.aliases
            .get(name)
            .and_then(|canonical| self.commands.get(canonical))
            .cloned()
    }

    /// Resolve a possibly qualified name such as `"config set"`.
    ///
    /// A non-group first token is returned as-is and the remaining tokens
    /// are ignored. Inside groups, any unknown token yields `None`.
    pub fn lookup(&self, name: &str) -> Option<Arc<Command>> {
        // fast path, no space in name
        if !name.contains(' ') {
            return self.get(name);
        }

        let mut tokens = name.split_whitespace();
        let mut current = self.get(tokens.next()?)?;
        if !current.is_group() {
            return Some(current);
        }

        for token in tokens {
            current = current.subcommands()?.get(token)?;
        }
        Some(current)
    }

    /// True if `name` is bound as a name or an alias.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name) || self.aliases.contains_key(name)
    }

    /// Aliases currently bound to the command called `name`, sorted.
    pub fn aliases_of(&self, name: &str) -> Vec<&str> {
        let mut aliases: Vec<&str> = self
            .aliases
            .iter()
            .filter(|(_, target)| target.as_str() == name)
            .map(|(alias, _)| alias.as_str())
            .collect();
        aliases.sort_unstable();
        aliases
    }

    /// Registered commands, in no particular order.
    pub fn commands(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.commands.values()
    }

    /// Registered commands sorted by name.
    pub fn sorted(&self) -> Vec<Arc<Command>> {
        let mut commands: Vec<Arc<Command>> = self.commands.values().cloned().collect();
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        commands
    }

    /// List all command names
    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(|s| s.as_str()).collect()
    }

    /// Every command including nested subcommands, depth first, sorted by
    /// name at each level.
    pub fn walk(&self) -> Vec<Arc<Command>> {
        let mut out = Vec::new();
        for command in self.sorted() {
            let nested = command.subcommands().map(CommandRegistry::walk);
            out.push(command);
            out.extend(nested.into_iter().flatten());
        }
        out
    }

    /// Get the number of registered commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
