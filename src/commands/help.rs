// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Built-in `help` command

use async_trait::async_trait;
use std::fmt::Write as _;
use std::sync::Arc;

use super::{Command, CommandBody, CommandRegistry};
use crate::console::output::{write_text, SharedWriter};
use crate::context::Context;
use crate::error::CommandError;

/// Lists commands, or describes one command.
pub struct HelpCommand {
    name: String,
    output: SharedWriter,
}

impl HelpCommand {
    pub fn new(name: impl Into<String>, output: SharedWriter) -> Self {
        Self {
            name: name.into(),
            output,
        }
    }

    /// Render help for `query`, a possibly qualified command name. An empty
    /// query lists all visible top-level commands.
    pub fn render(&self, registry: &CommandRegistry, query: &str) -> Result<String, CommandError> {
        let query = query.trim();
        if query.is_empty() {
            let mut out = String::from("Commands:\n");
            out.push_str(&listing(registry));
            let _ = write!(
                out,
                "\nType \"{} <command>\" for more information on a command.\n",
                self.name
            );
            return Ok(out);
        }

        let command = registry
            .lookup(query)
            .ok_or_else(|| CommandError::NotFound(query.to_string()))?;
        Ok(describe(registry, &command))
    }
}

fn listing(registry: &CommandRegistry) -> String {
    let visible: Vec<Arc<Command>> = registry
        .sorted()
        .into_iter()
        .filter(|c| !c.is_hidden())
        .collect();
    let width = visible.iter().map(|c| c.name().len()).max().unwrap_or(0);

    let mut out = String::new();
    for command in &visible {
        match command.description() {
            Some(description) => {
                let _ = writeln!(out, "  {:<width$}  {}", command.name(), description);
            }
            None => {
                let _ = writeln!(out, "  {}", command.name());
            }
        }
    }
    out
}

fn describe(top: &CommandRegistry, command: &Command) -> String {
    let mut out = format!("{}\n", command.qualified_name());

    let parent = command.parent();
    let home = parent
        .as_ref()
        .and_then(|p| p.subcommands())
        .unwrap_or(top);
    let aliases = home.aliases_of(command.name());
    if !aliases.is_empty() {
        let _ = writeln!(out, "Aliases: {}", aliases.join(", "));
    }

    let _ = writeln!(
        out,
        "\n  {}",
        command.description().unwrap_or("No description.")
    );

    if let Some(subcommands) = command.subcommands() {
        let list = listing(subcommands);
        if !list.is_empty() {
            out.push_str("\nSubcommands:\n");
            out.push_str(&list);
        }
    }
    out
}

#[async_trait]
impl CommandBody for HelpCommand {
    async fn call(&self, ctx: &Context) -> Result<(), CommandError> {
        let text = self.render(ctx.registry(), ctx.rest())?;
        write_text(&self.output, &text).map_err(|e| CommandError::Invoke(e.into()))
    }
}
