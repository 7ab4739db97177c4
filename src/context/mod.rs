// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Invocation context
//!
//! A [`Context`] is built for every console line by [`ContextBuilder`] and
//! carries the raw text, a cursor positioned after the command tokens, and
//! the outcome of command resolution. Building a context never runs code or
//! evaluates checks.

pub mod view;

pub use view::StringView;

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::commands::{Command, CommandRegistry};
use crate::console::EventEmitter;
use crate::error::CommandError;

/// Outcome of resolving the leading token(s) of a line
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The line had no leading token
    Empty,
    /// The leading token matched no command or alias
    NotFound(String),
    /// The command to invoke
    Found(Arc<Command>),
}

/// Per-invocation record handed to checks, bodies and listeners
#[derive(Clone)]
pub struct Context {
    message: String,
    view: StringView,
    resolution: Resolution,
    invoked_with: Option<String>,
    invoked_parents: Vec<Arc<Command>>,
    invocation_id: Uuid,
    created_at: DateTime<Utc>,
    registry: Arc<CommandRegistry>,
    emitter: EventEmitter,
}

impl Context {
    /// The raw console line.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn view(&self) -> &StringView {
        &self.view
    }

    /// Mutable cursor, for bodies that consume their arguments word by word.
    pub fn view_mut(&mut self) -> &mut StringView {
        &mut self.view
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// The resolved command, if any.
    pub fn command(&self) -> Option<Arc<Command>> {
        match &self.resolution {
            Resolution::Found(command) => Some(command.clone()),
            _ => None,
        }
    }

    /// True when a command was resolved.
    pub fn is_valid(&self) -> bool {
        matches!(self.resolution, Resolution::Found(_))
    }

    /// The first token actually consumed from the line.
    pub fn invoked_with(&self) -> Option<&str> {
        self.invoked_with.as_deref()
    }

    /// Groups traversed to reach the command, outermost first.
    pub fn invoked_parents(&self) -> &[Arc<Command>] {
        &self.invoked_parents
    }

    pub fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The top-level registry the command was resolved from.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Handle for dispatching console events from inside a command.
    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    /// Unconsumed text after the command tokens, leading whitespace removed.
    pub fn rest(&self) -> &str {
        self.view.remaining().trim_start()
    }

    /// Split the unconsumed text into words, honoring double quotes.
    pub fn args(&self) -> Result<Vec<String>, CommandError> {
        let mut view = self.view.clone();
        let mut args = Vec::new();
        loop {
            view.skip_ws();
            match view.get_quoted_word()? {
                Some(word) => args.push(word),
                None => return Ok(args),
            }
        }
    }

    /// Consume the next (optionally quoted) argument.
    pub fn next_arg(&mut self) -> Result<Option<String>, CommandError> {
        self.view.skip_ws();
        self.view.get_quoted_word()
    }

    /// Label used in logs and error reports: the qualified command name, or
    /// the attempted token when nothing resolved.
    pub fn label(&self) -> String {
        match &self.resolution {
            Resolution::Found(command) => command.qualified_name(),
            Resolution::NotFound(token) => token.clone(),
            Resolution::Empty => "None".to_string(),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("message", &self.message)
            .field("command", &self.command().map(|c| c.qualified_name()))
            .field("invoked_with", &self.invoked_with)
            .field("invocation_id", &self.invocation_id)
            .finish()
    }
}

/// Builds a [`Context`] from a raw line against a registry
pub struct ContextBuilder {
    registry: Arc<CommandRegistry>,
    emitter: EventEmitter,
}

impl ContextBuilder {
    pub fn new(registry: Arc<CommandRegistry>, emitter: EventEmitter) -> Self {
        Self { registry, emitter }
    }

    /// Tokenize `message` and resolve its leading command path.
    ///
    /// After a group, the next word is consumed only if it names one of the
    /// group's subcommands; otherwise it is left for the group body.
    pub fn build(&self, message: &str) -> Context {
        let mut view = StringView::new(message);
        view.skip_ws();

        let invoked_with = view.get_word();
        let mut invoked_parents = Vec::new();

        let resolution = match invoked_with.as_deref() {
            None => Resolution::Empty,
            Some(token) => match self.registry.lookup(token) {
                None => Resolution::NotFound(token.to_string()),
                Some(mut command) => {
                    while let Some(subcommands) = command.subcommands() {
                        view.skip_ws();
                        let Some(word) = view.get_word() else {
                            break;
                        };
                        match subcommands.get(&word) {
                            Some(sub) => {
                                invoked_parents.push(command.clone());
                                command = sub;
                            }
                            None => {
                                view.undo();
                                break;
                            }
                        }
                    }
                    Resolution::Found(command)
                }
            },
        };

        Context {
            message: message.to_string(),
            view,
            resolution,
            invoked_with,
            invoked_parents,
            invocation_id: Uuid::new_v4(),
            created_at: Utc::now(),
            registry: self.registry.clone(),
            emitter: self.emitter.clone(),
        }
    }
}
