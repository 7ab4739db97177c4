// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! botconsole - a stdin command interpreter for long-running bots.
//!
//! A host builds a [`Console`], registers [`Command`]s, spawns the input
//! thread and awaits [`Console::run`]. Each typed line becomes a
//! `console_message` event and is then resolved and invoked as a command.
//!
//! Architecture highlights:
//! - `commands`: command objects, groups and the name/alias registry
//! - `context`: per-line tokenizer and resolution into a `Context`
//! - `console`: dispatcher, lifecycle events and listener table
//! - `input`: blocking line reader on its own thread
//! - `config`: settings file handling

pub mod cli;
pub mod commands;
pub mod config;
pub mod console;
pub mod context;
pub mod error;
pub mod input;

pub use commands::{Command, CommandRegistry};
pub use console::{Console, ConsoleBuilder, ConsoleEvent, EventKind};
pub use context::{Context, Resolution};
pub use error::{CommandError, ConsoleError, Result};
