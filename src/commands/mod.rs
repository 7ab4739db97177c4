// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Console commands
//!
//! A [`Command`] pairs a name (plus aliases) with an async body. A group is a
//! command that also owns a nested [`CommandRegistry`], so `"parent child"`
//! resolves to a subcommand.
//!
//! Bodies, checks and error handlers are trait objects. Plain closures work
//! for all three:
//!
//! ```ignore
//! let ping = Command::new("ping", |ctx: Context| async move {
//!     println!("pong ({})", ctx.invocation_id());
//!     Ok(())
//! })
//! .with_alias("p")
//! .with_check(|ctx: &Context| !ctx.message().contains("forbidden"));
//! ```

pub mod help;
pub mod registry;

pub use help::HelpCommand;
pub use registry::CommandRegistry;

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock, Weak};

use crate::context::Context;
use crate::error::{CommandError, ConsoleError, Result};

/// The callable part of a command
#[async_trait]
pub trait CommandBody: Send + Sync {
    async fn call(&self, ctx: &Context) -> std::result::Result<(), CommandError>;
}

#[async_trait]
impl<F, Fut> CommandBody for F
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<(), CommandError>> + Send + 'static,
{
    async fn call(&self, ctx: &Context) -> std::result::Result<(), CommandError> {
        (self)(ctx.clone()).await
    }
}

/// An authorization predicate evaluated before a body runs
#[async_trait]
pub trait Check: Send + Sync {
    /// `Ok(false)` and `Err(_)` both reject the invocation.
    async fn check(&self, ctx: &Context) -> std::result::Result<bool, CommandError>;
}

#[async_trait]
impl<F> Check for F
where
    F: Fn(&Context) -> bool + Send + Sync,
{
    async fn check(&self, ctx: &Context) -> std::result::Result<bool, CommandError> {
        Ok((self)(ctx))
    }
}

/// Command-local error handler, awaited before `console_command_error` listeners
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    async fn handle(&self, ctx: &Context, error: &CommandError);
}

#[async_trait]
impl<F> ErrorHandler for F
where
    F: Fn(&Context, &CommandError) + Send + Sync,
{
    async fn handle(&self, ctx: &Context, error: &CommandError) {
        (self)(ctx, error)
    }
}

/// Run every check in order; the first rejection becomes a `CheckFailure`.
pub(crate) async fn run_checks(
    checks: &[Arc<dyn Check>],
    ctx: &Context,
    failure_message: impl Fn() -> String,
) -> std::result::Result<(), CommandError> {
    for check in checks {
        match check.check(ctx).await {
            Ok(true) => {}
            Ok(false) => return Err(CommandError::CheckFailure(failure_message())),
            Err(err @ CommandError::CheckFailure(_)) => return Err(err),
            Err(err) => return Err(CommandError::CheckFailure(err.to_string())),
        }
    }
    Ok(())
}

/// A named console command, optionally a group of subcommands
pub struct Command {
    name: String,
    aliases: Vec<String>,
    description: Option<String>,
    hidden: bool,
    body: Arc<dyn CommandBody>,
    checks: Vec<Arc<dyn Check>>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
    subcommands: Option<CommandRegistry>,
    invoke_without_command: bool,
    parent: OnceLock<Weak<Command>>,
}

impl Command {
    /// Create a plain command.
    pub fn new(name: impl Into<String>, body: impl CommandBody + 'static) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: None,
            hidden: false,
            body: Arc::new(body),
            checks: Vec::new(),
            error_handler: None,
            subcommands: None,
            invoke_without_command: false,
            parent: OnceLock::new(),
        }
    }

    /// Create a group command with an empty subcommand registry.
    pub fn group(name: impl Into<String>, body: impl CommandBody + 'static) -> Self {
        let mut command = Self::new(name, body);
        command.subcommands = Some(CommandRegistry::new());
        command
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Hide the command from help listings. It stays invocable.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_check(mut self, check: impl Check + 'static) -> Self {
        self.checks.push(Arc::new(check));
        self
    }

    pub fn with_error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// For groups: only run the group body when no subcommand was given.
    pub fn invoke_without_command(mut self, value: bool) -> Self {
        self.invoke_without_command = value;
        self
    }

    /// Builder form of [`Command::add_subcommand`].
    pub fn with_subcommand(mut self, command: Command) -> Result<Self> {
        self.add_subcommand(command)?;
        Ok(self)
    }

    /// Register a subcommand in this group's registry.
    pub fn add_subcommand(&mut self, command: Command) -> Result<Arc<Command>> {
        match self.subcommands.as_mut() {
            Some(registry) => registry.register(command),
            None => Err(ConsoleError::Registration(format!(
                "Command {} is not a group and cannot hold subcommand {}",
                self.name,
                command.name()
            ))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Aliases declared on the command. Detaching an alias from a registry
    /// does not change this list; see [`CommandRegistry::aliases_of`].
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_group(&self) -> bool {
        self.subcommands.is_some()
    }

    pub fn subcommands(&self) -> Option<&CommandRegistry> {
        self.subcommands.as_ref()
    }

    pub fn runs_without_command(&self) -> bool {
        self.invoke_without_command
    }

    pub fn has_error_handler(&self) -> bool {
        self.error_handler.is_some()
    }

    pub fn error_handler(&self) -> Option<&Arc<dyn ErrorHandler>> {
        self.error_handler.as_ref()
    }

    /// The group this command was registered under, if it is still alive.
    pub fn parent(&self) -> Option<Arc<Command>> {
        self.parent.get().and_then(Weak::upgrade)
    }

    /// Enclosing groups, outermost first.
    pub fn parents(&self) -> Vec<Arc<Command>> {
        let mut chain = Vec::new();
        let mut current = self.parent();
        while let Some(group) = current {
            current = group.parent();
            chain.push(group);
        }
        chain.reverse();
        chain
    }

    /// Space-separated path from the top-level registry, e.g. `"config set"`.
    pub fn qualified_name(&self) -> String {
        match self.parent() {
            Some(parent) => format!("{} {}", parent.qualified_name(), self.name),
            None => self.name.clone(),
        }
    }

    /// Evaluate this command's own checks.
    pub async fn can_run(&self, ctx: &Context) -> std::result::Result<(), CommandError> {
        run_checks(&self.checks, ctx, || {
            format!(
                "The check functions for command {} failed.",
                self.qualified_name()
            )
        })
        .await
    }

    /// Run the body. Checks are not evaluated here.
    pub async fn call(&self, ctx: &Context) -> std::result::Result<(), CommandError> {
        self.body.call(ctx).await
    }

    /// Point every direct subcommand back at this group.
    pub(crate) fn bind_children(self: &Arc<Self>) {
        if let Some(registry) = &self.subcommands {
            for child in registry.commands() {
                // A child is owned by exactly one registry, so the slot is empty.
                let _ = child.parent.set(Arc::downgrade(self));
            }
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("hidden", &self.hidden)
            .field("checks", &self.checks.len())
            .field("has_error_handler", &self.error_handler.is_some())
            .field("subcommands", &self.subcommands)
            .finish()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}
