// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Console runtime
//!
//! [`Console`] owns the command registry, the listener table and the event
//! channel. The input thread queues `console_message` events; [`Console::run`]
//! drains the queue on the tokio runtime and turns each line into a command
//! invocation.

pub mod events;
pub mod listeners;
pub mod output;

pub use events::{ConsoleEvent, EventEmitter, EventKind};
pub use listeners::{Listener, ListenerTable};
pub use output::{Capture, SharedWriter};

use futures::FutureExt;
use std::io::BufRead;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::watch;

use crate::commands::{run_checks, Check, Command, CommandRegistry, HelpCommand};
use crate::config::Settings;
use crate::context::{Context, ContextBuilder, Resolution};
use crate::error::{CommandError, ConsoleError, Result};
use crate::input::{InputExit, InputLoop};

use events::{create_event_channel, EventReceiver};
use output::write_text;

/// Stops a running [`Console::run`] loop. Cloneable and usable from any thread.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }

    /// Request shutdown once the input thread finishes.
    ///
    /// The watcher is a plain detached OS thread, so a reader still blocked
    /// on stdin never holds up runtime shutdown or process exit.
    pub fn on_input_exit(
        self,
        input: JoinHandle<InputExit>,
    ) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("console-input-watch".to_string())
            .spawn(move || {
                match input.join() {
                    Ok(exit) => {
                        tracing::debug!(target: "botconsole.input", ?exit, "input thread finished");
                    }
                    Err(_) => {
                        tracing::error!(target: "botconsole.input", "input thread panicked");
                    }
                }
                self.shutdown();
            })
    }
}

/// Builder for [`Console`]
pub struct ConsoleBuilder {
    settings: Settings,
    listeners: ListenerTable,
    checks_once: Vec<Arc<dyn Check>>,
    output: Option<SharedWriter>,
    error_output: Option<SharedWriter>,
    input: Option<Box<dyn BufRead + Send>>,
    process_messages: bool,
}

impl ConsoleBuilder {
    fn new() -> Self {
        Self {
            settings: Settings::default(),
            listeners: ListenerTable::new(),
            checks_once: Vec::new(),
            output: None,
            error_output: None,
            input: None,
            process_messages: true,
        }
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Subscribe a listener. Listeners of one kind run in subscription order.
    pub fn listener(mut self, kind: EventKind, listener: impl Listener + 'static) -> Self {
        self.listeners.subscribe(kind, Arc::new(listener));
        self
    }

    /// Add a check evaluated once per invocation, before any group or
    /// command check.
    pub fn check_once(mut self, check: impl Check + 'static) -> Self {
        self.checks_once.push(Arc::new(check));
        self
    }

    /// Sink for command output such as help text.
    pub fn output(mut self, writer: SharedWriter) -> Self {
        self.output = Some(writer);
        self
    }

    /// Sink for unhandled error reports.
    pub fn error_output(mut self, writer: SharedWriter) -> Self {
        self.error_output = Some(writer);
        self
    }

    /// Read console lines from `reader` instead of stdin.
    pub fn input(mut self, reader: impl BufRead + Send + 'static) -> Self {
        self.input = Some(Box::new(reader));
        self
    }

    /// Leave `console_message` events to listeners; the host calls
    /// [`Console::process_commands`] itself.
    pub fn without_default_processing(mut self) -> Self {
        self.process_messages = false;
        self
    }

    pub fn build(self) -> Result<Console> {
        self.settings.validate()?;

        let output = self
            .output
            .unwrap_or_else(|| output::writer_for(self.settings.output.target));
        let error_output = self
            .error_output
            .unwrap_or_else(|| output::writer_for(self.settings.errors.target));

        let mut registry = CommandRegistry::new();
        if self.settings.help.enabled {
            let help = &self.settings.help;
            registry.register(
                Command::new(&help.name, HelpCommand::new(&help.name, output.clone()))
                    .with_aliases(help.aliases.iter().cloned())
                    .with_description("Show this message"),
            )?;
        }

        let (tx, rx) = create_event_channel();
        let (shutdown, _) = watch::channel(false);

        tracing::debug!(
            target: "botconsole.console",
            listeners = self.listeners.len(),
            checks_once = self.checks_once.len(),
            help = self.settings.help.enabled,
            "console built"
        );

        Ok(Console {
            registry: Arc::new(registry),
            checks_once: self.checks_once,
            listeners: self.listeners,
            emitter: EventEmitter::new(tx),
            receiver: Mutex::new(Some(rx)),
            shutdown: Arc::new(shutdown),
            settings: self.settings,
            output,
            error_output,
            input: Mutex::new(self.input),
            input_started: AtomicBool::new(false),
            process_messages: self.process_messages,
        })
    }
}

/// The console command interpreter
pub struct Console {
    registry: Arc<CommandRegistry>,
    checks_once: Vec<Arc<dyn Check>>,
    listeners: ListenerTable,
    emitter: EventEmitter,
    receiver: Mutex<Option<EventReceiver>>,
    shutdown: Arc<watch::Sender<bool>>,
    settings: Settings,
    output: SharedWriter,
    error_output: SharedWriter,
    input: Mutex<Option<Box<dyn BufRead + Send>>>,
    input_started: AtomicBool,
    process_messages: bool,
}

impl Console {
    pub fn builder() -> ConsoleBuilder {
        ConsoleBuilder::new()
    }

    /// Console with default settings, stdin input and standard streams.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Register a top-level command.
    ///
    /// Fails if the name or an alias is taken, or if contexts built by this
    /// console are still alive.
    pub fn register(&mut self, command: Command) -> Result<Arc<Command>> {
        self.registry_mut()?.register(command)
    }

    /// Remove a command by name, or detach one alias.
    pub fn unregister(&mut self, name: &str) -> Result<Option<Arc<Command>>> {
        Ok(self.registry_mut()?.unregister(name))
    }

    fn registry_mut(&mut self) -> Result<&mut CommandRegistry> {
        Arc::get_mut(&mut self.registry).ok_or_else(|| {
            ConsoleError::Registration(
                "The command registry is in use by live contexts".to_string(),
            )
        })
    }

    /// Look up a command by (qualified) name or alias.
    pub fn get_command(&self, name: &str) -> Option<Arc<Command>> {
        self.registry.lookup(name)
    }

    /// Top-level commands sorted by name.
    pub fn commands(&self) -> Vec<Arc<Command>> {
        self.registry.sorted()
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn listeners(&self) -> &ListenerTable {
        &self.listeners
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown.clone(),
        }
    }

    /// Resolve `line` against the registry without running anything.
    pub fn get_context(&self, line: &str) -> Context {
        ContextBuilder::new(self.registry.clone(), self.emitter.clone()).build(line)
    }

    /// Resolve and invoke a console line.
    pub async fn process_commands(&self, line: &str) {
        let ctx = self.get_context(line);
        self.invoke(ctx).await;
    }

    /// Run the command resolved in `ctx` and emit its lifecycle events.
    ///
    /// Failures are delivered as `console_command_error` and never returned.
    pub async fn invoke(&self, ctx: Context) {
        let resolved = match ctx.resolution() {
            Resolution::Empty => return,
            Resolution::NotFound(token) => Err(CommandError::NotFound(token.clone())),
            Resolution::Found(command) => Ok(command.clone()),
        };
        let command = match resolved {
            Ok(command) => command,
            Err(error) => {
                self.emit(ConsoleEvent::CommandError {
                    context: ctx,
                    error: Arc::new(error),
                })
                .await;
                return;
            }
        };

        tracing::debug!(
            target: "botconsole.dispatch",
            command = %command.qualified_name(),
            invocation = %ctx.invocation_id(),
            "invoking console command"
        );

        self.emit(ConsoleEvent::Command(ctx.clone())).await;

        match self.run_command(&command, &ctx).await {
            Ok(()) => self.emit(ConsoleEvent::CommandCompletion(ctx)).await,
            Err(error) => {
                self.emit(ConsoleEvent::CommandError {
                    context: ctx,
                    error: Arc::new(error),
                })
                .await
            }
        }
    }

    async fn run_command(
        &self,
        command: &Command,
        ctx: &Context,
    ) -> std::result::Result<(), CommandError> {
        run_checks(&self.checks_once, ctx, || {
            "The global check once functions failed.".to_string()
        })
        .await?;

        for parent in ctx.invoked_parents() {
            parent.can_run(ctx).await?;
            if !parent.runs_without_command() {
                call_guarded(parent, ctx).await?;
            }
        }

        command.can_run(ctx).await?;
        call_guarded(command, ctx).await
    }

    /// Deliver an event from the queue.
    ///
    /// `console_message` goes to its listeners and is then processed as a
    /// command line. Other events get the same error-handler and reporting
    /// treatment as events raised by [`Console::invoke`].
    pub async fn dispatch(&self, event: ConsoleEvent) {
        if let ConsoleEvent::Message(line) = &event {
            tracing::debug!(target: "botconsole.dispatch", line = %line, "console message");
            self.listeners.dispatch(&event).await;
            if self.process_messages {
                self.process_commands(line).await;
            }
            return;
        }
        self.emit(event).await;
    }

    async fn emit(&self, event: ConsoleEvent) {
        if let ConsoleEvent::CommandError { context, error } = &event {
            tracing::debug!(
                target: "botconsole.dispatch",
                command = %context.label(),
                kind = error.kind(),
                "console command failed"
            );

            let command = context.command();
            let parent = command.as_ref().and_then(|c| c.parent());
            for handler in [&command, &parent]
                .into_iter()
                .flatten()
                .filter_map(|c| c.error_handler())
            {
                handler.handle(context, error).await;
            }

            if !self.listeners.has(EventKind::CommandError) {
                self.report_error(context, error);
            }
        }

        self.listeners.dispatch(&event).await;
    }

    /// Text of the default error report.
    pub fn format_error_report(ctx: &Context, error: &CommandError) -> String {
        let mut report = format!(
            "Ignoring exception in command {}:\n{}: {}\n",
            ctx.label(),
            error.kind(),
            error
        );
        for cause in error.causes() {
            report.push_str("Caused by: ");
            report.push_str(&cause);
            report.push('\n');
        }
        report
    }

    fn report_error(&self, ctx: &Context, error: &CommandError) {
        if !self.settings.errors.report_unhandled {
            return;
        }
        if let Some(command) = ctx.command() {
            let parent_handles = command.parent().is_some_and(|p| p.has_error_handler());
            if command.has_error_handler() || parent_handles {
                return;
            }
        }

        let report = Self::format_error_report(ctx, error);
        if let Err(err) = write_text(&self.error_output, &report) {
            tracing::warn!(
                target: "botconsole.dispatch",
                error = %err,
                "failed to write error report"
            );
        }
    }

    /// The sink help text and command output are written to.
    pub fn output(&self) -> SharedWriter {
        self.output.clone()
    }

    /// Pump queued events until the channel closes or shutdown is requested.
    /// Events already queued when shutdown is requested are still dispatched.
    ///
    /// Fails with [`ConsoleError::AlreadyRunning`] if called more than once.
    pub async fn run(&self) -> Result<()> {
        let mut rx = self
            .receiver
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take()
            .ok_or(ConsoleError::AlreadyRunning)?;
        let mut shutdown = self.shutdown.subscribe();

        tracing::info!(
            target: "botconsole.console",
            commands = self.registry.len(),
            "Console is ready and is listening for commands"
        );

        loop {
            if *shutdown.borrow_and_update() {
                // Lines queued before the request still run.
                while let Ok(event) = rx.try_recv() {
                    self.dispatch(event).await;
                }
                break;
            }
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => self.dispatch(event).await,
                    None => break,
                },
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!(target: "botconsole.console", "console stopped");
        Ok(())
    }

    /// Spawn the input thread on the configured reader (stdin by default).
    pub fn start_input(&self) -> Result<JoinHandle<InputExit>> {
        if self.input_started.swap(true, Ordering::SeqCst) {
            return Err(ConsoleError::AlreadyRunning);
        }

        let reader = self
            .input
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();

        let handle = match reader {
            Some(reader) => self.spawn_input(InputLoop::new(reader, self.emitter.clone()))?,
            None => self.spawn_input(InputLoop::stdin(self.emitter.clone()))?,
        };
        Ok(handle)
    }

    fn spawn_input<R>(&self, input: InputLoop<R>) -> std::io::Result<JoinHandle<InputExit>>
    where
        R: BufRead + Send + 'static,
    {
        let backoff = Duration::from_millis(self.settings.input.error_backoff_ms);
        input
            .with_error_backoff(backoff)
            .spawn(&self.settings.input.thread_name)
    }
}

/// Run a command body, turning a panic into `CommandError::Invoke`.
async fn call_guarded(command: &Command, ctx: &Context) -> std::result::Result<(), CommandError> {
    match AssertUnwindSafe(command.call(ctx)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(CommandError::Invoke(anyhow::anyhow!(
                "command {} panicked: {}",
                command.qualified_name(),
                message
            )))
        }
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("commands", &self.registry.names())
            .field("listeners", &self.listeners)
            .field("checks_once", &self.checks_once.len())
            .field("process_messages", &self.process_messages)
            .finish()
    }
}
