// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Console event surface
//!
//! Events cross from the blocking input thread to the async console loop
//! over an unbounded tokio mpsc channel. Lifecycle events raised while a
//! command runs are delivered inline by the dispatcher instead.

use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::context::Context;
use crate::error::CommandError;

/// Names of the events a host can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A non-empty line arrived from the console
    Message,
    /// A resolved command is about to run
    Command,
    /// Resolution, a check, or a command body failed
    CommandError,
    /// A command body finished without error
    CommandCompletion,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Message,
        EventKind::Command,
        EventKind::CommandError,
        EventKind::CommandCompletion,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Message => "console_message",
            EventKind::Command => "console_command",
            EventKind::CommandError => "console_command_error",
            EventKind::CommandCompletion => "console_command_completion",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An event together with its payload
#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    /// Trimmed console line
    Message(String),
    /// Pre-invocation hook
    Command(Context),
    /// Failure of a single invocation
    CommandError {
        context: Context,
        error: Arc<CommandError>,
    },
    /// Successful completion
    CommandCompletion(Context),
}

impl ConsoleEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ConsoleEvent::Message(_) => EventKind::Message,
            ConsoleEvent::Command(_) => EventKind::Command,
            ConsoleEvent::CommandError { .. } => EventKind::CommandError,
            ConsoleEvent::CommandCompletion(_) => EventKind::CommandCompletion,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// The invocation context, for every event but `Message`.
    pub fn context(&self) -> Option<&Context> {
        match self {
            ConsoleEvent::Message(_) => None,
            ConsoleEvent::Command(ctx) | ConsoleEvent::CommandCompletion(ctx) => Some(ctx),
            ConsoleEvent::CommandError { context, .. } => Some(context),
        }
    }
}

/// Type alias for the event sender
pub type EventSender = mpsc::UnboundedSender<ConsoleEvent>;

/// Type alias for the event receiver
pub type EventReceiver = mpsc::UnboundedReceiver<ConsoleEvent>;

/// Create a new event channel
pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Send an event. Returns false if the receiver is gone.
pub fn send_event(tx: &EventSender, event: ConsoleEvent) -> bool {
    tx.send(event).is_ok()
}

/// Cloneable handle that queues events for the console loop
#[derive(Debug, Clone)]
pub struct EventEmitter {
    tx: EventSender,
}

impl EventEmitter {
    pub fn new(tx: EventSender) -> Self {
        Self { tx }
    }

    pub fn emit(&self, event: ConsoleEvent) -> bool {
        send_event(&self.tx, event)
    }

    /// Queue a line as if it had been typed on the console.
    pub fn console_message(&self, line: impl Into<String>) -> bool {
        self.emit(ConsoleEvent::Message(line.into()))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
