// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Blocking console reader
//!
//! Reads lines on a dedicated OS thread and hands each non-blank, trimmed
//! line to the console as a `console_message` event.

use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::console::EventEmitter;

/// Why the input loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputExit {
    /// The stream reported end-of-file
    EndOfInput,
    /// The console dropped its event receiver
    ReceiverClosed,
}

pub struct InputLoop<R> {
    reader: R,
    emitter: EventEmitter,
    error_backoff: Duration,
}

impl InputLoop<io::BufReader<io::Stdin>> {
    /// Input loop over the process's standard input.
    pub fn stdin(emitter: EventEmitter) -> Self {
        Self::new(io::BufReader::new(io::stdin()), emitter)
    }
}

impl<R> InputLoop<R>
where
    R: BufRead + Send + 'static,
{
    pub fn new(reader: R, emitter: EventEmitter) -> Self {
        Self {
            reader,
            emitter,
            error_backoff: Duration::from_millis(100),
        }
    }

    /// Pause between a failed read and the next attempt.
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    /// Read until end-of-file or until the console goes away.
    pub fn run(mut self) -> InputExit {
        let mut line = String::new();
        loop {
            if self.emitter.is_closed() {
                tracing::info!(
                    target: "botconsole.input",
                    "console receiver closed, stopping input"
                );
                return InputExit::ReceiverClosed;
            }

            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    tracing::info!(
                        target: "botconsole.input",
                        "console input reached end of stream"
                    );
                    return InputExit::EndOfInput;
                }
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if !self.emitter.console_message(trimmed) {
                        tracing::info!(
                            target: "botconsole.input",
                            "console receiver closed, stopping input"
                        );
                        return InputExit::ReceiverClosed;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    tracing::error!(
                        target: "botconsole.input",
                        error = %err,
                        "failed to read console input"
                    );
                    thread::sleep(self.error_backoff);
                }
            }
        }
    }

    /// Start the loop on a named thread. Returns as soon as the thread exists.
    pub fn spawn(self, thread_name: &str) -> io::Result<JoinHandle<InputExit>> {
        let handle = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || self.run())?;
        tracing::debug!(
            target: "botconsole.input",
            thread = %thread_name,
            "console input thread started"
        );
        Ok(handle)
    }
}
