// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Output sinks for help text and error reports

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crate::config::OutputTarget;

/// A writer shared between the console and built-in commands
pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Wrap any writer for sharing.
pub fn shared_writer(writer: impl Write + Send + 'static) -> SharedWriter {
    Arc::new(Mutex::new(Box::new(writer)))
}

/// Writer for a configured target.
pub fn writer_for(target: OutputTarget) -> SharedWriter {
    match target {
        OutputTarget::Stdout => shared_writer(io::stdout()),
        OutputTarget::Stderr => shared_writer(io::stderr()),
    }
}

/// Write `text` and flush, tolerating a poisoned lock.
pub fn write_text(writer: &SharedWriter, text: &str) -> io::Result<()> {
    let mut guard = writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.write_all(text.as_bytes())?;
    guard.flush()
}

/// In-memory sink, handy for hosts that render console output themselves.
#[derive(Debug, Clone, Default)]
pub struct Capture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(|p| p.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }

    pub fn clear(&self) {
        self.buffer
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clear();
    }

    pub fn shared(&self) -> SharedWriter {
        shared_writer(self.clone())
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
