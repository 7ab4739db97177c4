// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Event subscription table
//!
//! The table is filled by `ConsoleBuilder` and frozen once the console is
//! built. Listeners for one event run sequentially in subscription order.

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use super::events::{ConsoleEvent, EventKind};

/// A subscriber to console events
#[async_trait]
pub trait Listener: Send + Sync {
    async fn on_event(&self, event: &ConsoleEvent) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> Listener for F
where
    F: Fn(ConsoleEvent) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn on_event(&self, event: &ConsoleEvent) -> anyhow::Result<()> {
        (self)(event.clone()).await
    }
}

/// Handlers keyed by event kind
#[derive(Default, Clone)]
pub struct ListenerTable {
    handlers: HashMap<EventKind, Vec<Arc<dyn Listener>>>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(&mut self, kind: EventKind, listener: Arc<dyn Listener>) {
        self.handlers.entry(kind).or_default().push(listener);
    }

    pub fn listeners(&self, kind: EventKind) -> &[Arc<dyn Listener>] {
        self.handlers.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, kind: EventKind) -> bool {
        !self.listeners(kind).is_empty()
    }

    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every subscriber of its kind.
    ///
    /// A failing listener is logged and does not stop the others.
    pub async fn dispatch(&self, event: &ConsoleEvent) {
        for listener in self.listeners(event.kind()) {
            if let Err(err) = listener.on_event(event).await {
                tracing::error!(
                    target: "botconsole.dispatch",
                    event = event.name(),
                    error = ?err,
                    "ignoring exception in listener"
                );
            }
        }
    }
}

impl std::fmt::Debug for ListenerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for kind in EventKind::ALL {
            let count = self.listeners(kind).len();
            if count > 0 {
                map.entry(&kind.name(), &count);
            }
        }
        map.finish()
    }
}
