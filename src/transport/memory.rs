//! In-memory transport that records what it was given

use super::Transport;
use crate::midi::ControlChange;
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Records messages; clones share the same buffer
#[derive(Clone, Default)]
pub struct MemoryTransport {
    sent: Arc<Mutex<Vec<ControlChange>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far
    pub fn sent(&self) -> Vec<ControlChange> {
        self.sent.lock().clone()
    }

    /// Drain the buffer
    pub fn take(&self) -> Vec<ControlChange> {
        std::mem::take(&mut *self.sent.lock())
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn name(&self) -> &str {
        "memory"
    }

    async fn send(&self, message: &ControlChange) -> Result<()> {
        self.sent.lock().push(*message);
        Ok(())
    }
}
