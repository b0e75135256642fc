//! Console transport - logs every CC instead of sending it

use super::Transport;
use crate::midi::{format_hex, ControlChange};
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info};

/// Logs outbound messages; used when no device is attached
pub struct ConsoleTransport {
    name: String,
    /// Messages logged so far
    sent_count: Mutex<u64>,
}

impl ConsoleTransport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sent_count: Mutex::new(0),
        }
    }

    pub fn sent_count(&self) -> u64 {
        *self.sent_count.lock()
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, message: &ControlChange) -> Result<()> {
        let count = {
            let mut count = self.sent_count.lock();
            *count += 1;
            *count
        };

        info!("🎛️  [{}] {}", self.name, message);
        debug!(
            transport = self.name.as_str(),
            bytes = format_hex(&message.encode()).as_str(),
            sent = count,
            "ConsoleTransport send"
        );
        Ok(())
    }
}
