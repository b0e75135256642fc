//! Outbound transports for encoded CC messages
//!
//! The engine only produces [`ControlChange`] values; a transport decides
//! where they go. Delivery failures are the transport's problem: [`deliver`]
//! logs them and keeps going so the control engine never stops on a bad port.

use crate::midi::ControlChange;
use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

pub mod console;
pub mod memory;

pub use console::ConsoleTransport;
pub use memory::MemoryTransport;

/// Transport trait - every outbound CC sink implements this
///
/// Methods take `&self` so a transport can be shared behind an `Arc`;
/// implementations use interior mutability for their own state.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name for logs (e.g., "console")
    fn name(&self) -> &str;

    /// Send one message
    async fn send(&self, message: &ControlChange) -> Result<()>;
}

/// Send a batch in order, returning how many were delivered
pub async fn deliver(transport: &dyn Transport, messages: &[ControlChange]) -> usize {
    let mut delivered = 0;
    for message in messages {
        match transport.send(message).await {
            Ok(()) => delivered += 1,
            Err(e) => warn!("Transport '{}' failed to send {}: {}", transport.name(), message, e),
        }
    }
    delivered
}
