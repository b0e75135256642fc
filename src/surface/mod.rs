//! Control surface - the processor-level view of the engine
//!
//! Owns the registry, the change-diff emitter, the column resolver and the
//! output channel. Host code drives it with value changes and periodic ticks
//! and gets back encoded CC messages plus column updates for the UI.

use crate::columns::{ColumnResolver, ColumnUpdate, HeaderValueChanged, RowGroupFlags, NUM_COLUMNS};
use crate::emitter::ChangeDiffEmitter;
use crate::error::Result;
use crate::midi::{ControlChange, MidiChannel};
use crate::registry::{ControlDefinition, ControlRegistry};
use std::sync::Arc;
use tracing::{debug, info};

/// Engine state for one device
pub struct ControlSurface {
    registry: Arc<ControlRegistry>,
    emitter: ChangeDiffEmitter,
    resolver: ColumnResolver,
    channel: MidiChannel,
}

impl ControlSurface {
    pub fn new(registry: Arc<ControlRegistry>, channel: MidiChannel) -> Self {
        let emitter = ChangeDiffEmitter::new(registry.clone());
        let resolver = ColumnResolver::new(registry.len());
        Self {
            registry,
            emitter,
            resolver,
            channel,
        }
    }

    pub fn registry(&self) -> &ControlRegistry {
        &self.registry
    }

    pub fn emitter(&self) -> &ChangeDiffEmitter {
        &self.emitter
    }

    pub fn channel(&self) -> MidiChannel {
        self.channel
    }

    /// Change the output channel; already-sent values are not resent
    pub fn set_channel(&mut self, channel: i32) -> Result<()> {
        let channel = MidiChannel::new(channel)?;
        if channel != self.channel {
            info!("MIDI channel {} -> {}", self.channel, channel);
            self.channel = channel;
        }
        Ok(())
    }

    /// Number of header columns actually present
    fn header_count(&self) -> usize {
        self.registry.len().min(NUM_COLUMNS)
    }

    /// Set a control value.
    ///
    /// Returns the header event when the control heads a column.
    pub fn set_value(&mut self, identifier: &str, value: i32) -> Result<Option<HeaderValueChanged>> {
        self.emitter.set_value(identifier, value)?;

        let event = self
            .registry
            .index_of(identifier)
            .filter(|index| *index < self.header_count())
            .map(|column| HeaderValueChanged {
                column,
                value: value as u8,
            });

        if let Some(event) = event {
            debug!("Header column {} changed to {}", event.column, event.value);
        }
        Ok(event)
    }

    /// Restore values from external storage before the first tick
    pub fn restore<'a, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, i32)>,
    {
        self.emitter.restore(values)
    }

    /// Resolve a header event with the column's default row-groups
    pub fn column_update(&self, event: HeaderValueChanged) -> ColumnUpdate {
        self.resolver
            .on_header_changed(event, RowGroupFlags::for_column(event.column))
    }

    /// Full column state for every header, as needed when a UI attaches
    pub fn layout(&self) -> Vec<ColumnUpdate> {
        (0..self.header_count())
            .filter_map(|column| {
                self.emitter.value_at(column).map(|value| {
                    self.column_update(HeaderValueChanged { column, value })
                })
            })
            .collect()
    }

    /// Processing tick: encode whatever changed since the last tick
    pub fn tick(&mut self) -> Vec<ControlChange> {
        let channel = self.channel;
        self.emitter
            .diff_and_emit()
            .into_iter()
            .map(|event| ControlChange::from_event(channel, event))
            .collect()
    }

    /// Encode every control regardless of change history
    pub fn resend_all(&mut self) -> Vec<ControlChange> {
        let channel = self.channel;
        self.emitter
            .force_resend_all()
            .into_iter()
            .map(|event| ControlChange::from_event(channel, event))
            .collect()
    }

    /// Definition, current value and its display text
    pub fn describe(&self, identifier: &str) -> Result<(&ControlDefinition, u8, String)> {
        let control = self.registry.lookup(identifier)?;
        let value = self.emitter.value(identifier)?;
        Ok((control, value, control.describe(value)))
    }
}

#[cfg(test)]
mod tests;
