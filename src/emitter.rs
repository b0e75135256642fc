//! Change-diff emitter
//!
//! Holds the current value of every control and the value last put on the
//! wire. Each processing tick emits only what changed, in registry order.
//! A fresh emitter has never sent anything, so its first flush carries the
//! full default state to the device.

use crate::error::{ControlError, Result};
use crate::registry::{ControlRegistry, CC_MAX};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// One outbound wire event: CC address and value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CcEvent {
    pub address: u8,
    pub value: u8,
}

impl CcEvent {
    pub fn new(address: u8, value: u8) -> Self {
        Self { address, value }
    }
}

/// Per-control runtime state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub current: u8,
    /// `None` until the control has been sent once
    pub last_sent: Option<u8>,
}

impl ControlState {
    fn is_dirty(&self) -> bool {
        self.last_sent != Some(self.current)
    }
}

/// Validate a raw value coming from the UI or host
fn check_range(identifier: &str, value: i32) -> Result<u8> {
    if (0..=CC_MAX as i32).contains(&value) {
        Ok(value as u8)
    } else {
        Err(ControlError::OutOfRange {
            identifier: identifier.to_string(),
            value,
        })
    }
}

/// Tracks control values and emits CC events on change
#[derive(Debug, Clone)]
pub struct ChangeDiffEmitter {
    registry: Arc<ControlRegistry>,
    /// Indexed like the registry
    states: Vec<ControlState>,
}

impl ChangeDiffEmitter {
    /// Create state for every registered control, seeded with defaults
    pub fn new(registry: Arc<ControlRegistry>) -> Self {
        let states = registry
            .all()
            .map(|control| ControlState {
                current: control.default,
                last_sent: None,
            })
            .collect();

        Self { registry, states }
    }

    pub fn registry(&self) -> &Arc<ControlRegistry> {
        &self.registry
    }

    fn index(&self, identifier: &str) -> Result<usize> {
        self.registry
            .index_of(identifier)
            .ok_or_else(|| ControlError::UnknownControl(identifier.to_string()))
    }

    /// Set the current value of a control
    ///
    /// The range is checked before the lookup touches anything, so a rejected
    /// call never changes state.
    pub fn set_value(&mut self, identifier: &str, value: i32) -> Result<()> {
        let value = check_range(identifier, value)?;
        let index = self.index(identifier)?;
        self.states[index].current = value;
        trace!("{} = {}", identifier, value);
        Ok(())
    }

    /// Current value of a control
    pub fn value(&self, identifier: &str) -> Result<u8> {
        let index = self.index(identifier)?;
        Ok(self.states[index].current)
    }

    /// Current value by grid position
    pub fn value_at(&self, index: usize) -> Option<u8> {
        self.states.get(index).map(|s| s.current)
    }

    pub fn state(&self, identifier: &str) -> Result<ControlState> {
        let index = self.index(identifier)?;
        Ok(self.states[index])
    }

    /// Restore current values from external storage
    ///
    /// All entries are validated first; nothing is applied unless every one
    /// is a known control with a value in range. Sent state is untouched, so
    /// restored values go out on the next flush.
    pub fn restore<'a, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, i32)>,
    {
        let mut staged = Vec::new();
        for (identifier, value) in values {
            let value = check_range(identifier, value)?;
            let index = self.index(identifier)?;
            staged.push((index, value));
        }

        let count = staged.len();
        for (index, value) in staged {
            self.states[index].current = value;
        }
        debug!("Restored {} control values", count);
        Ok(())
    }

    /// Emit every control whose value differs from what was last sent
    pub fn diff_and_emit(&mut self) -> Vec<CcEvent> {
        let mut events = Vec::new();
        for (control, state) in self.registry.all().zip(self.states.iter_mut()) {
            if state.is_dirty() {
                events.push(CcEvent::new(control.address, state.current));
                state.last_sent = Some(state.current);
            }
        }

        if !events.is_empty() {
            trace!("Diff emitted {} CC events", events.len());
        }
        events
    }

    /// Emit every control unconditionally and mark all as sent
    pub fn force_resend_all(&mut self) -> Vec<CcEvent> {
        for state in &mut self.states {
            state.last_sent = None;
        }
        let events = self.diff_and_emit();
        debug!("Resending all {} controls", events.len());
        events
    }

    /// Number of controls waiting for the next flush
    pub fn pending_count(&self) -> usize {
        self.states.iter().filter(|s| s.is_dirty()).count()
    }

    /// Current values keyed by identifier, for handing to external storage
    pub fn snapshot(&self) -> HashMap<String, u8> {
        self.registry
            .all()
            .zip(self.states.iter())
            .map(|(control, state)| (control.identifier.clone(), state.current))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ControlDefinition;
    use proptest::prelude::*;

    fn three_controls() -> ChangeDiffEmitter {
        let registry = ControlRegistry::new(vec![
            ControlDefinition::new(64, "tilt", "Tilt", 0),
            ControlDefinition::new(66, "rate", "Rate", 0),
            ControlDefinition::new(68, "time", "Time", 0),
        ])
        .unwrap();
        ChangeDiffEmitter::new(Arc::new(registry))
    }

    #[test]
    fn test_first_flush_sends_defaults_once() {
        let registry = Arc::new(ControlRegistry::chroma_console());
        let mut emitter = ChangeDiffEmitter::new(registry.clone());

        let events = emitter.diff_and_emit();
        let expected: Vec<CcEvent> = registry
            .all()
            .map(|c| CcEvent::new(c.address, c.default))
            .collect();
        assert_eq!(events, expected);

        assert!(emitter.diff_and_emit().is_empty());
    }

    #[test]
    fn test_only_delta_is_emitted() {
        let mut emitter = three_controls();
        emitter.diff_and_emit();

        emitter.set_value("tilt", 10).unwrap();
        assert_eq!(emitter.diff_and_emit(), vec![CcEvent::new(64, 10)]);
        assert!(emitter.diff_and_emit().is_empty());
    }

    #[test]
    fn test_emission_follows_registry_order() {
        let mut emitter = three_controls();
        emitter.diff_and_emit();

        emitter.set_value("time", 3).unwrap();
        emitter.set_value("tilt", 1).unwrap();
        assert_eq!(
            emitter.diff_and_emit(),
            vec![CcEvent::new(64, 1), CcEvent::new(68, 3)]
        );
    }

    #[test]
    fn test_setting_same_value_back_is_not_a_change() {
        let mut emitter = three_controls();
        emitter.diff_and_emit();

        emitter.set_value("rate", 90).unwrap();
        emitter.set_value("rate", 0).unwrap();
        assert!(emitter.diff_and_emit().is_empty());
    }

    #[test]
    fn test_force_resend_all() {
        let mut emitter = three_controls();
        emitter.set_value("tilt", 10).unwrap();
        emitter.set_value("rate", 20).unwrap();
        emitter.set_value("time", 30).unwrap();
        emitter.diff_and_emit();

        assert_eq!(
            emitter.force_resend_all(),
            vec![
                CcEvent::new(64, 10),
                CcEvent::new(66, 20),
                CcEvent::new(68, 30)
            ]
        );
        assert!(emitter.diff_and_emit().is_empty());
    }

    #[test]
    fn test_force_resend_before_first_flush() {
        let mut emitter = three_controls();
        assert_eq!(emitter.force_resend_all().len(), 3);
        assert!(emitter.diff_and_emit().is_empty());
    }

    #[test]
    fn test_out_of_range_leaves_state() {
        let registry = Arc::new(ControlRegistry::chroma_console());
        let mut emitter = ChangeDiffEmitter::new(registry);
        emitter.set_value("cModule", 3).unwrap();

        let err = emitter.set_value("cModule", 200).unwrap_err();
        assert_eq!(
            err,
            ControlError::OutOfRange {
                identifier: "cModule".to_string(),
                value: 200
            }
        );
        assert_eq!(emitter.value("cModule").unwrap(), 3);

        assert!(emitter.set_value("cModule", -1).is_err());
        assert_eq!(emitter.value("cModule").unwrap(), 3);
    }

    #[test]
    fn test_unknown_control() {
        let mut emitter = three_controls();
        assert_eq!(
            emitter.set_value("mix", 5).unwrap_err(),
            ControlError::UnknownControl("mix".to_string())
        );
        assert_eq!(emitter.pending_count(), 3);
    }

    #[test]
    fn test_restore_is_all_or_nothing() {
        let mut emitter = three_controls();

        let err = emitter
            .restore([("tilt", 40), ("rate", 128)])
            .unwrap_err();
        assert!(matches!(err, ControlError::OutOfRange { .. }));
        assert_eq!(emitter.value("tilt").unwrap(), 0);

        let err = emitter.restore([("tilt", 40), ("nope", 1)]).unwrap_err();
        assert_eq!(err, ControlError::UnknownControl("nope".to_string()));
        assert_eq!(emitter.value("tilt").unwrap(), 0);

        emitter.restore([("tilt", 40), ("time", 7)]).unwrap();
        assert_eq!(
            emitter.diff_and_emit(),
            vec![CcEvent::new(64, 40), CcEvent::new(66, 0), CcEvent::new(68, 7)]
        );
    }

    #[test]
    fn test_pending_count_and_snapshot() {
        let mut emitter = three_controls();
        assert_eq!(emitter.pending_count(), 3);
        emitter.diff_and_emit();
        assert_eq!(emitter.pending_count(), 0);

        emitter.set_value("time", 99).unwrap();
        assert_eq!(emitter.pending_count(), 1);
        assert_eq!(
            emitter.state("time").unwrap(),
            ControlState {
                current: 99,
                last_sent: Some(0)
            }
        );
        assert_eq!(emitter.snapshot().get("time"), Some(&99));
    }

    proptest! {
        #[test]
        fn prop_second_flush_is_empty(updates in proptest::collection::vec((0usize..3, 0i32..=127), 0..40)) {
            let mut emitter = three_controls();
            let ids = ["tilt", "rate", "time"];
            for (slot, value) in updates {
                emitter.set_value(ids[slot], value).unwrap();
                emitter.diff_and_emit();
                prop_assert!(emitter.diff_and_emit().is_empty());
            }
        }

        #[test]
        fn prop_flush_reports_latest_value(values in proptest::collection::vec(0i32..=127, 1..20)) {
            let mut emitter = three_controls();
            emitter.diff_and_emit();
            for value in &values {
                emitter.set_value("rate", *value).unwrap();
            }
            let last = *values.last().unwrap() as u8;
            let events = emitter.diff_and_emit();
            if last == 0 {
                prop_assert!(events.is_empty());
            } else {
                prop_assert_eq!(events, vec![CcEvent::new(66, last)]);
            }
        }
    }
}
