//! MIDI Control Change encoding
//!
//! Channels are 1-16 everywhere a user sees them and 0-15 on the wire.

use crate::emitter::CcEvent;
use crate::error::{ControlError, Result};
use std::fmt;

const CONTROL_CHANGE: u8 = 0xB0;

/// User-facing MIDI channel (1-16)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MidiChannel(u8);

impl MidiChannel {
    pub fn new(channel: i32) -> Result<Self> {
        if (1..=16).contains(&channel) {
            Ok(Self(channel as u8))
        } else {
            Err(ControlError::InvalidChannel(channel))
        }
    }

    /// 1-16
    pub fn number(self) -> u8 {
        self.0
    }

    /// 0-15, as carried in the status byte
    pub fn wire(self) -> u8 {
        self.0 - 1
    }
}

impl Default for MidiChannel {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for MidiChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Control Change: channel (0-15), cc (0-127), value (0-127)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlChange {
    pub channel: u8,
    pub cc: u8,
    pub value: u8,
}

impl ControlChange {
    /// Wrap an emitted event for a channel
    pub fn from_event(channel: MidiChannel, event: CcEvent) -> Self {
        Self {
            channel: channel.wire(),
            cc: event.address,
            value: event.value,
        }
    }

    /// Parse a Control Change from raw bytes
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 3 || data[0] & 0xF0 != CONTROL_CHANGE {
            return None;
        }
        Some(Self {
            channel: data[0] & 0x0F,
            cc: data[1] & 0x7F,
            value: data[2] & 0x7F,
        })
    }

    /// Encode to MIDI bytes
    pub fn encode(&self) -> [u8; 3] {
        [
            CONTROL_CHANGE | (self.channel & 0x0F),
            self.cc & 0x7F,
            self.value & 0x7F,
        ]
    }
}

impl fmt::Display for ControlChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CC ch:{} cc:{} v:{}", self.channel + 1, self.cc, self.value)
    }
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_range() {
        assert_eq!(MidiChannel::new(1).unwrap().wire(), 0);
        assert_eq!(MidiChannel::new(16).unwrap().wire(), 15);
        assert_eq!(MidiChannel::new(0), Err(ControlError::InvalidChannel(0)));
        assert_eq!(MidiChannel::new(17), Err(ControlError::InvalidChannel(17)));
        assert_eq!(MidiChannel::default().number(), 1);
    }

    #[test]
    fn test_encode_uses_wire_channel() {
        let channel = MidiChannel::new(3).unwrap();
        let msg = ControlChange::from_event(channel, CcEvent::new(64, 100));
        assert_eq!(msg.encode(), [0xB2, 64, 100]);
        assert_eq!(msg.to_string(), "CC ch:3 cc:64 v:100");
    }

    #[test]
    fn test_parse_control_change() {
        let msg = ControlChange::parse(&[0xB2, 7, 100]).unwrap();
        assert_eq!(
            msg,
            ControlChange {
                channel: 2,
                cc: 7,
                value: 100
            }
        );
        assert_eq!(ControlChange::parse(&[0x90, 60, 100]), None);
        assert_eq!(ControlChange::parse(&[0xB0, 7]), None);
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0xB0, 0x40, 0x7F]), "B0 40 7F");
    }
}
