//! Control registry
//!
//! Ordered catalog of CC controls. Order is the grid order: the first four
//! entries are the module headers and every later row lines up under them.

use crate::error::{ControlError, Result};
use crate::labels::LabelScheme;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Highest valid 7-bit CC number or value
pub const CC_MAX: u8 = 127;

/// A single CC control definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlDefinition {
    /// CC number on the wire (0-127)
    #[serde(rename = "cc")]
    pub address: u8,
    /// Stable key used for lookup and state restore
    #[serde(rename = "id")]
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub default: u8,
    #[serde(default, skip_serializing_if = "is_raw")]
    pub labels: LabelScheme,
}

fn is_raw(scheme: &LabelScheme) -> bool {
    *scheme == LabelScheme::Raw
}

impl ControlDefinition {
    pub fn new(address: u8, identifier: &str, name: &str, default: u8) -> Self {
        Self {
            address,
            identifier: identifier.to_string(),
            name: name.to_string(),
            default,
            labels: LabelScheme::Raw,
        }
    }

    pub fn with_labels(mut self, labels: LabelScheme) -> Self {
        self.labels = labels;
        self
    }

    /// Display text for a value of this control
    pub fn describe(&self, value: u8) -> String {
        self.labels.describe(value)
    }
}

/// Built-in Chroma Console controls, in grid order
const CHROMA_CONSOLE: &[(u8, &str, &str, u8, LabelScheme)] = &[
    // Modules
    (16, "cModule", "Character Module", 0, LabelScheme::CharacterModule),
    (17, "mModule", "Movement Module", 22, LabelScheme::MovementModule),
    (18, "dModule", "Diffusion Module", 44, LabelScheme::DiffusionModule),
    (19, "tModule", "Texture Module", 0, LabelScheme::TextureModule),
    // Primary
    (64, "tilt", "Tilt", 63, LabelScheme::Raw),
    (66, "rate", "Rate", 127, LabelScheme::Raw),
    (68, "time", "Time", 127, LabelScheme::Raw),
    (71, "tAmount", "Amount (Texture)", 63, LabelScheme::Raw),
    (65, "cAmount", "Amount (Character)", 63, LabelScheme::Raw),
    (67, "mAmount", "Amount (Movement)", 63, LabelScheme::Raw),
    (69, "dAmount", "Amount (Diffusion)", 63, LabelScheme::Raw),
    (79, "tVol", "Effect Volume (Texture)", 63, LabelScheme::Raw),
    // Secondary
    (72, "sensitivity", "Sensitivity", 63, LabelScheme::Raw),
    (74, "mDrift", "Drift (Movement)", 63, LabelScheme::Raw),
    (76, "dDrift", "Drift (Diffusion)", 63, LabelScheme::Raw),
    (70, "mix", "Mix", 127, LabelScheme::Raw),
    (73, "cVol", "Effect Volume (Character)", 63, LabelScheme::Raw),
    (75, "mVol", "Effect Volume (Movement)", 63, LabelScheme::Raw),
    (77, "dVol", "Effect Volume (Diffusion)", 63, LabelScheme::Raw),
    (78, "level", "Output Level", 127, LabelScheme::Raw),
    // Bypass
    (91, "bypass1", "Standard Bypass", 127, LabelScheme::StandardBypass),
    (92, "bypass2", "Dual Bypass", 127, LabelScheme::DualBypass),
    // Other functions. Tap tempo (CC 93) is left out: it interrupts the
    // host's MIDI clock on the pedal.
    (82, "capture", "Capture", 0, LabelScheme::Capture),
    (84, "filterMode", "Filter Mode", 63, LabelScheme::FilterMode),
    (80, "gesturePlayRec", "Gesture Play/Record", 0, LabelScheme::GesturePlayRecord),
    (81, "gestureStopErase", "Gesture Stop/Erase", 127, LabelScheme::GestureStopErase),
    (83, "captureRouting", "Capture Routing", 0, LabelScheme::CaptureRouting),
    (94, "calibrationLevel", "Calibration Level", 63, LabelScheme::CalibrationLevel),
];

/// Immutable, ordered set of control definitions
#[derive(Debug, Clone)]
pub struct ControlRegistry {
    controls: Vec<ControlDefinition>,
    by_identifier: HashMap<String, usize>,
}

impl ControlRegistry {
    /// Build a registry, rejecting duplicate addresses or identifiers
    pub fn new(controls: Vec<ControlDefinition>) -> Result<Self> {
        let mut by_identifier = HashMap::with_capacity(controls.len());
        let mut seen_addresses: HashMap<u8, &str> = HashMap::new();

        for (index, control) in controls.iter().enumerate() {
            if control.identifier.trim().is_empty() {
                return Err(ControlError::InvalidControl {
                    identifier: control.identifier.clone(),
                    reason: "empty identifier".to_string(),
                });
            }
            if control.address > CC_MAX {
                return Err(ControlError::InvalidControl {
                    identifier: control.identifier.clone(),
                    reason: format!("CC address {} above {}", control.address, CC_MAX),
                });
            }
            if control.default > CC_MAX {
                return Err(ControlError::InvalidControl {
                    identifier: control.identifier.clone(),
                    reason: format!("default {} above {}", control.default, CC_MAX),
                });
            }
            if seen_addresses
                .insert(control.address, &control.identifier)
                .is_some()
            {
                return Err(ControlError::DuplicateAddress {
                    address: control.address,
                    identifier: control.identifier.clone(),
                });
            }
            if by_identifier
                .insert(control.identifier.clone(), index)
                .is_some()
            {
                return Err(ControlError::DuplicateIdentifier(
                    control.identifier.clone(),
                ));
            }
        }

        debug!("Control registry built with {} controls", controls.len());

        Ok(Self {
            controls,
            by_identifier,
        })
    }

    /// The Chroma Console control set
    pub fn chroma_console() -> Self {
        let controls = CHROMA_CONSOLE
            .iter()
            .map(|&(address, id, name, default, labels)| {
                ControlDefinition::new(address, id, name, default).with_labels(labels)
            })
            .collect();

        Self::new(controls).expect("built-in control table has unique addresses and identifiers")
    }

    /// Look up a control by identifier
    pub fn lookup(&self, identifier: &str) -> Result<&ControlDefinition> {
        self.index_of(identifier)
            .map(|index| &self.controls[index])
            .ok_or_else(|| ControlError::NotFound(identifier.to_string()))
    }

    /// Position of a control in grid order
    pub fn index_of(&self, identifier: &str) -> Option<usize> {
        self.by_identifier.get(identifier).copied()
    }

    pub fn get(&self, index: usize) -> Option<&ControlDefinition> {
        self.controls.get(index)
    }

    /// All controls in declaration order
    pub fn all(&self) -> impl Iterator<Item = &ControlDefinition> + '_ {
        self.controls.iter()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

impl Default for ControlRegistry {
    fn default() -> Self {
        Self::chroma_console()
    }
}
