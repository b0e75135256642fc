//! Value labels
//!
//! Maps a raw 0-127 CC value to the text the pedal shows for it. The module
//! selectors split the range into five 22-step zones with "Off" above 109.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Labelling scheme attached to a control definition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelScheme {
    /// Plain number
    #[default]
    Raw,
    CharacterModule,
    MovementModule,
    DiffusionModule,
    TextureModule,
    StandardBypass,
    DualBypass,
    GesturePlayRecord,
    GestureStopErase,
    Capture,
    CaptureRouting,
    FilterMode,
    CalibrationLevel,
}

const CHARACTER: [&str; 5] = ["Drive", "Sweeten", "Fuzz", "Howl", "Swell"];
const MOVEMENT: [&str; 5] = ["Doubler", "Vibrato", "Phaser", "Tremolo", "Pitch"];
const DIFFUSION: [&str; 5] = ["Cascade", "Reels", "Space", "Collage", "Reverse"];
const TEXTURE: [&str; 5] = ["Filter", "Squash", "Cassette", "Broken", "Interference"];

/// Module selector zone: 0-21, 22-43, 44-65, 66-87, 88-109, then Off
fn module_zone(names: &[&'static str; 5], value: u8) -> &'static str {
    match value {
        0..=21 => names[0],
        22..=43 => names[1],
        44..=65 => names[2],
        66..=87 => names[3],
        88..=109 => names[4],
        _ => "Off",
    }
}

fn two_way(value: u8, low: &'static str, high: &'static str) -> &'static str {
    if value <= 63 {
        low
    } else {
        high
    }
}

fn three_way(value: u8, names: [&'static str; 3]) -> &'static str {
    match value {
        0..=43 => names[0],
        44..=87 => names[1],
        _ => names[2],
    }
}

impl LabelScheme {
    /// Label for a value, `None` for the raw scheme
    pub fn label(self, value: u8) -> Option<&'static str> {
        let text = match self {
            LabelScheme::Raw => return None,
            LabelScheme::CharacterModule => module_zone(&CHARACTER, value),
            LabelScheme::MovementModule => module_zone(&MOVEMENT, value),
            LabelScheme::DiffusionModule => module_zone(&DIFFUSION, value),
            LabelScheme::TextureModule => module_zone(&TEXTURE, value),
            LabelScheme::StandardBypass => two_way(value, "Bypass", "Engage"),
            LabelScheme::DualBypass => match value {
                0..=31 => "Total Bypass",
                32..=64 => "Dual Bypass",
                _ => "Total Engage",
            },
            LabelScheme::GesturePlayRecord => two_way(value, "Play", "Record"),
            LabelScheme::GestureStopErase => two_way(value, "Stop", "Erase"),
            LabelScheme::Capture => three_way(value, ["Stop/Clear", "Play", "Record"]),
            LabelScheme::CaptureRouting => two_way(value, "Post-FX", "Pre-FX"),
            LabelScheme::FilterMode => three_way(value, ["LPF", "Tilt", "HPF"]),
            LabelScheme::CalibrationLevel => match value {
                0..=31 => "Low",
                32..=63 => "Medium",
                64..=95 => "High",
                _ => "Very High",
            },
        };
        Some(text)
    }

    /// Display text for a value, falling back to the number
    pub fn describe(self, value: u8) -> String {
        match self.label(value) {
            Some(text) => text.to_string(),
            None => value.to_string(),
        }
    }
}

impl fmt::Display for LabelScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LabelScheme::Raw => "raw",
            LabelScheme::CharacterModule => "character-module",
            LabelScheme::MovementModule => "movement-module",
            LabelScheme::DiffusionModule => "diffusion-module",
            LabelScheme::TextureModule => "texture-module",
            LabelScheme::StandardBypass => "standard-bypass",
            LabelScheme::DualBypass => "dual-bypass",
            LabelScheme::GesturePlayRecord => "gesture-play-record",
            LabelScheme::GestureStopErase => "gesture-stop-erase",
            LabelScheme::Capture => "capture",
            LabelScheme::CaptureRouting => "capture-routing",
            LabelScheme::FilterMode => "filter-mode",
            LabelScheme::CalibrationLevel => "calibration-level",
        };
        write!(f, "{}", name)
    }
}
