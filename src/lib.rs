//! Chroma CC - MIDI CC control surface engine
//!
//! Tracks a grid of 0-127 controls, sends a Control Change only when a value
//! moves, and derives which controls a module column enables and how it is
//! colored.

pub mod cli;
pub mod columns;
pub mod config;
pub mod emitter;
pub mod error;
pub mod labels;
pub mod midi;
pub mod registry;
pub mod surface;
pub mod transport;

pub use columns::{
    bucket_of, Bucket, Color, ColumnResolver, ColumnUpdate, HeaderValueChanged, RowGroup,
    RowGroupFlags,
};
pub use emitter::{CcEvent, ChangeDiffEmitter, ControlState};
pub use error::{ControlError, Result};
pub use registry::{ControlDefinition, ControlRegistry};
pub use surface::ControlSurface;
