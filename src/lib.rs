/// LCXL-SEQ - a step sequencer played on a Launch Control XL
///
/// This library provides the core components:
/// - A polled clock with periodic ticks and one-shot events
/// - Control elements (knobs, mode buttons, radio groups) with LED feedback
/// - The step sequencer and its step-resolution rules
/// - MIDI adapters for the controller, and an optional audio gate monitor

pub mod color;
pub mod config;
pub mod control;
pub mod error;
pub mod midi;
pub mod output;
pub mod sequencer;

#[cfg(feature = "audio")]
pub mod audio;

// Re-export commonly used types
pub use color::Color;
pub use config::{DutySource, Layout, SequencerConfig};
pub use control::{ControlChange, ControlEvent, ControlRegistry};
pub use error::{ConfigError, Error, Result};
pub use midi::{InputSource, MidiInputSource, MidiLedOutput};
pub use output::{LedSink, LogNoteSink, NoteEvent, NoteSink};
pub use sequencer::{Clock, Sequencer, SequencerEvent, StepInfo};

#[cfg(feature = "audio")]
pub use audio::AudioMonitor;
