/// Run configuration: tempo, step count and the controller layout
///
/// Defaults match a Launch Control XL user template with every button set to
/// send control changes on channel 1. A JSON file may override any field.
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// One physical control: the control number it sends and, if it has one,
/// the index of its LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ControlSpec {
    pub cc_number: u8,
    #[serde(default)]
    pub led_index: Option<u8>,
}

impl ControlSpec {
    pub const fn new(cc_number: u8, led_index: Option<u8>) -> Self {
        Self {
            cc_number,
            led_index,
        }
    }
}

/// Which control answers for what. Row entry `i` belongs to step `i`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Value controllers, in the order they are read for step parameters
    /// (first is the note, second cv1).
    pub value_rows: Vec<Vec<ControlSpec>>,
    /// Chooses each step's gate shape.
    pub gate_line: Vec<ControlSpec>,
    /// Chooses how playback leaves each step.
    pub step_line: Vec<ControlSpec>,
    /// Radio group, not tied to steps.
    pub mode_buttons: Vec<ControlSpec>,
}

fn row(ccs: std::ops::RangeInclusive<u8>, first_led: Option<u8>) -> Vec<ControlSpec> {
    ccs.enumerate()
        .map(|(i, cc)| ControlSpec::new(cc, first_led.map(|led| led + i as u8)))
        .collect()
}

impl Default for Layout {
    fn default() -> Self {
        let send_a = row(13..=20, Some(0));
        let send_b = row(29..=36, Some(8));
        let pan_device = row(49..=56, Some(16));
        let faders = row(77..=84, None);

        let mut gate_line = row(41..=44, Some(24));
        gate_line.extend(row(57..=60, Some(28)));
        let mut step_line = row(73..=76, Some(32));
        step_line.extend(row(89..=92, Some(36)));

        Self {
            value_rows: vec![send_a, send_b, pan_device, faders],
            gate_line,
            step_line,
            mode_buttons: row(105..=108, Some(40)),
        }
    }
}

/// Where the gate length of a step comes from.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutySource {
    /// Same duty cycle for every step.
    Fixed(f32),
    /// Duty cycle of the step's gate-line mode.
    GateLine,
}

impl Default for DutySource {
    fn default() -> Self {
        DutySource::Fixed(0.9)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    pub bpm: f64,
    pub total_steps: usize,
    pub initial_step: usize,
    pub midi_channel: u8,
    pub duty: DutySource,
    /// Substring matched against MIDI port names.
    pub port_name: String,
    /// Template slot LED commands are addressed to.
    pub template: u8,
    pub layout: Layout,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            total_steps: 8,
            initial_step: 0,
            midi_channel: 0,
            duty: DutySource::default(),
            port_name: "Launch Control XL".to_string(),
            template: 0,
            layout: Layout::default(),
        }
    }
}

impl SequencerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let representable = Duration::try_from_secs_f64(60.0 / self.bpm).is_ok();
        if !(self.bpm.is_finite() && self.bpm > 0.0 && representable) {
            return Err(ConfigError::Bpm(self.bpm));
        }
        let steps = self.total_steps;
        if steps == 0 {
            return Err(ConfigError::NoSteps);
        }
        if self.initial_step >= steps {
            return Err(ConfigError::InitialStep {
                step: self.initial_step,
                steps,
            });
        }
        if let DutySource::Fixed(duty) = self.duty {
            if !(0.0..=1.0).contains(&duty) {
                return Err(ConfigError::DutyCycle(duty));
            }
        }

        let layout = &self.layout;
        for (line, specs) in [("gate", &layout.gate_line), ("step", &layout.step_line)] {
            if specs.len() != steps {
                return Err(ConfigError::LineLength {
                    line,
                    expected: steps,
                    found: specs.len(),
                });
            }
        }
        for (row, specs) in layout.value_rows.iter().enumerate() {
            if specs.len() > steps {
                return Err(ConfigError::RowTooLong {
                    row,
                    steps,
                    found: specs.len(),
                });
            }
        }

        let mut seen = HashSet::new();
        let all = layout
            .value_rows
            .iter()
            .flatten()
            .chain(&layout.gate_line)
            .chain(&layout.step_line)
            .chain(&layout.mode_buttons);
        for spec in all {
            if !seen.insert(spec.cc_number) {
                return Err(ConfigError::DuplicateControl(spec.cc_number));
            }
        }
        Ok(())
    }
}
