use thiserror::Error;

/// Problems that only setup can run into; the running sequencer never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to create MIDI client: {0}")]
    MidiInit(String),

    #[error("no MIDI port name contains '{0}'")]
    PortNotFound(String),

    #[error("failed to connect to MIDI port: {0}")]
    MidiConnect(String),

    #[error("audio output unavailable: {0}")]
    Audio(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("bpm must be positive and finite, got {0}")]
    Bpm(f64),

    #[error("at least one step is required")]
    NoSteps,

    #[error("initial step {step} is outside 0..{steps}")]
    InitialStep { step: usize, steps: usize },

    #[error("{line} line has {found} buttons, expected one per step ({expected})")]
    LineLength {
        line: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("value row {row} has {found} controls but there are only {steps} steps")]
    RowTooLong { row: usize, steps: usize, found: usize },

    #[error("duty cycle must be in 0..=1, got {0}")]
    DutyCycle(f32),

    #[error("control number {0} is used more than once")]
    DuplicateControl(u8),
}

pub type Result<T> = std::result::Result<T, Error>;
