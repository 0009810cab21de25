/// Audible gate monitor using cpal
///
/// Plays a sine at the gate note's pitch while the gate is open, louder for
/// higher cv1. Triggers are not sounded.
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::output::NoteSink;
use crate::sequencer::StepInfo;

/// Frequency and amplitude of the open gate.
type Voice = Arc<Mutex<Option<(f32, f32)>>>;

pub struct AudioMonitor {
    _stream: cpal::Stream,
    voice: Voice,
}

impl AudioMonitor {
    pub fn new() -> Result<Self> {
        let voice: Voice = Arc::new(Mutex::new(None));
        let stream = Self::setup_audio_stream(Arc::clone(&voice))?;
        Ok(Self {
            _stream: stream,
            voice,
        })
    }

    fn setup_audio_stream(voice: Voice) -> Result<cpal::Stream> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no default output device".to_string()))?;
        let config = device
            .default_output_config()
            .map_err(|e| Error::Audio(e.to_string()))?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = usize::from(config.channels()).max(1);
        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(Error::Audio(format!(
                "unsupported sample format {:?}",
                config.sample_format()
            )));
        }

        let mut phase = 0.0_f32;
        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let current = voice.lock().map(|v| *v).unwrap_or(None);
                    for frame in data.chunks_mut(channels) {
                        let sample = match current {
                            Some((frequency, amplitude)) => {
                                let s = (phase * 2.0 * std::f32::consts::PI).sin() * amplitude;
                                phase = (phase + frequency / sample_rate) % 1.0;
                                s
                            }
                            None => {
                                phase = 0.0;
                                0.0
                            }
                        };
                        frame.iter_mut().for_each(|out| *out = sample);
                    }
                },
                |err| log::error!("audio stream error: {}", err),
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        Ok(stream)
    }

    fn set_voice(&self, value: Option<(f32, f32)>) {
        if let Ok(mut voice) = self.voice.lock() {
            *voice = value;
        }
    }
}

impl NoteSink for AudioMonitor {
    fn note_on(&mut self, _info: &StepInfo) {}

    fn note_off(&mut self) {}

    fn gate_on(&mut self, note: u8, cv1: u8) {
        self.set_voice(Some((midi_note_to_frequency(note), cv1_to_amplitude(cv1))));
    }

    fn gate_off(&mut self) {
        self.set_voice(None);
    }
}

pub fn midi_note_to_frequency(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((f32::from(note) - 69.0) / 12.0)
}

/// 0-127 onto 0.05-0.3 so a silent knob still sounds faintly.
fn cv1_to_amplitude(cv1: u8) -> f32 {
    0.05 + 0.25 * f32::from(cv1.min(127)) / 127.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_frequency() {
        assert!((midi_note_to_frequency(69) - 440.0).abs() < 1e-3);
        assert!((midi_note_to_frequency(81) - 880.0).abs() < 1e-2);
    }

    #[test]
    fn test_amplitude_range() {
        assert!((cv1_to_amplitude(0) - 0.05).abs() < 1e-6);
        assert!((cv1_to_amplitude(127) - 0.3).abs() < 1e-6);
    }
}
