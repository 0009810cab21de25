/// Sinks the core talks to: LED feedback and musical output
///
/// The core never waits on either; sends are fire-and-forget.
use crate::sequencer::StepInfo;

/// Receives encoded LED color commands (see [`Color::encode`](crate::Color::encode)).
pub trait LedSink {
    fn send_led_color(&mut self, led_index: u8, color: u8);
}

/// Records every LED command in order.
impl LedSink for Vec<(u8, u8)> {
    fn send_led_color(&mut self, led_index: u8, color: u8) {
        self.push((led_index, color));
    }
}

/// Receives trigger and gate events as the sequencer plays.
pub trait NoteSink {
    /// Trigger pulse start, carrying the parameters of the step.
    fn note_on(&mut self, info: &StepInfo);
    /// Trigger pulse end.
    fn note_off(&mut self);
    fn gate_on(&mut self, note: u8, cv1: u8);
    fn gate_off(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteEvent {
    NoteOn(StepInfo),
    NoteOff,
    GateOn { note: u8, cv1: u8 },
    GateOff,
}

impl NoteSink for Vec<NoteEvent> {
    fn note_on(&mut self, info: &StepInfo) {
        self.push(NoteEvent::NoteOn(*info));
    }

    fn note_off(&mut self) {
        self.push(NoteEvent::NoteOff);
    }

    fn gate_on(&mut self, note: u8, cv1: u8) {
        self.push(NoteEvent::GateOn { note, cv1 });
    }

    fn gate_off(&mut self) {
        self.push(NoteEvent::GateOff);
    }
}

/// Diagnostic sink: writes every event to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNoteSink;

impl NoteSink for LogNoteSink {
    fn note_on(&mut self, info: &StepInfo) {
        log::info!("trigger on {:?}", info);
    }

    fn note_off(&mut self) {
        log::info!("trigger off");
    }

    fn gate_on(&mut self, note: u8, cv1: u8) {
        log::info!("gate on with note {} cv1 {}", note, cv1);
    }

    fn gate_off(&mut self) {
        log::info!("gate off");
    }
}

/// Fan out to two sinks, first then second.
impl<A: NoteSink, B: NoteSink> NoteSink for (A, B) {
    fn note_on(&mut self, info: &StepInfo) {
        self.0.note_on(info);
        self.1.note_on(info);
    }

    fn note_off(&mut self) {
        self.0.note_off();
        self.1.note_off();
    }

    fn gate_on(&mut self, note: u8, cv1: u8) {
        self.0.gate_on(note, cv1);
        self.1.gate_on(note, cv1);
    }

    fn gate_off(&mut self) {
        self.0.gate_off();
        self.1.gate_off();
    }
}

/// An absent sink drops everything.
impl<T: NoteSink> NoteSink for Option<T> {
    fn note_on(&mut self, info: &StepInfo) {
        if let Some(sink) = self {
            sink.note_on(info);
        }
    }

    fn note_off(&mut self) {
        if let Some(sink) = self {
            sink.note_off();
        }
    }

    fn gate_on(&mut self, note: u8, cv1: u8) {
        if let Some(sink) = self {
            sink.gate_on(note, cv1);
        }
    }

    fn gate_off(&mut self) {
        if let Some(sink) = self {
            sink.gate_off();
        }
    }
}
