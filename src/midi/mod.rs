/// MIDI plumbing for the controller, using midir
///
/// Input: control changes from the controller, decoded on midir's thread
/// and handed over through a channel. Output: LED colors as Launch Control
/// XL "set LED" SysEx messages.
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver};

use midir::{
    Ignore, MidiIO, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection,
};

use crate::control::ControlChange;
use crate::error::{Error, Result};
use crate::output::LedSink;

const CLIENT_NAME: &str = "lcxl-seq";

/// Novation manufacturer id, Launch Control XL product id, "set LED" command.
const SET_LED_HEADER: [u8; 6] = [0x00, 0x20, 0x29, 0x02, 0x11, 0x78];

/// Source of pending control changes; never blocks.
pub trait InputSource {
    fn poll_event(&mut self) -> Option<ControlChange>;
}

impl InputSource for Receiver<ControlChange> {
    fn poll_event(&mut self) -> Option<ControlChange> {
        self.try_recv().ok()
    }
}

/// Replays queued events, oldest first.
impl InputSource for VecDeque<ControlChange> {
    fn poll_event(&mut self) -> Option<ControlChange> {
        self.pop_front()
    }
}

fn port_names<T: MidiIO>(io: &T) -> Vec<String> {
    io.ports()
        .iter()
        .filter_map(|p| io.port_name(p).ok())
        .collect()
}

fn find_port<T: MidiIO>(io: &T, name: &str) -> Result<T::Port> {
    io.ports()
        .into_iter()
        .find(|p| io.port_name(p).is_ok_and(|n| n.contains(name)))
        .ok_or_else(|| Error::PortNotFound(name.to_string()))
}

pub fn available_input_ports() -> Vec<String> {
    MidiInput::new(CLIENT_NAME)
        .map(|midi_in| port_names(&midi_in))
        .unwrap_or_default()
}

pub fn available_output_ports() -> Vec<String> {
    MidiOutput::new(CLIENT_NAME)
        .map(|midi_out| port_names(&midi_out))
        .unwrap_or_default()
}

pub struct MidiInputSource {
    _connection: MidiInputConnection<()>,
    receiver: Receiver<ControlChange>,
}

impl MidiInputSource {
    /// Listen on the first input port whose name contains `port_name`.
    pub fn connect(port_name: &str) -> Result<Self> {
        let mut midi_in =
            MidiInput::new(CLIENT_NAME).map_err(|e| Error::MidiInit(e.to_string()))?;
        midi_in.ignore(Ignore::All);
        let port = find_port(&midi_in, port_name)?;
        let name = midi_in.port_name(&port).unwrap_or_default();

        let (sender, receiver) = channel();
        let connection = midi_in
            .connect(
                &port,
                "lcxl-seq-input",
                move |_timestamp, message, _| {
                    if let Some(change) = ControlChange::from_bytes(message) {
                        let _ = sender.send(change);
                    }
                },
                (),
            )
            .map_err(|e| Error::MidiConnect(e.to_string()))?;

        log::info!("listening on MIDI input '{}'", name);
        Ok(Self {
            _connection: connection,
            receiver,
        })
    }
}

impl InputSource for MidiInputSource {
    fn poll_event(&mut self) -> Option<ControlChange> {
        self.receiver.poll_event()
    }
}

/// Full SysEx message setting `led` in `template` to an encoded color.
pub fn set_led_message(template: u8, led: u8, color: u8) -> [u8; 11] {
    let h = SET_LED_HEADER;
    [0xF0, h[0], h[1], h[2], h[3], h[4], h[5], template, led, color, 0xF7]
}

pub struct MidiLedOutput {
    connection: MidiOutputConnection,
    template: u8,
}

impl MidiLedOutput {
    /// Send to the first output port whose name contains `port_name`.
    pub fn connect(port_name: &str, template: u8) -> Result<Self> {
        let midi_out =
            MidiOutput::new(CLIENT_NAME).map_err(|e| Error::MidiInit(e.to_string()))?;
        let port = find_port(&midi_out, port_name)?;
        let name = midi_out.port_name(&port).unwrap_or_default();
        let connection = midi_out
            .connect(&port, "lcxl-seq-leds")
            .map_err(|e| Error::MidiConnect(e.to_string()))?;

        log::info!("sending LED colors to MIDI output '{}'", name);
        Ok(Self {
            connection,
            template,
        })
    }
}

impl LedSink for MidiLedOutput {
    fn send_led_color(&mut self, led_index: u8, color: u8) {
        let message = set_led_message(self.template, led_index, color);
        if let Err(e) = self.connection.send(&message) {
            log::warn!("dropped LED command for {}: {}", led_index, e);
        }
    }
}
