/// Physical controls of the grid controller
///
/// A control is bound to a MIDI channel and control number. Knobs and faders
/// are [`Controller`]s that only reflect state on their LED; buttons are
/// [`Button`]s that cycle through [`Mode`]s and react to presses. All of them
/// live in a [`ControlRegistry`], which routes incoming control changes.
use crate::color::Color;
use crate::output::LedSink;

mod mode;
mod radio;
mod registry;

pub use mode::{LineKind, Mode, ModeBehavior};
pub use radio::RadioButtons;
pub use registry::{ControlEvent, ControlRegistry, ElementId, RadioId};

/// Button values at or above this are a press, below a release.
pub const PRESS_THRESHOLD: u8 = 64;

/// A control change message: `value` is 0-127.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlChange {
    pub channel: u8,
    pub control: u8,
    pub value: u8,
}

impl ControlChange {
    pub fn new(channel: u8, control: u8, value: u8) -> Self {
        Self {
            channel,
            control,
            value,
        }
    }

    /// Decode a raw MIDI message, keeping only control changes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [status, control, value, ..] if status & 0xF0 == 0xB0 => Some(Self {
                channel: status & 0x0F,
                control: control & 0x7F,
                value: value & 0x7F,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlAddress {
    pub channel: u8,
    pub number: u8,
}

impl ControlAddress {
    pub fn new(channel: u8, number: u8) -> Self {
        Self { channel, number }
    }

    pub fn matches(&self, channel: u8, number: u8) -> bool {
        self.channel == channel && self.number == number
    }
}

fn send_color(led_index: Option<u8>, color: Color, leds: &mut dyn LedSink) {
    if let Some(led) = led_index {
        log::trace!("led {} <- {:?}", led, color);
        leds.send_led_color(led, color.encode());
    }
}

/// Read-only element such as a knob or fader.
#[derive(Debug, Clone)]
pub struct Controller {
    address: ControlAddress,
    value: Option<u8>,
    led_index: Option<u8>,
    is_current_step: bool,
}

impl Controller {
    pub fn new(address: ControlAddress, led_index: Option<u8>, is_current_step: bool) -> Self {
        Self {
            address,
            value: None,
            led_index,
            is_current_step,
        }
    }

    pub fn address(&self) -> ControlAddress {
        self.address
    }

    /// `None` until the first control change arrives.
    pub fn value(&self) -> Option<u8> {
        self.value
    }

    pub fn led_index(&self) -> Option<u8> {
        self.led_index
    }

    pub fn is_current_step(&self) -> bool {
        self.is_current_step
    }

    pub fn led_color(&self) -> Color {
        match (self.value.is_some(), self.is_current_step) {
            (false, true) => Color::RED_3,
            (false, false) => Color::RED_1,
            (true, true) => Color::GREEN_3,
            (true, false) => Color::GREEN_1,
        }
    }

    pub fn render(&self, leds: &mut dyn LedSink) {
        send_color(self.led_index, self.led_color(), leds);
    }

    /// Returns whether the change was addressed to this controller. The LED
    /// only updates on the first value received.
    pub fn set_value(&mut self, channel: u8, number: u8, value: u8, leds: &mut dyn LedSink) -> bool {
        if !self.address.matches(channel, number) {
            return false;
        }
        let previous = self.value.replace(value);
        if previous.is_none() {
            self.render(leds);
        }
        true
    }

    /// Returns whether the flag changed.
    pub fn set_is_current_step(&mut self, is_current_step: bool, leds: &mut dyn LedSink) -> bool {
        if self.is_current_step == is_current_step {
            return false;
        }
        self.is_current_step = is_current_step;
        self.render(leds);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Press,
    Release,
    CurrentStepChanged,
}

/// What a button does when one of its events fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Move to the next mode and show its color.
    AdvanceMode,
    /// Show the current mode's color for the current-step flag.
    RenderStepColor,
    /// Select `position` in a radio group.
    Select { group: RadioId, position: usize },
}

/// Momentary button with an ordered list of modes.
#[derive(Debug, Clone)]
pub struct Button {
    address: ControlAddress,
    value: Option<u8>,
    led_index: Option<u8>,
    is_current_step: bool,
    modes: &'static [Mode],
    mode_index: usize,
    on_press: Vec<Reaction>,
    on_release: Vec<Reaction>,
    on_current_step: Vec<Reaction>,
}

impl Button {
    pub fn new(
        address: ControlAddress,
        led_index: Option<u8>,
        modes: &'static [Mode],
        is_current_step: bool,
    ) -> Self {
        Self {
            address,
            value: None,
            led_index,
            is_current_step,
            modes,
            mode_index: 0,
            on_press: Vec::new(),
            on_release: Vec::new(),
            on_current_step: Vec::new(),
        }
    }

    pub fn address(&self) -> ControlAddress {
        self.address
    }

    pub fn value(&self) -> Option<u8> {
        self.value
    }

    pub fn led_index(&self) -> Option<u8> {
        self.led_index
    }

    pub fn is_current_step(&self) -> bool {
        self.is_current_step
    }

    pub fn modes(&self) -> &'static [Mode] {
        self.modes
    }

    pub fn mode_index(&self) -> usize {
        self.mode_index
    }

    /// `None` for buttons without modes, such as radio group members.
    pub fn mode(&self) -> Option<&'static Mode> {
        self.modes.get(self.mode_index)
    }

    /// Jump to a mode without rendering. Out of range indices wrap.
    pub fn set_mode_index(&mut self, index: usize) {
        if !self.modes.is_empty() {
            self.mode_index = index % self.modes.len();
        }
    }

    pub fn subscribe(&mut self, event: ButtonEvent, reaction: Reaction) {
        match event {
            ButtonEvent::Press => self.on_press.push(reaction),
            ButtonEvent::Release => self.on_release.push(reaction),
            ButtonEvent::CurrentStepChanged => self.on_current_step.push(reaction),
        }
    }

    pub fn reactions(&self, event: ButtonEvent) -> &[Reaction] {
        match event {
            ButtonEvent::Press => &self.on_press,
            ButtonEvent::Release => &self.on_release,
            ButtonEvent::CurrentStepChanged => &self.on_current_step,
        }
    }

    /// Returns the press or release the change amounts to, if it was
    /// addressed to this button.
    pub fn set_value(&mut self, channel: u8, number: u8, value: u8) -> Option<ButtonEvent> {
        if !self.address.matches(channel, number) {
            return None;
        }
        self.value = Some(value);
        if value < PRESS_THRESHOLD {
            Some(ButtonEvent::Release)
        } else {
            Some(ButtonEvent::Press)
        }
    }

    /// Returns the event to fire if the flag changed.
    pub fn set_is_current_step(&mut self, is_current_step: bool) -> Option<ButtonEvent> {
        if self.is_current_step == is_current_step {
            return None;
        }
        self.is_current_step = is_current_step;
        Some(ButtonEvent::CurrentStepChanged)
    }

    pub fn step_color(&self) -> Option<Color> {
        self.mode().map(|mode| mode.color(self.is_current_step))
    }

    pub fn advance_mode(&mut self, leds: &mut dyn LedSink) {
        if self.modes.is_empty() {
            return;
        }
        self.mode_index = (self.mode_index + 1) % self.modes.len();
        self.render_step_color(leds);
    }

    pub fn render_step_color(&self, leds: &mut dyn LedSink) {
        if let Some(color) = self.step_color() {
            self.render(color, leds);
        }
    }

    pub fn render(&self, color: Color, leds: &mut dyn LedSink) {
        send_color(self.led_index, color, leds);
    }
}

#[derive(Debug, Clone)]
pub enum ControlElement {
    Controller(Controller),
    Button(Button),
}

impl ControlElement {
    pub fn address(&self) -> ControlAddress {
        match self {
            ControlElement::Controller(c) => c.address(),
            ControlElement::Button(b) => b.address(),
        }
    }

    pub fn value(&self) -> Option<u8> {
        match self {
            ControlElement::Controller(c) => c.value(),
            ControlElement::Button(b) => b.value(),
        }
    }

    pub fn led_index(&self) -> Option<u8> {
        match self {
            ControlElement::Controller(c) => c.led_index(),
            ControlElement::Button(b) => b.led_index(),
        }
    }

    pub fn is_current_step(&self) -> bool {
        match self {
            ControlElement::Controller(c) => c.is_current_step(),
            ControlElement::Button(b) => b.is_current_step(),
        }
    }

    pub fn as_button(&self) -> Option<&Button> {
        match self {
            ControlElement::Button(b) => Some(b),
            ControlElement::Controller(_) => None,
        }
    }

    pub fn as_controller(&self) -> Option<&Controller> {
        match self {
            ControlElement::Controller(c) => Some(c),
            ControlElement::Button(_) => None,
        }
    }

    /// Show an arbitrary color, ignoring the element's own state.
    pub fn render(&self, color: Color, leds: &mut dyn LedSink) {
        send_color(self.led_index(), color, leds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::modes::{GATE_LINE_MODES, STEP_LINE_MODES};

    fn addr(number: u8) -> ControlAddress {
        ControlAddress::new(0, number)
    }

    #[test]
    fn test_from_bytes_filters_non_cc() {
        assert_eq!(
            ControlChange::from_bytes(&[0xB2, 13, 100]),
            Some(ControlChange::new(2, 13, 100))
        );
        assert_eq!(ControlChange::from_bytes(&[0x90, 60, 100]), None);
        assert_eq!(ControlChange::from_bytes(&[0xB0, 13]), None);
        assert_eq!(ControlChange::from_bytes(&[]), None);
    }

    #[test]
    fn test_controller_colors() {
        let mut leds: Vec<(u8, u8)> = Vec::new();
        let mut c = Controller::new(addr(13), Some(0), false);
        assert_eq!(c.led_color(), Color::RED_1);
        c.set_is_current_step(true, &mut leds);
        assert_eq!(c.led_color(), Color::RED_3);
        c.set_value(0, 13, 5, &mut leds);
        assert_eq!(c.led_color(), Color::GREEN_3);
        c.set_is_current_step(false, &mut leds);
        assert_eq!(c.led_color(), Color::GREEN_1);
    }

    #[test]
    fn test_controller_renders_on_first_value_only() {
        let mut leds: Vec<(u8, u8)> = Vec::new();
        let mut c = Controller::new(addr(13), Some(4), false);
        assert!(c.set_value(0, 13, 10, &mut leds));
        assert!(c.set_value(0, 13, 20, &mut leds));
        assert_eq!(leds, vec![(4, Color::GREEN_1.encode())]);
        assert_eq!(c.value(), Some(20));
    }

    #[test]
    fn test_controller_ignores_other_addresses() {
        let mut leds: Vec<(u8, u8)> = Vec::new();
        let mut c = Controller::new(addr(13), Some(4), false);
        assert!(!c.set_value(1, 13, 10, &mut leds));
        assert!(!c.set_value(0, 14, 10, &mut leds));
        assert_eq!(c.value(), None);
        assert!(leds.is_empty());
    }

    #[test]
    fn test_controller_without_led_is_silent() {
        let mut leds: Vec<(u8, u8)> = Vec::new();
        let mut c = Controller::new(addr(77), None, false);
        c.set_value(0, 77, 1, &mut leds);
        c.set_is_current_step(true, &mut leds);
        assert!(leds.is_empty());
    }

    #[test]
    fn test_button_press_threshold() {
        let mut b = Button::new(addr(41), Some(24), &GATE_LINE_MODES, false);
        assert_eq!(b.set_value(0, 41, 63), Some(ButtonEvent::Release));
        assert_eq!(b.set_value(0, 41, 64), Some(ButtonEvent::Press));
        assert_eq!(b.set_value(0, 42, 127), None);
        assert_eq!(b.value(), Some(64));
    }

    #[test]
    fn test_mode_cycling_returns_home() {
        let mut leds: Vec<(u8, u8)> = Vec::new();
        for k in 1..=STEP_LINE_MODES.len() {
            for start in 0..k {
                let mut b = Button::new(addr(73), None, &STEP_LINE_MODES[..k], false);
                b.set_mode_index(start);
                for press in 1..=k {
                    b.advance_mode(&mut leds);
                    assert_eq!(b.mode_index() == start, press == k);
                }
            }
        }
    }

    #[test]
    fn test_advance_renders_new_mode_color() {
        let mut leds: Vec<(u8, u8)> = Vec::new();
        let mut b = Button::new(addr(41), Some(24), &GATE_LINE_MODES, true);
        b.advance_mode(&mut leds);
        assert_eq!(b.mode().map(|m| m.name), Some("TIE"));
        assert_eq!(leds, vec![(24, Color::YELLOW_3.encode())]);
    }

    #[test]
    fn test_current_step_change_fires_once() {
        let mut b = Button::new(addr(41), Some(24), &GATE_LINE_MODES, false);
        assert_eq!(b.set_is_current_step(true), Some(ButtonEvent::CurrentStepChanged));
        assert_eq!(b.set_is_current_step(true), None);
        assert_eq!(b.step_color(), Some(Color::GREEN_3));
    }

    #[test]
    fn test_modeless_button_has_no_step_color() {
        let mut leds: Vec<(u8, u8)> = Vec::new();
        let mut b = Button::new(addr(105), Some(40), &[], false);
        b.advance_mode(&mut leds);
        b.render_step_color(&mut leds);
        assert_eq!(b.mode(), None);
        assert!(leds.is_empty());
    }
}
