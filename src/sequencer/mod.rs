/// Step sequencer core - step slots, step resolution and output timing
///
/// The sequencer owns the control registry and a [`Clock`]. Each tick moves
/// playback to the step chosen by the step-line modes, fires a trigger and a
/// gate, and moves the current-step highlight on the controller.
use std::time::Instant;

pub mod clock;
pub mod modes;

pub use clock::Clock;

use crate::color::Color;
use crate::config::{ControlSpec, DutySource, SequencerConfig};
use crate::control::{
    Button, ButtonEvent, ControlAddress, ControlChange, ControlEvent, ControlRegistry,
    Controller, ElementId, LineKind, Mode, RadioId, Reaction,
};
use crate::error::Result;
use crate::output::{LedSink, NoteSink};
use modes::{GATE_LINE_MODES, STEP_LINE_MODES};

/// Note and cv1 sent when the step's controller has not been touched yet.
pub const DEFAULT_VALUE: u8 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    Step,
    TriggerOff,
    GateOff,
}

/// Parameters of one step as read from its controllers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInfo {
    pub note: Option<u8>,
    pub cv1: Option<u8>,
    pub duty_cycle: f32,
}

pub struct Sequencer<L: LedSink, N: NoteSink> {
    total_steps: usize,
    current_step: usize,
    duty: DutySource,
    clock: Clock<SequencerEvent>,
    controls: ControlRegistry,
    /// Per step: value controllers, then the gate-line and step-line buttons.
    step_elements: Vec<Vec<ElementId>>,
    value_elements: Vec<Vec<ElementId>>,
    gate_line: Vec<ElementId>,
    step_line: Vec<ElementId>,
    mode_group: Option<RadioId>,
    leds: L,
    notes: N,
}

impl<L: LedSink, N: NoteSink> Sequencer<L, N> {
    /// Build every control from the layout and paint the initial LED state.
    pub fn new(config: &SequencerConfig, now: Instant, mut leds: L, notes: N) -> Result<Self> {
        config.validate()?;

        let total_steps = config.total_steps;
        let current_step = config.initial_step;
        let channel = config.midi_channel;
        let layout = &config.layout;

        let mut controls = ControlRegistry::new();
        let mut step_elements = vec![Vec::new(); total_steps];
        let mut value_elements = vec![Vec::new(); total_steps];

        for row in &layout.value_rows {
            for (step, spec) in row.iter().enumerate() {
                let controller = Controller::new(
                    ControlAddress::new(channel, spec.cc_number),
                    spec.led_index,
                    step == current_step,
                );
                let id = controls.add_controller(controller, &mut leds);
                step_elements[step].push(id);
                value_elements[step].push(id);
            }
        }

        let mut add_line = |specs: &[ControlSpec], modes: &'static [Mode]| -> Vec<ElementId> {
            specs
                .iter()
                .enumerate()
                .map(|(step, spec)| {
                    let mut button = Button::new(
                        ControlAddress::new(channel, spec.cc_number),
                        spec.led_index,
                        modes,
                        step == current_step,
                    );
                    button.subscribe(ButtonEvent::Press, Reaction::AdvanceMode);
                    button.subscribe(ButtonEvent::CurrentStepChanged, Reaction::RenderStepColor);
                    let id = controls.add_button(button, &mut leds);
                    step_elements[step].push(id);
                    id
                })
                .collect()
        };
        let gate_line = add_line(layout.gate_line.as_slice(), &GATE_LINE_MODES[..]);
        let step_line = add_line(layout.step_line.as_slice(), &STEP_LINE_MODES[..]);

        let mode_group = if layout.mode_buttons.is_empty() {
            None
        } else {
            let members = layout
                .mode_buttons
                .iter()
                .map(|spec| {
                    let button = Button::new(
                        ControlAddress::new(channel, spec.cc_number),
                        spec.led_index,
                        &[],
                        false,
                    );
                    controls.add_button(button, &mut leds)
                })
                .collect();
            Some(controls.add_radio_group(members, 0, Color::GREEN_3, Color::OFF, &mut leds))
        };

        let mut clock = Clock::new(config.bpm, now);
        clock.on_tick(SequencerEvent::Step);

        log::debug!(
            "sequencer ready: {} steps, {} controls, {} bpm",
            total_steps,
            controls.len(),
            config.bpm
        );

        Ok(Self {
            total_steps,
            current_step,
            duty: config.duty,
            clock,
            controls,
            step_elements,
            value_elements,
            gate_line,
            step_line,
            mode_group,
            leds,
            notes,
        })
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn clock(&self) -> &Clock<SequencerEvent> {
        &self.clock
    }

    pub fn controls(&self) -> &ControlRegistry {
        &self.controls
    }

    pub fn step_elements(&self, step: usize) -> &[ElementId] {
        self.step_elements.get(step).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn gate_line_button(&self, step: usize) -> Option<&Button> {
        self.gate_line.get(step).and_then(|id| self.controls.button(*id))
    }

    pub fn step_line_button(&self, step: usize) -> Option<&Button> {
        self.step_line.get(step).and_then(|id| self.controls.button(*id))
    }

    /// Selected position of the mode radio group.
    pub fn selected_mode(&self) -> Option<usize> {
        self.mode_group
            .and_then(|group| self.controls.group(group))
            .map(|group| group.selected())
    }

    /// Put a step-line button straight into the mode of `kind`, repainting it.
    pub fn set_step_line_mode(&mut self, step: usize, kind: LineKind) {
        let index = modes::step_line_index(kind);
        self.set_line_mode(self.step_line.get(step).copied(), index);
    }

    /// Put a gate-line button straight into the mode at `index`, repainting it.
    pub fn set_gate_line_mode(&mut self, step: usize, index: usize) {
        self.set_line_mode(self.gate_line.get(step).copied(), index);
    }

    fn set_line_mode(&mut self, id: Option<ElementId>, index: usize) {
        if let Some(button) = id.and_then(|id| self.controls.button_mut(id)) {
            button.set_mode_index(index);
            button.render_step_color(&mut self.leds);
        }
    }

    pub fn leds(&self) -> &L {
        &self.leds
    }

    pub fn leds_mut(&mut self) -> &mut L {
        &mut self.leds
    }

    pub fn notes(&self) -> &N {
        &self.notes
    }

    pub fn notes_mut(&mut self) -> &mut N {
        &mut self.notes
    }

    /// Route one control change from the controller.
    pub fn dispatch_input(&mut self, change: ControlChange) -> Vec<ControlEvent> {
        self.controls.dispatch(change, &mut self.leds)
    }

    /// Advance the clock to `now` and handle whatever fired.
    pub fn poll(&mut self, now: Instant) {
        for event in self.clock.poll(now) {
            match event {
                SequencerEvent::Step => self.step(None),
                SequencerEvent::TriggerOff => self.notes.note_off(),
                SequencerEvent::GateOff => self.notes.gate_off(),
            }
        }
    }

    fn line_mode(&self, step: usize) -> Option<&'static Mode> {
        self.step_line_button(step).and_then(Button::mode)
    }

    fn first_played_step(&self) -> Option<usize> {
        (0..self.total_steps).find(|&step| self.line_mode(step).is_some_and(Mode::played))
    }

    /// Step that follows `current` under the step-line modes.
    ///
    /// A STOP on `current` holds. Otherwise the next step decides: STEP and
    /// STOP are entered, RESET jumps to the first played step, SKIP is
    /// passed over. Skipping all the way round holds on the step it started
    /// from; at most `total_steps` steps are examined.
    pub fn next_step(&self, current: usize) -> usize {
        let initial = current;
        let mut current = current;
        for _ in 0..self.total_steps {
            if self.line_mode(current).and_then(Mode::line_kind) == Some(LineKind::Stop) {
                return current;
            }
            let candidate = (current + 1) % self.total_steps;
            match self.line_mode(candidate).and_then(Mode::line_kind) {
                Some(LineKind::Reset) => return self.first_played_step().unwrap_or(current),
                Some(LineKind::Skip) => {
                    current = candidate;
                    if current == initial {
                        return current;
                    }
                }
                Some(LineKind::Step | LineKind::Stop) => return candidate,
                None => return current,
            }
        }
        current
    }

    pub fn step_info(&self, step: usize) -> StepInfo {
        let values = self.value_elements.get(step).map(Vec::as_slice).unwrap_or(&[]);
        let value_at = |slot: usize| {
            values
                .get(slot)
                .and_then(|id| self.controls.get(*id))
                .and_then(|element| element.value())
        };
        let duty_cycle = match self.duty {
            DutySource::Fixed(duty) => duty,
            DutySource::GateLine => self
                .gate_line_button(step)
                .and_then(Button::mode)
                .and_then(Mode::duty_cycle)
                .unwrap_or(0.0),
        };
        StepInfo {
            note: value_at(0),
            cv1: value_at(1),
            duty_cycle,
        }
    }

    /// Start a trigger pulse; it ends on the next poll.
    pub fn trigger(&mut self, info: &StepInfo) {
        self.notes.note_on(info);
        self.clock.after(0.0, SequencerEvent::TriggerOff);
    }

    /// Open the gate for `duty_cycle` of one tick interval.
    ///
    /// A gate-off already pending from an earlier gate still fires; there is
    /// no cancellation.
    pub fn gate(&mut self, info: &StepInfo) {
        let note = info.note.unwrap_or(DEFAULT_VALUE);
        let cv1 = info.cv1.unwrap_or(DEFAULT_VALUE);
        self.notes.gate_on(note, cv1);
        let length = f64::from(info.duty_cycle) * self.clock.interval().as_secs_f64();
        self.clock.after(length, SequencerEvent::GateOff);
    }

    fn output(&mut self, info: &StepInfo) {
        self.trigger(info);
        self.gate(info);
    }

    /// Move to `step` (wrapped into range) or, if `None`, to
    /// [`next_step`](Self::next_step). Plays the step, then moves the
    /// current-step highlight.
    pub fn step(&mut self, step: Option<usize>) {
        let step = match step {
            Some(step) => step % self.total_steps,
            None => self.next_step(self.current_step),
        };
        log::debug!("step {} -> {}", self.current_step, step);
        self.current_step = step;

        let info = self.step_info(step);
        self.output(&info);

        for (index, ids) in self.step_elements.iter().enumerate() {
            for id in ids {
                self.controls
                    .set_is_current_step(*id, index == step, &mut self.leds);
            }
        }
    }
}
