//! Whole-sequencer playback driven by synthetic time and recording sinks.

use std::time::{Duration, Instant};

use lcxl_seq::control::LineKind;
use lcxl_seq::{Color, ControlChange, DutySource, NoteEvent, Sequencer, SequencerConfig};

type Recorder = Sequencer<Vec<(u8, u8)>, Vec<NoteEvent>>;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// 60 bpm so one tick is one second.
fn recorder(start: Instant) -> Recorder {
    let mut config = SequencerConfig::default();
    config.bpm = 60.0;
    Sequencer::new(&config, start, Vec::new(), Vec::new()).unwrap()
}

fn gate_ons(seq: &Recorder) -> Vec<(u8, u8)> {
    seq.notes()
        .iter()
        .filter_map(|e| match e {
            NoteEvent::GateOn { note, cv1 } => Some((*note, *cv1)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_initial_leds_painted() {
    let seq = recorder(Instant::now());
    let leds = seq.leds();
    // Step 0 knobs start red and bright, others red and dim.
    assert!(leds.contains(&(0, Color::RED_3.encode())));
    assert!(leds.contains(&(1, Color::RED_1.encode())));
    // Gate line button of step 0 shows GATE on the current step.
    assert!(leds.contains(&(24, Color::GREEN_3.encode())));
    // Radio group: first member selected.
    assert!(leds.contains(&(40, Color::GREEN_3.encode())));
    assert!(leds.contains(&(43, Color::OFF.encode())));
    // Faders have no LED.
    assert!(leds.iter().all(|(led, _)| *led <= 43));
}

#[test]
fn test_ticks_advance_and_play() {
    let start = Instant::now();
    let mut seq = recorder(start);
    seq.dispatch_input(ControlChange::new(0, 14, 70));
    seq.dispatch_input(ControlChange::new(0, 30, 20));

    seq.poll(start + ms(999));
    assert_eq!(seq.current_step(), 0);
    assert!(seq.notes().is_empty());

    seq.poll(start + ms(1000));
    assert_eq!(seq.current_step(), 1);
    assert_eq!(gate_ons(&seq), vec![(70, 20)]);

    seq.poll(start + ms(2003));
    assert_eq!(seq.current_step(), 2);
    assert_eq!(gate_ons(&seq), vec![(70, 20), (64, 64)]);
}

#[test]
fn test_event_order_within_ticks() {
    let start = Instant::now();
    let mut seq = recorder(start);
    for t in [1000, 1001, 1900, 2000] {
        seq.poll(start + ms(t));
    }
    let kinds: Vec<&str> = seq
        .notes()
        .iter()
        .map(|e| match e {
            NoteEvent::NoteOn(_) => "note_on",
            NoteEvent::NoteOff => "note_off",
            NoteEvent::GateOn { .. } => "gate_on",
            NoteEvent::GateOff => "gate_off",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["note_on", "gate_on", "note_off", "gate_off", "note_on", "gate_on"]
    );
}

#[test]
fn test_full_duty_gate_closes_before_next_opens() {
    let start = Instant::now();
    let mut config = SequencerConfig::default();
    config.bpm = 60.0;
    config.duty = DutySource::GateLine;
    let mut seq: Recorder = Sequencer::new(&config, start, Vec::new(), Vec::new()).unwrap();
    // TIE on step 1.
    seq.dispatch_input(ControlChange::new(0, 42, 127));

    seq.poll(start + ms(1000));
    seq.poll(start + ms(1001));
    seq.poll(start + ms(2001));
    let tail: Vec<_> = seq.notes().iter().skip(3).collect();
    assert_eq!(tail[0], &NoteEvent::GateOff);
    assert!(matches!(tail[1], NoteEvent::NoteOn(_)));
}

#[test]
fn test_stop_holds_playback_but_retriggers() {
    let start = Instant::now();
    let mut seq = recorder(start);
    seq.set_step_line_mode(1, LineKind::Stop);

    for t in [1000, 2000, 3000] {
        seq.poll(start + ms(t));
        assert_eq!(seq.current_step(), 1);
    }
    assert_eq!(gate_ons(&seq).len(), 3);
}

#[test]
fn test_highlight_follows_playback() {
    let start = Instant::now();
    let mut seq = recorder(start);
    seq.dispatch_input(ControlChange::new(0, 14, 1));
    seq.leds_mut().clear();

    seq.poll(start + ms(1000));
    let leds = seq.leds();
    // Send A knob of step 1 had a value: bright green. Step 0's goes dim red.
    assert!(leds.contains(&(1, Color::GREEN_3.encode())));
    assert!(leds.contains(&(0, Color::RED_1.encode())));
    // Gate-line buttons swap current-step colors.
    assert!(leds.contains(&(25, Color::GREEN_3.encode())));
    assert!(leds.contains(&(24, Color::OFF.encode())));
    // Untouched steps are not repainted.
    assert!(!leds.iter().any(|(led, _)| *led == 2));
}

#[test]
fn test_skip_and_reset_pattern() {
    let start = Instant::now();
    let mut seq = recorder(start);
    seq.set_step_line_mode(0, LineKind::Skip);
    seq.set_step_line_mode(2, LineKind::Skip);
    seq.set_step_line_mode(4, LineKind::Reset);

    let mut visited = Vec::new();
    for n in 1..=6 {
        seq.poll(start + ms(1000 * n));
        visited.push(seq.current_step());
    }
    assert_eq!(visited, vec![1, 3, 1, 3, 1, 3]);
}

#[test]
fn test_overlapping_gates_each_close() {
    let start = Instant::now();
    let mut seq = recorder(start);
    seq.poll(start + ms(1000));
    // Replay the same step by hand before its gate has closed.
    seq.step(Some(1));
    seq.poll(start + ms(1900));
    let gate_offs = seq
        .notes()
        .iter()
        .filter(|e| **e == NoteEvent::GateOff)
        .count();
    assert_eq!(gate_offs, 2);
}

#[test]
fn test_full_duty_gate_closes_before_next_opens_when_polled_late() {
    let start = Instant::now();
    let mut config = SequencerConfig::default();
    config.bpm = 60.0;
    config.duty = DutySource::GateLine;
    let mut seq: Recorder = Sequencer::new(&config, start, Vec::new(), Vec::new()).unwrap();
    // TIE on step 1.
    seq.dispatch_input(ControlChange::new(0, 42, 127));

    for t in [1003, 1004, 2001, 2003] {
        seq.poll(start + ms(t));
    }
    let kinds: Vec<&str> = seq
        .notes()
        .iter()
        .map(|e| match e {
            NoteEvent::NoteOn(_) => "note_on",
            NoteEvent::NoteOff => "note_off",
            NoteEvent::GateOn { .. } => "gate_on",
            NoteEvent::GateOff => "gate_off",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["note_on", "gate_on", "note_off", "gate_off", "note_on", "gate_on", "note_off"]
    );
}
