/// The two fixed mode tables shared by every line button
use crate::color::Color;
use crate::control::{LineKind, Mode, ModeBehavior};

pub static GATE_LINE_MODES: [Mode; 3] = [
    Mode {
        name: "GATE",
        current_step_color: Color::GREEN_3,
        other_step_color: Color::OFF,
        behavior: ModeBehavior::Gate { duty_cycle: 0.9 },
    },
    Mode {
        name: "TIE",
        current_step_color: Color::YELLOW_3,
        other_step_color: Color::YELLOW_2,
        behavior: ModeBehavior::Gate { duty_cycle: 1.0 },
    },
    Mode {
        name: "SILENT",
        current_step_color: Color::RED_3,
        other_step_color: Color::RED_2,
        behavior: ModeBehavior::Gate { duty_cycle: 0.0 },
    },
];

pub static STEP_LINE_MODES: [Mode; 4] = [
    Mode {
        name: "STEP",
        current_step_color: Color::GREEN_3,
        other_step_color: Color::OFF,
        behavior: ModeBehavior::Line {
            kind: LineKind::Step,
            played: true,
        },
    },
    Mode {
        name: "SKIP",
        current_step_color: Color::YELLOW_3,
        other_step_color: Color::YELLOW_2,
        behavior: ModeBehavior::Line {
            kind: LineKind::Skip,
            played: false,
        },
    },
    Mode {
        name: "RESET",
        current_step_color: Color::RED_3,
        other_step_color: Color::RED_2,
        behavior: ModeBehavior::Line {
            kind: LineKind::Reset,
            played: false,
        },
    },
    Mode {
        name: "STOP",
        current_step_color: Color::GREEN_3,
        other_step_color: Color::GREEN_1,
        behavior: ModeBehavior::Line {
            kind: LineKind::Stop,
            played: true,
        },
    },
];

/// Index of `kind` in [`STEP_LINE_MODES`].
pub fn step_line_index(kind: LineKind) -> usize {
    match kind {
        LineKind::Step => 0,
        LineKind::Skip => 1,
        LineKind::Reset => 2,
        LineKind::Stop => 3,
    }
}
