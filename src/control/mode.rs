use crate::color::Color;

/// How a step-line mode moves playback on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Step,
    Skip,
    Reset,
    Stop,
}

/// Mode-family specific data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModeBehavior {
    /// Gate line: fraction of the tick interval the gate stays open.
    Gate { duty_cycle: f32 },
    /// Step line: `played` marks steps that RESET may jump back to.
    Line { kind: LineKind, played: bool },
}

/// One selectable behavior of a [`Button`](super::Button), with the colors
/// it shows on and off the current step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mode {
    pub name: &'static str,
    pub current_step_color: Color,
    pub other_step_color: Color,
    pub behavior: ModeBehavior,
}

impl Mode {
    pub fn color(&self, is_current_step: bool) -> Color {
        if is_current_step {
            self.current_step_color
        } else {
            self.other_step_color
        }
    }

    pub fn duty_cycle(&self) -> Option<f32> {
        match self.behavior {
            ModeBehavior::Gate { duty_cycle } => Some(duty_cycle),
            ModeBehavior::Line { .. } => None,
        }
    }

    pub fn line_kind(&self) -> Option<LineKind> {
        match self.behavior {
            ModeBehavior::Line { kind, .. } => Some(kind),
            ModeBehavior::Gate { .. } => None,
        }
    }

    pub fn played(&self) -> bool {
        matches!(self.behavior, ModeBehavior::Line { played: true, .. })
    }
}
