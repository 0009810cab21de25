use super::{ControlElement, ElementId};
use crate::color::Color;
use crate::output::LedSink;

/// Mutually exclusive group of buttons held by id; the buttons themselves
/// stay in the [`ControlRegistry`](super::ControlRegistry).
#[derive(Debug, Clone)]
pub struct RadioButtons {
    members: Vec<ElementId>,
    selected: usize,
    selected_color: Color,
    unselected_color: Color,
}

impl RadioButtons {
    pub fn new(
        members: Vec<ElementId>,
        selected: usize,
        selected_color: Color,
        unselected_color: Color,
    ) -> Self {
        Self {
            members,
            selected,
            selected_color,
            unselected_color,
        }
    }

    pub fn members(&self) -> &[ElementId] {
        &self.members
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn color_for(&self, position: usize) -> Color {
        if position == self.selected {
            self.selected_color
        } else {
            self.unselected_color
        }
    }

    /// Select `position` and repaint the whole group. Returns whether the
    /// selection changed; positions outside the group are ignored.
    pub fn select(
        &mut self,
        position: usize,
        elements: &[ControlElement],
        leds: &mut dyn LedSink,
    ) -> bool {
        if position >= self.members.len() {
            return false;
        }
        let previous = std::mem::replace(&mut self.selected, position);
        self.render(elements, leds);
        previous != position
    }

    pub fn render(&self, elements: &[ControlElement], leds: &mut dyn LedSink) {
        for (position, id) in self.members.iter().enumerate() {
            if let Some(element) = elements.get(id.index()) {
                element.render(self.color_for(position), leds);
            }
        }
    }
}
