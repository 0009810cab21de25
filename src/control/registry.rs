use super::{
    Button, ButtonEvent, ControlChange, ControlElement, Controller, RadioButtons, Reaction,
};
use crate::color::Color;
use crate::output::LedSink;

/// Handle to an element in a [`ControlRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to a radio group in a [`ControlRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RadioId(usize);

impl RadioId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Something observable that happened while handling input or state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Value { id: ElementId, value: u8 },
    Pressed(ElementId),
    Released(ElementId),
    CurrentStepChanged(ElementId),
    SelectionChanged { group: RadioId, position: usize },
}

/// Owns every control element and radio group, and routes control changes
/// to them.
#[derive(Debug, Clone, Default)]
pub struct ControlRegistry {
    elements: Vec<ControlElement>,
    groups: Vec<RadioButtons>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[ControlElement] {
        &self.elements
    }

    pub fn get(&self, id: ElementId) -> Option<&ControlElement> {
        self.elements.get(id.0)
    }

    pub fn controller(&self, id: ElementId) -> Option<&Controller> {
        self.get(id).and_then(ControlElement::as_controller)
    }

    pub fn button(&self, id: ElementId) -> Option<&Button> {
        self.get(id).and_then(ControlElement::as_button)
    }

    pub fn button_mut(&mut self, id: ElementId) -> Option<&mut Button> {
        match self.elements.get_mut(id.0) {
            Some(ControlElement::Button(b)) => Some(b),
            _ => None,
        }
    }

    pub fn group(&self, id: RadioId) -> Option<&RadioButtons> {
        self.groups.get(id.0)
    }

    /// Register a controller and show its initial color.
    pub fn add_controller(&mut self, controller: Controller, leds: &mut dyn LedSink) -> ElementId {
        controller.render(leds);
        self.push(ControlElement::Controller(controller))
    }

    /// Register a button and show its mode color, if it has modes.
    pub fn add_button(&mut self, button: Button, leds: &mut dyn LedSink) -> ElementId {
        button.render_step_color(leds);
        self.push(ControlElement::Button(button))
    }

    fn push(&mut self, element: ControlElement) -> ElementId {
        self.elements.push(element);
        ElementId(self.elements.len() - 1)
    }

    /// Group buttons so that pressing one selects it. Non-button members are
    /// painted with the group but cannot be pressed.
    pub fn add_radio_group(
        &mut self,
        members: Vec<ElementId>,
        selected: usize,
        selected_color: Color,
        unselected_color: Color,
        leds: &mut dyn LedSink,
    ) -> RadioId {
        let group = RadioId(self.groups.len());
        for (position, id) in members.iter().enumerate() {
            if let Some(button) = self.button_mut(*id) {
                button.subscribe(ButtonEvent::Press, Reaction::Select { group, position });
            }
        }
        let radio = RadioButtons::new(members, selected, selected_color, unselected_color);
        radio.render(&self.elements, leds);
        self.groups.push(radio);
        group
    }

    /// Returns whether the selection changed.
    pub fn select(&mut self, group: RadioId, position: usize, leds: &mut dyn LedSink) -> bool {
        let Self { elements, groups } = self;
        match groups.get_mut(group.0) {
            Some(radio) => radio.select(position, elements, leds),
            None => false,
        }
    }

    /// Offer a control change to every element. Elements with another
    /// address are untouched.
    pub fn dispatch(&mut self, change: ControlChange, leds: &mut dyn LedSink) -> Vec<ControlEvent> {
        log::debug!("dispatch {:?}", change);
        let mut events = Vec::new();
        for index in 0..self.elements.len() {
            let id = ElementId(index);
            let fired = match &mut self.elements[index] {
                ControlElement::Controller(c) => {
                    if c.set_value(change.channel, change.control, change.value, leds) {
                        events.push(ControlEvent::Value {
                            id,
                            value: change.value,
                        });
                    }
                    None
                }
                ControlElement::Button(b) => b.set_value(change.channel, change.control, change.value),
            };
            if let Some(event) = fired {
                self.fire(id, event, leds, &mut events);
            }
        }
        events
    }

    /// Update the current-step flag of one element, running its reactions if
    /// the flag changed.
    pub fn set_is_current_step(
        &mut self,
        id: ElementId,
        is_current_step: bool,
        leds: &mut dyn LedSink,
    ) -> Vec<ControlEvent> {
        let mut events = Vec::new();
        let fired = match self.elements.get_mut(id.0) {
            Some(ControlElement::Controller(c)) => {
                c.set_is_current_step(is_current_step, leds);
                None
            }
            Some(ControlElement::Button(b)) => b.set_is_current_step(is_current_step),
            None => None,
        };
        if let Some(event) = fired {
            self.fire(id, event, leds, &mut events);
        }
        events
    }

    fn fire(
        &mut self,
        id: ElementId,
        event: ButtonEvent,
        leds: &mut dyn LedSink,
        events: &mut Vec<ControlEvent>,
    ) {
        events.push(match event {
            ButtonEvent::Press => ControlEvent::Pressed(id),
            ButtonEvent::Release => ControlEvent::Released(id),
            ButtonEvent::CurrentStepChanged => ControlEvent::CurrentStepChanged(id),
        });

        let reactions = match self.button(id) {
            Some(button) => button.reactions(event).to_vec(),
            None => return,
        };
        for reaction in reactions {
            match reaction {
                Reaction::AdvanceMode => {
                    if let Some(button) = self.button_mut(id) {
                        button.advance_mode(leds);
                    }
                }
                Reaction::RenderStepColor => {
                    if let Some(button) = self.button(id) {
                        button.render_step_color(leds);
                    }
                }
                Reaction::Select { group, position } => {
                    if self.select(group, position, leds) {
                        events.push(ControlEvent::SelectionChanged { group, position });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlAddress;
    use crate::sequencer::modes::STEP_LINE_MODES;

    fn radio_registry(size: u8, leds: &mut Vec<(u8, u8)>) -> (ControlRegistry, RadioId, Vec<ElementId>) {
        let mut registry = ControlRegistry::new();
        let members: Vec<ElementId> = (0..size)
            .map(|i| {
                let button = Button::new(ControlAddress::new(0, 105 + i), Some(40 + i), &[], false);
                registry.add_button(button, leds)
            })
            .collect();
        let group = registry.add_radio_group(members.clone(), 0, Color::GREEN_3, Color::OFF, leds);
        (registry, group, members)
    }

    fn shown(leds: &[(u8, u8)], led: u8) -> Option<u8> {
        leds.iter().rev().find(|(l, _)| *l == led).map(|(_, c)| *c)
    }

    #[test]
    fn test_radio_exclusive_after_select() {
        let mut leds: Vec<(u8, u8)> = Vec::new();
        let (mut registry, group, _) = radio_registry(4, &mut leds);
        for target in [2usize, 0, 3, 3] {
            registry.select(group, target, &mut leds);
            let selected = (0..4u8)
                .filter(|i| shown(&leds, 40 + i) == Some(Color::GREEN_3.encode()))
                .count();
            let unselected = (0..4u8)
                .filter(|i| shown(&leds, 40 + i) == Some(Color::OFF.encode()))
                .count();
            assert_eq!((selected, unselected), (1, 3));
            assert_eq!(shown(&leds, 40 + target as u8), Some(Color::GREEN_3.encode()));
        }
    }

    #[test]
    fn test_radio_press_selects_and_reports_change() {
        let mut leds: Vec<(u8, u8)> = Vec::new();
        let (mut registry, group, members) = radio_registry(4, &mut leds);

        let events = registry.dispatch(ControlChange::new(0, 107, 127), &mut leds);
        assert_eq!(
            events,
            vec![
                ControlEvent::Pressed(members[2]),
                ControlEvent::SelectionChanged { group, position: 2 },
            ]
        );
        assert_eq!(registry.group(group).map(|g| g.selected()), Some(2));

        // Same member again repaints without a change event.
        leds.clear();
        let events = registry.dispatch(ControlChange::new(0, 107, 127), &mut leds);
        assert_eq!(events, vec![ControlEvent::Pressed(members[2])]);
        assert_eq!(leds.len(), 4);
    }

    #[test]
    fn test_release_does_not_select() {
        let mut leds: Vec<(u8, u8)> = Vec::new();
        let (mut registry, group, members) = radio_registry(2, &mut leds);
        let events = registry.dispatch(ControlChange::new(0, 106, 0), &mut leds);
        assert_eq!(events, vec![ControlEvent::Released(members[1])]);
        assert_eq!(registry.group(group).map(|g| g.selected()), Some(0));
    }

    #[test]
    fn test_select_out_of_range_is_ignored() {
        let mut leds: Vec<(u8, u8)> = Vec::new();
        let (mut registry, group, _) = radio_registry(2, &mut leds);
        leds.clear();
        assert!(!registry.select(group, 5, &mut leds));
        assert!(leds.is_empty());
    }

    #[test]
    fn test_dispatch_unmatched_is_noop() {
        let mut leds: Vec<(u8, u8)> = Vec::new();
        let (mut registry, _, _) = radio_registry(2, &mut leds);
        leds.clear();
        assert!(registry.dispatch(ControlChange::new(3, 105, 127), &mut leds).is_empty());
        assert!(leds.is_empty());
    }

    #[test]
    fn test_reactions_advance_and_follow_step() {
        let mut leds: Vec<(u8, u8)> = Vec::new();
        let mut registry = ControlRegistry::new();
        let mut button = Button::new(ControlAddress::new(0, 73), Some(32), &STEP_LINE_MODES, false);
        button.subscribe(ButtonEvent::Press, Reaction::AdvanceMode);
        button.subscribe(ButtonEvent::CurrentStepChanged, Reaction::RenderStepColor);
        let id = registry.add_button(button, &mut leds);
        assert_eq!(leds, vec![(32, Color::OFF.encode())]);

        registry.dispatch(ControlChange::new(0, 73, 127), &mut leds);
        assert_eq!(registry.button(id).map(Button::mode_index), Some(1));
        assert_eq!(leds.last(), Some(&(32, Color::YELLOW_2.encode())));

        let events = registry.set_is_current_step(id, true, &mut leds);
        assert_eq!(events, vec![ControlEvent::CurrentStepChanged(id)]);
        assert_eq!(leds.last(), Some(&(32, Color::YELLOW_3.encode())));
        assert!(registry.set_is_current_step(id, true, &mut leds).is_empty());
    }

    #[test]
    fn test_controller_value_event() {
        let mut leds: Vec<(u8, u8)> = Vec::new();
        let mut registry = ControlRegistry::new();
        let id = registry.add_controller(
            Controller::new(ControlAddress::new(0, 13), Some(0), false),
            &mut leds,
        );
        let events = registry.dispatch(ControlChange::new(0, 13, 99), &mut leds);
        assert_eq!(events, vec![ControlEvent::Value { id, value: 99 }]);
        assert_eq!(registry.controller(id).and_then(Controller::value), Some(99));
    }
}
