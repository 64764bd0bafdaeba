//! Event capture for assertions

use std::cell::RefCell;
use std::rc::Rc;

use zeitnot_clock::ClockEngine;
use zeitnot_core::{ClockEvent, Color, EventKind};

/// Records every event an engine dispatches, in order.
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<ClockEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to an engine; events flow in from here on
    pub fn attach(&self, engine: &ClockEngine) {
        let sink = Rc::clone(&self.events);
        engine.subscribe(move |e| sink.borrow_mut().push(*e));
    }

    /// Everything recorded so far
    pub fn events(&self) -> Vec<ClockEvent> {
        self.events.borrow().clone()
    }

    /// Events of one kind, in order
    pub fn of_kind(&self, kind: EventKind) -> Vec<ClockEvent> {
        self.events
            .borrow()
            .iter()
            .copied()
            .filter(|e| e.kind() == kind)
            .collect()
    }

    /// Colors whose flags fell, in order
    pub fn zeros(&self) -> Vec<Color> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                ClockEvent::ZeroReached(color) => Some(*color),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.of_kind(kind).len()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}
