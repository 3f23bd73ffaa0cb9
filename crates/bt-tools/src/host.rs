use std::cell::RefCell;
use std::rc::Rc;

use bt_core::Host;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Log(String),
    Break,
}

/// Fake host that records every effect. Clones share the same record, so a tree bound to a
/// clone (including nested sub-trees) reports into the original.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    events: Rc<RefCell<Vec<HostEvent>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.borrow().clone()
    }

    pub fn logs(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                HostEvent::Log(msg) => Some(msg.clone()),
                HostEvent::Break => None,
            })
            .collect()
    }

    pub fn breaks(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, HostEvent::Break))
            .count()
    }
}

impl Host for RecordingHost {
    fn log(&mut self, message: &str) {
        self.events.borrow_mut().push(HostEvent::Log(message.to_owned()));
    }

    fn debug_break(&mut self) {
        self.events.borrow_mut().push(HostEvent::Break);
    }
}
