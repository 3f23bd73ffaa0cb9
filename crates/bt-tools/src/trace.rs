#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

/// A small, allocation-friendly trace event.
///
/// This is intentionally "dumb data" so it can be recorded during simulation and later rendered
/// by tooling. For node lifecycle events `node` is the node's pre-order id within its tree and
/// `code` carries a status code (see [`TraceEvent::status_code`]).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    pub node: u32,
    pub code: u64,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            node: 0,
            code: 0,
        }
    }

    pub fn with_node(mut self, node: u32) -> Self {
        self.node = node;
        self
    }

    pub fn with_code(mut self, code: u64) -> Self {
        self.code = code;
        self
    }

    pub fn status_code(status: bt_core::Status) -> u64 {
        match status {
            bt_core::Status::Running => 0,
            bt_core::Status::Success => 1,
            bt_core::Status::Failure => 2,
        }
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn count(&self, tag: &str) -> usize {
        self.events.iter().filter(|e| e.tag == tag).count()
    }

    pub fn count_for(&self, tag: &str, node: u32) -> usize {
        self.events
            .iter()
            .filter(|e| e.tag == tag && e.node == node)
            .count()
    }
}

/// Sink handle that keeps a shared [`TraceLog`], so a test can hand one clone to a tree and
/// inspect the other.
#[derive(Debug, Clone, Default)]
pub struct SharedTraceSink(Rc<RefCell<TraceLog>>);

impl SharedTraceSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> TraceLog {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn with_log<R>(&self, f: impl FnOnce(&TraceLog) -> R) -> R {
        f(&self.0.borrow())
    }
}

impl TraceSink for SharedTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.0.borrow_mut().push(event);
    }
}
