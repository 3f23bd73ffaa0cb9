#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use bt::{Behaviour, Host, Node, NodeContext, Status, TickContext, Tree};

/// Lifecycle hook counters shared between a scripted leaf and the test body.
#[derive(Debug, Clone, Default)]
pub struct Counters {
    starts: Rc<Cell<u32>>,
    updates: Rc<Cell<u32>>,
    stops: Rc<Cell<u32>>,
}

impl Counters {
    pub fn starts(&self) -> u32 {
        self.starts.get()
    }

    pub fn updates(&self) -> u32 {
        self.updates.get()
    }

    pub fn stops(&self) -> u32 {
        self.stops.get()
    }
}

/// Leaf that replays `script` one entry per update, repeating the last entry forever.
#[derive(Debug, Clone)]
pub struct Scripted {
    script: Vec<Status>,
    cursor: usize,
    counters: Counters,
}

impl Scripted {
    pub fn new(script: Vec<Status>) -> (Self, Counters) {
        assert!(!script.is_empty());
        let counters = Counters::default();
        let leaf = Self {
            script,
            cursor: 0,
            counters: counters.clone(),
        };
        (leaf, counters)
    }
}

impl<C: Host> Behaviour<C> for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn on_start(&mut self, _ctx: &mut NodeContext<'_, C>) {
        self.counters.starts.set(self.counters.starts.get() + 1);
    }

    fn on_update(&mut self, _ctx: &mut NodeContext<'_, C>) -> Status {
        self.counters.updates.set(self.counters.updates.get() + 1);
        let status = self.script[self.cursor.min(self.script.len() - 1)];
        self.cursor += 1;
        status
    }

    fn on_stop(&mut self, _ctx: &mut NodeContext<'_, C>) {
        self.counters.stops.set(self.counters.stops.get() + 1);
    }
}

pub fn scripted<C: Host>(script: Vec<Status>) -> (Node<C>, Counters) {
    let (leaf, counters) = Scripted::new(script);
    (Node::new(leaf), counters)
}

pub fn always<C: Host>(status: Status) -> (Node<C>, Counters) {
    scripted(vec![status])
}

/// Ticks `tree` `n` times with a fixed step and returns every status.
pub fn run<C: Host>(tree: &mut Tree<C>, n: usize, dt: f32) -> Vec<Status> {
    let mut tick = TickContext::new(0, dt);
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(tree.update(&tick));
        tick = tick.next();
    }
    out
}
