//! Multi-child control flow.
//!
//! Children are always evaluated in declared order.

use bt_core::{Host, Status};

use crate::node::{Behaviour, Node, NodeContext};

macro_rules! composite_children {
    () => {
        fn children(&self) -> &[Node<C>] {
            &self.children
        }

        fn children_mut(&mut self) -> &mut [Node<C>] {
            &mut self.children
        }
    };
}

/// Memory sequence: resumes at the running child, fails on the first failure.
#[derive(Clone)]
pub struct Sequence<C: Host> {
    children: Vec<Node<C>>,
    index: usize,
}

impl<C: Host> Sequence<C> {
    pub fn new(children: Vec<Node<C>>) -> Self {
        Self { children, index: 0 }
    }
}

impl<C: Host> Behaviour<C> for Sequence<C> {
    fn name(&self) -> &'static str {
        "sequence"
    }

    fn on_start(&mut self, _ctx: &mut NodeContext<'_, C>) {
        self.index = 0;
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        while self.index < self.children.len() {
            match self.children[self.index].update(ctx) {
                Status::Running => return Status::Running,
                Status::Failure => return Status::Failure,
                Status::Success => self.index += 1,
            }
        }
        Status::Success
    }

    composite_children!();
}

/// Memory selector: resumes at the running child, succeeds on the first success.
#[derive(Clone)]
pub struct Selector<C: Host> {
    children: Vec<Node<C>>,
    index: usize,
}

impl<C: Host> Selector<C> {
    pub fn new(children: Vec<Node<C>>) -> Self {
        Self { children, index: 0 }
    }
}

impl<C: Host> Behaviour<C> for Selector<C> {
    fn name(&self) -> &'static str {
        "selector"
    }

    fn on_start(&mut self, _ctx: &mut NodeContext<'_, C>) {
        self.index = 0;
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        while self.index < self.children.len() {
            match self.children[self.index].update(ctx) {
                Status::Running => return Status::Running,
                Status::Success => return Status::Success,
                Status::Failure => self.index += 1,
            }
        }
        Status::Failure
    }

    composite_children!();
}

/// Sequence that re-checks every earlier child on each tick.
///
/// When a different child becomes the running one, the previously running child is aborted.
#[derive(Clone)]
pub struct ReactiveSequence<C: Host> {
    children: Vec<Node<C>>,
    running: Option<usize>,
}

impl<C: Host> ReactiveSequence<C> {
    pub fn new(children: Vec<Node<C>>) -> Self {
        Self {
            children,
            running: None,
        }
    }
}

impl<C: Host> Behaviour<C> for ReactiveSequence<C> {
    fn name(&self) -> &'static str {
        "reactive_sequence"
    }

    fn on_start(&mut self, _ctx: &mut NodeContext<'_, C>) {
        self.running = None;
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        for i in 0..self.children.len() {
            match self.children[i].update(ctx) {
                Status::Success => continue,
                Status::Failure => return Status::Failure,
                Status::Running => {
                    switch_running(&mut self.children, &mut self.running, i, ctx);
                    return Status::Running;
                }
            }
        }
        Status::Success
    }

    composite_children!();
}

/// Selector that re-checks every earlier child on each tick.
///
/// A higher-priority child that starts running preempts (aborts) the one that was running.
#[derive(Clone)]
pub struct ReactiveSelector<C: Host> {
    children: Vec<Node<C>>,
    running: Option<usize>,
}

impl<C: Host> ReactiveSelector<C> {
    pub fn new(children: Vec<Node<C>>) -> Self {
        Self {
            children,
            running: None,
        }
    }
}

impl<C: Host> Behaviour<C> for ReactiveSelector<C> {
    fn name(&self) -> &'static str {
        "reactive_selector"
    }

    fn on_start(&mut self, _ctx: &mut NodeContext<'_, C>) {
        self.running = None;
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        for i in 0..self.children.len() {
            match self.children[i].update(ctx) {
                Status::Failure => continue,
                Status::Success => return Status::Success,
                Status::Running => {
                    switch_running(&mut self.children, &mut self.running, i, ctx);
                    return Status::Running;
                }
            }
        }
        Status::Failure
    }

    composite_children!();
}

fn switch_running<C: Host>(
    children: &mut [Node<C>],
    running: &mut Option<usize>,
    index: usize,
    ctx: &mut NodeContext<'_, C>,
) {
    if let Some(prev) = running.filter(|&prev| prev != index) {
        children[prev].abort(ctx);
    }
    *running = Some(index);
}

/// Picks one child at random on start and mirrors its result.
#[derive(Clone)]
pub struct RandomSelector<C: Host> {
    children: Vec<Node<C>>,
    current: Option<usize>,
}

impl<C: Host> RandomSelector<C> {
    pub fn new(children: Vec<Node<C>>) -> Self {
        Self {
            children,
            current: None,
        }
    }
}

impl<C: Host> Behaviour<C> for RandomSelector<C> {
    fn name(&self) -> &'static str {
        "random_selector"
    }

    fn on_start(&mut self, ctx: &mut NodeContext<'_, C>) {
        self.current = if self.children.is_empty() {
            None
        } else {
            Some(ctx.rng.next_index(self.children.len()))
        };
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        match self.current {
            Some(i) => self.children[i].update(ctx),
            None => Status::Failure,
        }
    }

    composite_children!();
}

/// Ticks every unfinished child on each update.
///
/// Succeeds once `success_threshold` children succeeded (all of them by default), fails once
/// `failure_threshold` children failed (one by default) or success can no longer be reached.
/// Children still running at that point are aborted.
#[derive(Clone)]
pub struct Parallel<C: Host> {
    children: Vec<Node<C>>,
    success_threshold: Option<usize>,
    failure_threshold: usize,
    results: Vec<Option<Status>>,
}

impl<C: Host> Parallel<C> {
    pub fn new(children: Vec<Node<C>>) -> Self {
        Self {
            children,
            success_threshold: None,
            failure_threshold: 1,
            results: Vec::new(),
        }
    }

    pub fn with_success_threshold(mut self, threshold: usize) -> Self {
        self.success_threshold = Some(threshold);
        self
    }

    pub fn with_failure_threshold(mut self, threshold: usize) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    fn successes_needed(&self) -> usize {
        let len = self.children.len();
        match self.success_threshold {
            Some(n) => n.clamp(len.min(1), len),
            None => len,
        }
    }

    fn finish(&mut self, status: Status, ctx: &mut NodeContext<'_, C>) -> Status {
        for child in &mut self.children {
            child.abort(ctx);
        }
        status
    }
}

impl<C: Host> Behaviour<C> for Parallel<C> {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn on_start(&mut self, _ctx: &mut NodeContext<'_, C>) {
        self.results.clear();
        self.results.resize(self.children.len(), None);
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        let (mut successes, mut failures, mut running) = (0usize, 0usize, 0usize);

        for (child, result) in self.children.iter_mut().zip(self.results.iter_mut()) {
            let status = match *result {
                Some(done) => done,
                None => {
                    let status = child.update(ctx);
                    if status.is_terminal() {
                        *result = Some(status);
                    }
                    status
                }
            };
            match status {
                Status::Success => successes += 1,
                Status::Failure => failures += 1,
                Status::Running => running += 1,
            }
        }

        let needed = self.successes_needed();
        if successes >= needed {
            self.finish(Status::Success, ctx)
        } else if failures >= self.failure_threshold || successes + running < needed {
            self.finish(Status::Failure, ctx)
        } else {
            Status::Running
        }
    }

    composite_children!();
}
