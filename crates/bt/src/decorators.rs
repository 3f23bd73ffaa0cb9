//! Single-child behaviours that gate or remap their child's result.
//!
//! Every decorator fails when it has no child.

use bt_core::{Host, Status};

use crate::node::{Behaviour, Node, NodeContext};

macro_rules! decorator_child {
    () => {
        fn children(&self) -> &[Node<C>] {
            self.child.as_slice()
        }

        fn children_mut(&mut self) -> &mut [Node<C>] {
            self.child.as_mut_slice()
        }
    };
}

/// Remaps `Success` to `Failure`; `Running` passes through.
#[derive(Clone)]
pub struct Fail<C: Host> {
    child: Option<Node<C>>,
}

impl<C: Host> Fail<C> {
    pub fn new(child: Node<C>) -> Self {
        Self { child: Some(child) }
    }
}

impl<C: Host> Default for Fail<C> {
    fn default() -> Self {
        Self { child: None }
    }
}

impl<C: Host> Behaviour<C> for Fail<C> {
    fn name(&self) -> &'static str {
        "fail"
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        let Some(child) = self.child.as_mut() else {
            return Status::Failure;
        };
        match child.update(ctx) {
            Status::Running => Status::Running,
            Status::Success | Status::Failure => Status::Failure,
        }
    }

    decorator_child!();
}

/// Remaps `Failure` to `Success`; `Running` passes through.
#[derive(Clone)]
pub struct Succeed<C: Host> {
    child: Option<Node<C>>,
}

impl<C: Host> Succeed<C> {
    pub fn new(child: Node<C>) -> Self {
        Self { child: Some(child) }
    }
}

impl<C: Host> Default for Succeed<C> {
    fn default() -> Self {
        Self { child: None }
    }
}

impl<C: Host> Behaviour<C> for Succeed<C> {
    fn name(&self) -> &'static str {
        "succeed"
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        let Some(child) = self.child.as_mut() else {
            return Status::Failure;
        };
        match child.update(ctx) {
            Status::Running => Status::Running,
            Status::Success | Status::Failure => Status::Success,
        }
    }

    decorator_child!();
}

/// Swaps `Success` and `Failure`; `Running` passes through.
#[derive(Clone)]
pub struct Inverter<C: Host> {
    child: Option<Node<C>>,
}

impl<C: Host> Inverter<C> {
    pub fn new(child: Node<C>) -> Self {
        Self { child: Some(child) }
    }
}

impl<C: Host> Default for Inverter<C> {
    fn default() -> Self {
        Self { child: None }
    }
}

impl<C: Host> Behaviour<C> for Inverter<C> {
    fn name(&self) -> &'static str {
        "inverter"
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        match self.child.as_mut() {
            Some(child) => child.update(ctx).invert(),
            None => Status::Failure,
        }
    }

    decorator_child!();
}

/// Restarts its child after it completes.
///
/// Completions are counted since the decorator's own start. With a restart flag set for the
/// child's outcome, the decorator keeps reporting `Running` (the child restarts on the next tick)
/// until `max_repeats` completions have been seen. `max_repeats == 0` never stops on a count.
#[derive(Clone)]
pub struct Repeat<C: Host> {
    child: Option<Node<C>>,
    restart_on_success: bool,
    restart_on_failure: bool,
    max_repeats: u32,
    count: u32,
}

impl<C: Host> Repeat<C> {
    /// Restarts on success, stops on the first failure, loops forever.
    pub fn new(child: Node<C>) -> Self {
        Self {
            child: Some(child),
            ..Self::default()
        }
    }

    pub fn restart_on_success(mut self, restart: bool) -> Self {
        self.restart_on_success = restart;
        self
    }

    pub fn restart_on_failure(mut self, restart: bool) -> Self {
        self.restart_on_failure = restart;
        self
    }

    pub fn max_repeats(mut self, max_repeats: u32) -> Self {
        self.max_repeats = max_repeats;
        self
    }

    /// Completions seen in the current activation.
    pub fn count(&self) -> u32 {
        self.count
    }

    fn completed(&mut self, outcome: Status, restart: bool) -> Status {
        if !restart {
            return outcome;
        }
        self.count = self.count.saturating_add(1);
        if self.max_repeats > 0 && self.count >= self.max_repeats {
            outcome
        } else {
            Status::Running
        }
    }
}

impl<C: Host> Default for Repeat<C> {
    fn default() -> Self {
        Self {
            child: None,
            restart_on_success: true,
            restart_on_failure: false,
            max_repeats: 0,
            count: 0,
        }
    }
}

impl<C: Host> Behaviour<C> for Repeat<C> {
    fn name(&self) -> &'static str {
        "repeat"
    }

    fn on_start(&mut self, _ctx: &mut NodeContext<'_, C>) {
        self.count = 0;
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        let Some(child) = self.child.as_mut() else {
            return Status::Failure;
        };
        match child.update(ctx) {
            Status::Running => Status::Running,
            Status::Success => self.completed(Status::Success, self.restart_on_success),
            Status::Failure => self.completed(Status::Failure, self.restart_on_failure),
        }
    }

    decorator_child!();
}

/// Fails once more than `duration` seconds of tree time have passed since its start.
///
/// A child still running at that point is aborted, so its stop hook runs.
#[derive(Clone)]
pub struct Timeout<C: Host> {
    child: Option<Node<C>>,
    duration: f32,
    /// Seconds since the activation's first update; `None` before it.
    elapsed: Option<f32>,
}

impl<C: Host> Timeout<C> {
    pub fn new(child: Node<C>, duration: f32) -> Self {
        Self {
            child: Some(child),
            duration,
            elapsed: None,
        }
    }

    /// A timeout with no child; it always fails.
    pub fn empty(duration: f32) -> Self {
        Self {
            child: None,
            duration,
            elapsed: None,
        }
    }
}

impl<C: Host> Behaviour<C> for Timeout<C> {
    fn name(&self) -> &'static str {
        "timeout"
    }

    fn on_start(&mut self, _ctx: &mut NodeContext<'_, C>) {
        self.elapsed = None;
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        let Some(child) = self.child.as_mut() else {
            return Status::Failure;
        };
        let elapsed = self.elapsed.map_or(0.0, |elapsed| elapsed + ctx.dt());
        self.elapsed = Some(elapsed);
        if elapsed > self.duration {
            tracing::debug!(duration = self.duration, "timeout expired");
            child.abort(ctx);
            return Status::Failure;
        }
        child.update(ctx)
    }

    decorator_child!();
}
