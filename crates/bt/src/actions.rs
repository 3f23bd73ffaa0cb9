//! Leaf behaviours.

use bt_core::{rng, Blackboard, Host, PropertyPair, Status, TickContext};

use crate::node::{Behaviour, InitContext, NodeContext};
use crate::{BuildError, Tree};

/// Runs for `duration` seconds of accumulated tick time, then succeeds. Never fails.
#[derive(Debug, Clone)]
pub struct Wait {
    duration: f32,
    elapsed: f32,
}

impl Wait {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl<C: Host> Behaviour<C> for Wait {
    fn name(&self) -> &'static str {
        "wait"
    }

    fn on_start(&mut self, _ctx: &mut NodeContext<'_, C>) {
        self.elapsed = 0.0;
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        self.elapsed += ctx.dt();
        if self.elapsed < self.duration {
            Status::Running
        } else {
            Status::Success
        }
    }
}

/// Writes `message` to the diagnostic sink once per activation.
#[derive(Debug, Clone)]
pub struct Log {
    message: String,
}

impl Log {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl<C: Host> Behaviour<C> for Log {
    fn name(&self) -> &'static str {
        "log"
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        ctx.log(&self.message);
        Status::Success
    }
}

/// Copies the value side of a pair into the blackboard at `pair.key`.
///
/// When the value side names a key that is unset, nothing is written. Always succeeds.
#[derive(Debug, Clone)]
pub struct SetProperty {
    pair: PropertyPair,
}

impl SetProperty {
    pub fn new(pair: PropertyPair) -> Self {
        Self { pair }
    }
}

impl<C: Host> Behaviour<C> for SetProperty {
    fn name(&self) -> &'static str {
        "set_property"
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        if let Some(value) = ctx.blackboard.resolve(&self.pair.value) {
            ctx.blackboard.set_value(self.pair.key.clone(), value);
        }
        Status::Success
    }
}

/// Succeeds iff the blackboard value at `pair.key` equals the resolved value side.
#[derive(Debug, Clone)]
pub struct CompareProperty {
    pair: PropertyPair,
}

impl CompareProperty {
    pub fn new(pair: PropertyPair) -> Self {
        Self { pair }
    }
}

impl<C: Host> Behaviour<C> for CompareProperty {
    fn name(&self) -> &'static str {
        "compare_property"
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        let source = ctx.blackboard.resolve(&self.pair.value);
        let destination = ctx.blackboard.value(&self.pair.key);
        match (source, destination) {
            (Some(source), Some(destination)) => Status::from(source == *destination),
            _ => Status::Failure,
        }
    }
}

/// Fails with probability `chance_of_failure`, drawing one sample per activation.
#[derive(Debug, Clone)]
pub struct RandomFailure {
    chance_of_failure: f32,
}

impl RandomFailure {
    /// `chance_of_failure` is clamped into `[0, 1]`.
    pub fn new(chance_of_failure: f32) -> Self {
        let chance = if chance_of_failure.is_nan() {
            0.0
        } else {
            chance_of_failure.clamp(0.0, 1.0)
        };
        Self {
            chance_of_failure: chance,
        }
    }

    pub fn chance_of_failure(&self) -> f32 {
        self.chance_of_failure
    }
}

impl<C: Host> Behaviour<C> for RandomFailure {
    fn name(&self) -> &'static str {
        "random_failure"
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        let sample = ctx.rng.next_f32_unit();
        if sample < self.chance_of_failure {
            Status::Failure
        } else {
            Status::Success
        }
    }
}

/// Asks the host to suspend its debugger when activated, then succeeds.
///
/// Without the `breakpoints` feature the node only succeeds.
#[derive(Debug, Clone, Default)]
pub struct Breakpoint;

impl<C: Host> Behaviour<C> for Breakpoint {
    fn name(&self) -> &'static str {
        "breakpoint"
    }

    fn on_start(&mut self, _ctx: &mut NodeContext<'_, C>) {
        #[cfg(feature = "breakpoints")]
        {
            tracing::debug!("triggering breakpoint");
            _ctx.debug_break();
        }
    }

    fn on_update(&mut self, _ctx: &mut NodeContext<'_, C>) -> Status {
        Status::Success
    }
}

/// Leaf predicate over the tick, the bound host and the blackboard.
#[derive(Clone)]
pub struct Condition<F> {
    cond: F,
}

impl<F> Condition<F> {
    pub fn new(cond: F) -> Self {
        Self { cond }
    }
}

impl<C, F> Behaviour<C> for Condition<F>
where
    C: Host,
    F: Fn(&TickContext, Option<&C>, &Blackboard) -> bool + Clone + 'static,
{
    fn name(&self) -> &'static str {
        "condition"
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        Status::from((self.cond)(ctx.tick, ctx.host.as_deref(), &*ctx.blackboard))
    }
}

/// Runs a private instance of another tree.
///
/// `init` instantiates the template; each activation restarts the instance. The instance never
/// owns a host: every update reaches the outer tree's host and trace sink, so nested nodes see
/// the same context as the rest of the tree. Trace events from nested nodes carry the instance's
/// own node ids. Without a template the node fails.
pub struct SubTree<C: Host> {
    template: Option<Box<Tree<C>>>,
    instance: Option<Box<Tree<C>>>,
}

impl<C: Host> SubTree<C> {
    pub fn new(template: Tree<C>) -> Self {
        Self {
            template: Some(Box::new(template)),
            instance: None,
        }
    }

    /// A sub-tree node with no template assigned.
    pub fn unassigned() -> Self {
        Self {
            template: None,
            instance: None,
        }
    }

    pub fn template(&self) -> Option<&Tree<C>> {
        self.template.as_deref()
    }

    pub fn instance(&self) -> Option<&Tree<C>> {
        self.instance.as_deref()
    }
}

impl<C: Host> Clone for SubTree<C> {
    fn clone(&self) -> Self {
        Self {
            template: self.template.clone(),
            instance: None,
        }
    }
}

impl<C: Host> Behaviour<C> for SubTree<C> {
    fn name(&self) -> &'static str {
        "sub_tree"
    }

    fn init(&mut self, ctx: &mut InitContext<'_, C>) -> Result<(), BuildError> {
        let Some(template) = self.template.as_deref() else {
            self.instance = None;
            return Ok(());
        };
        if ctx.depth + 1 > ctx.max_depth {
            return Err(BuildError::DepthLimit {
                limit: ctx.max_depth,
            });
        }

        let mut instance = template.instantiate();
        instance.set_seed(rng::derive_seed(ctx.seed, ctx.node as u64, ctx.depth as u64));
        instance.initialize(ctx.host, ctx.depth + 1, ctx.max_depth)?;
        self.instance = Some(Box::new(instance));
        Ok(())
    }

    fn on_start(&mut self, ctx: &mut NodeContext<'_, C>) {
        if let Some(instance) = self.instance.as_deref_mut() {
            instance.restart_with(ctx.host.as_deref_mut(), ctx.trace.as_deref_mut());
        }
    }

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        match self.instance.as_deref_mut() {
            Some(instance) => {
                instance.update_with(ctx.tick, ctx.host.as_deref_mut(), ctx.trace.as_deref_mut())
            }
            None => Status::Failure,
        }
    }

    fn on_stop(&mut self, ctx: &mut NodeContext<'_, C>) {
        if let Some(instance) = self.instance.as_deref_mut() {
            instance.abort_with(ctx.host.as_deref_mut(), ctx.trace.as_deref_mut());
        }
    }
}
