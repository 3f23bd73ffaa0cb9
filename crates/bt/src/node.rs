//! Node lifecycle.
//!
//! A [`Node`] owns one boxed [`Behaviour`] plus the lifecycle flags shared by every node kind.
//! Behaviours only implement the hooks; `Node::update` decides when each hook runs:
//!
//! - `on_start` once per activation, before the first `on_update`;
//! - `on_stop` once when the activation ends, either by a terminal status or by an abort.

use bt_core::{Blackboard, DeterministicRng, Host, Status, TickContext};
use bt_tools::{TraceEvent, TraceSink};

use crate::BuildError;

/// Per-tick view handed to behaviours.
pub struct NodeContext<'a, C> {
    pub tick: &'a TickContext,
    /// Tree clock in seconds, including the current tick's delta.
    pub now: f32,
    pub blackboard: &'a mut Blackboard,
    pub host: Option<&'a mut C>,
    pub rng: &'a mut dyn DeterministicRng,
    pub(crate) trace: Option<&'a mut (dyn TraceSink + 'static)>,
}

impl<C: Host> NodeContext<'_, C> {
    #[inline]
    pub fn dt(&self) -> f32 {
        self.tick.dt_seconds
    }

    /// Routes a message to the host's diagnostic sink, or to `tracing` when the tree is unbound.
    pub fn log(&mut self, message: &str) {
        match self.host.as_deref_mut() {
            Some(host) => host.log(message),
            None => tracing::info!(target: "bt::log", "{message}"),
        }
    }

    pub fn debug_break(&mut self) {
        match self.host.as_deref_mut() {
            Some(host) => host.debug_break(),
            None => tracing::warn!(target: "bt::log", "breakpoint hit (unbound tree)"),
        }
    }

    pub fn emit(&mut self, event: TraceEvent) {
        if let Some(sink) = self.trace.as_deref_mut() {
            sink.emit(event);
        }
    }
}

/// One-time setup view, passed to [`Behaviour::init`] after construction or rebinding.
pub struct InitContext<'a, C> {
    pub host: Option<&'a C>,
    /// Sub-tree nesting depth of the tree being initialised (0 for the outermost tree).
    pub depth: usize,
    pub max_depth: usize,
    pub seed: u64,
    /// Id of the node currently being initialised.
    pub node: u32,
}

pub trait Behaviour<C: Host>: BehaviourClone<C> + 'static {
    fn name(&self) -> &'static str;

    fn init(&mut self, _ctx: &mut InitContext<'_, C>) -> Result<(), BuildError> {
        Ok(())
    }

    fn on_start(&mut self, _ctx: &mut NodeContext<'_, C>) {}

    fn on_update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status;

    fn on_stop(&mut self, _ctx: &mut NodeContext<'_, C>) {}

    fn children(&self) -> &[Node<C>] {
        &[]
    }

    fn children_mut(&mut self) -> &mut [Node<C>] {
        &mut []
    }
}

pub trait BehaviourClone<C: Host> {
    fn clone_box(&self) -> Box<dyn Behaviour<C>>;
}

impl<C, T> BehaviourClone<C> for T
where
    C: Host,
    T: Behaviour<C> + Clone,
{
    fn clone_box(&self) -> Box<dyn Behaviour<C>> {
        Box::new(self.clone())
    }
}

/// Snapshot of one node, yielded by [`crate::Tree::visit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeInfo {
    pub depth: usize,
    pub id: u32,
    pub name: &'static str,
    pub started: bool,
    pub status: Option<Status>,
}

pub struct Node<C: Host> {
    behaviour: Box<dyn Behaviour<C>>,
    id: u32,
    started: bool,
    status: Option<Status>,
}

impl<C: Host> Node<C> {
    pub fn new(behaviour: impl Behaviour<C>) -> Self {
        Self::from_boxed(Box::new(behaviour))
    }

    pub fn from_boxed(behaviour: Box<dyn Behaviour<C>>) -> Self {
        Self {
            behaviour,
            id: 0,
            started: false,
            status: None,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.behaviour.name()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Status returned by the most recent update, `None` before the first one or after an abort.
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub fn behaviour(&self) -> &dyn Behaviour<C> {
        &*self.behaviour
    }

    pub fn children(&self) -> &[Node<C>] {
        self.behaviour.children()
    }

    pub fn update(&mut self, ctx: &mut NodeContext<'_, C>) -> Status {
        if !self.started {
            tracing::trace!(node = self.id, name = self.name(), "start");
            ctx.emit(TraceEvent::new(ctx.tick.tick, "bt.node.start").with_node(self.id));
            self.behaviour.on_start(ctx);
            self.started = true;
        }

        let status = self.behaviour.on_update(ctx);
        self.status = Some(status);

        if status.is_terminal() {
            // A finished node never leaves started descendants behind.
            for child in self.behaviour.children_mut() {
                child.abort(ctx);
            }
            self.stop(ctx, "bt.node.stop", status);
        }

        status
    }

    /// Ends a running activation early. A node that is not started is left untouched.
    pub fn abort(&mut self, ctx: &mut NodeContext<'_, C>) {
        if !self.started {
            return;
        }
        for child in self.behaviour.children_mut() {
            child.abort(ctx);
        }
        self.status = None;
        self.stop(ctx, "bt.node.abort", Status::Failure);
    }

    fn stop(&mut self, ctx: &mut NodeContext<'_, C>, tag: &'static str, status: Status) {
        tracing::trace!(node = self.id, name = self.name(), ?status, tag, "stop");
        self.behaviour.on_stop(ctx);
        self.started = false;
        ctx.emit(
            TraceEvent::new(ctx.tick.tick, tag)
                .with_node(self.id)
                .with_code(TraceEvent::status_code(status)),
        );
    }

    pub(crate) fn init(&mut self, ctx: &mut InitContext<'_, C>) -> Result<(), BuildError> {
        ctx.node = self.id;
        self.behaviour.init(ctx)?;
        for child in self.behaviour.children_mut() {
            child.init(ctx)?;
        }
        Ok(())
    }

    pub(crate) fn assign_ids(&mut self, next: &mut u32) {
        self.id = *next;
        *next += 1;
        for child in self.behaviour.children_mut() {
            child.assign_ids(next);
        }
    }

    pub(crate) fn visit(&self, depth: usize, f: &mut dyn FnMut(&NodeInfo)) {
        f(&NodeInfo {
            depth,
            id: self.id,
            name: self.name(),
            started: self.started,
            status: self.status,
        });
        for child in self.behaviour.children() {
            child.visit(depth + 1, f);
        }
    }
}

/// Structural copy: same behaviour configuration and id, fresh lifecycle state.
impl<C: Host> Clone for Node<C> {
    fn clone(&self) -> Self {
        Self {
            behaviour: self.behaviour.clone_box(),
            id: self.id,
            started: false,
            status: None,
        }
    }
}

impl<C: Host> std::fmt::Debug for Node<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name())
            .field("id", &self.id)
            .field("started", &self.started)
            .field("status", &self.status)
            .field("children", &self.children())
            .finish()
    }
}
