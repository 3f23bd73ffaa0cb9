use bt_core::{
    Blackboard, BbKey, BlackboardValue, DeterministicRng, Host, KeyDecl, SplitMix64, Status,
    TickContext,
};
use bt_tools::{TraceEvent, TraceSink};

use crate::node::{InitContext, Node, NodeContext, NodeInfo};
use crate::BuildError;

/// Nesting limit for sub-trees when none is configured.
pub const DEFAULT_MAX_SUBTREE_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeState {
    /// Built or instantiated, nodes not initialised yet.
    Uninitialized,
    /// Initialised (and possibly bound to a host), not ticked since.
    Bound,
    Running,
    Success,
    Failure,
}

impl From<Status> for TreeState {
    fn from(value: Status) -> Self {
        match value {
            Status::Running => TreeState::Running,
            Status::Success => TreeState::Success,
            Status::Failure => TreeState::Failure,
        }
    }
}

/// One behaviour tree instance: a root node, its blackboard and the host it is bound to.
///
/// Blackboards are never shared: [`Tree::instantiate`] gives each instance its own, seeded from
/// the declared defaults.
pub struct Tree<C: Host = ()> {
    name: String,
    root: Node<C>,
    defaults: Vec<KeyDecl>,
    blackboard: Blackboard,
    context: Option<C>,
    state: TreeState,
    clock: f32,
    seed: u64,
    rng: Box<dyn DeterministicRng>,
    trace: Option<Box<dyn TraceSink>>,
    last_tick: TickContext,
    max_depth: usize,
    init_failed: bool,
}

impl<C: Host> Tree<C> {
    pub fn new(root: Node<C>) -> Self {
        Self {
            name: "tree".to_owned(),
            root,
            defaults: Vec::new(),
            blackboard: Blackboard::new(),
            context: None,
            state: TreeState::Uninitialized,
            clock: 0.0,
            seed: 0,
            rng: Box::new(SplitMix64::new(0)),
            trace: None,
            last_tick: TickContext::new(0, 0.0),
            max_depth: DEFAULT_MAX_SUBTREE_DEPTH,
            init_failed: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Declares blackboard keys; their defaults are written into the blackboard immediately and
    /// into every instance created later.
    pub fn with_blackboard(mut self, decls: impl IntoIterator<Item = KeyDecl>) -> Self {
        for decl in decls {
            self.declare(decl);
        }
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.set_seed(seed);
        self
    }

    pub fn with_max_subtree_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn declare(&mut self, decl: KeyDecl) {
        if let Some(default) = &decl.default {
            self.blackboard.set_value(decl.name.clone(), default.clone());
        }
        match self.defaults.iter_mut().find(|d| d.name == decl.name) {
            Some(existing) => *existing = decl,
            None => self.defaults.push(decl),
        }
    }

    /// Deep structural copy with independent runtime state: fresh lifecycle flags, a blackboard
    /// holding only the declared defaults, no host, and an RNG restarted from the same seed.
    pub fn instantiate(&self) -> Self {
        Self {
            name: self.name.clone(),
            root: self.root.clone(),
            defaults: self.defaults.clone(),
            blackboard: Blackboard::from_decls(&self.defaults),
            context: None,
            state: TreeState::Uninitialized,
            clock: 0.0,
            seed: self.seed,
            rng: Box::new(SplitMix64::new(self.seed)),
            trace: None,
            last_tick: TickContext::new(0, 0.0),
            max_depth: self.max_depth,
            init_failed: false,
        }
    }

    /// Wires `context` into the tree and runs every node's `init`.
    ///
    /// Rebinding a running tree aborts the running branch first.
    pub fn bind(&mut self, context: C) -> Result<(), BuildError> {
        self.abort();
        self.context = Some(context);
        self.initialize(None, 0, self.max_depth)
    }

    /// Assigns node ids and runs every node's `init`. Nested trees pass the outer tree's host as
    /// `external`; they never store one of their own.
    pub(crate) fn initialize(
        &mut self,
        external: Option<&C>,
        depth: usize,
        max_depth: usize,
    ) -> Result<(), BuildError> {
        self.max_depth = max_depth;
        self.init_failed = false;

        let mut next_id = 0;
        self.root.assign_ids(&mut next_id);

        let mut ctx = InitContext {
            host: external.or(self.context.as_ref()),
            depth,
            max_depth,
            seed: self.seed,
            node: 0,
        };
        if let Err(err) = self.root.init(&mut ctx) {
            self.state = TreeState::Uninitialized;
            self.init_failed = true;
            return Err(err);
        }
        self.state = TreeState::Bound;
        tracing::debug!(tree = %self.name, nodes = next_id, depth, "tree initialised");
        Ok(())
    }

    /// Advances the tree clock by `tick.dt_seconds` and updates the root once.
    ///
    /// An unbound tree is initialised without a host on its first update. If that fails the tree
    /// reports Failure on every update until it is bound or re-instantiated.
    pub fn update(&mut self, tick: &TickContext) -> Status {
        self.update_with(tick, None, None)
    }

    /// [`Tree::update`] for a tree nested in a sub-tree node: `host` and `trace` are the outer
    /// tree's and take precedence over this tree's own.
    pub(crate) fn update_with(
        &mut self,
        tick: &TickContext,
        host: Option<&mut C>,
        trace: Option<&mut (dyn TraceSink + 'static)>,
    ) -> Status {
        if self.state == TreeState::Uninitialized {
            if self.init_failed {
                return Status::Failure;
            }
            if let Err(err) = self.initialize(None, 0, self.max_depth) {
                tracing::warn!(tree = %self.name, error = %err, "tree failed to initialise");
                return Status::Failure;
            }
        }

        self.last_tick = *tick;
        self.clock += tick.dt_seconds;

        let mut ctx = NodeContext {
            tick,
            now: self.clock,
            blackboard: &mut self.blackboard,
            host: host.or(self.context.as_mut()),
            rng: &mut *self.rng,
            trace: trace.or(self.trace.as_deref_mut()),
        };
        let status = self.root.update(&mut ctx);

        let state = TreeState::from(status);
        if state != self.state {
            tracing::debug!(tree = %self.name, from = ?self.state, to = ?state, "tree state changed");
            ctx.emit(
                TraceEvent::new(tick.tick, "bt.tree.state").with_code(TraceEvent::status_code(status)),
            );
            self.state = state;
        }
        status
    }

    /// Aborts a running root and marks the tree as running again, so the next update starts a
    /// fresh activation.
    pub fn restart(&mut self) {
        self.restart_with(None, None);
    }

    pub(crate) fn restart_with(
        &mut self,
        host: Option<&mut C>,
        trace: Option<&mut (dyn TraceSink + 'static)>,
    ) {
        self.abort_with(host, trace);
        if self.state != TreeState::Uninitialized {
            self.state = TreeState::Running;
        }
    }

    /// Aborts the running branch, if any. Stop hooks run with the last tick's context.
    pub fn abort(&mut self) {
        self.abort_with(None, None);
    }

    pub(crate) fn abort_with(
        &mut self,
        host: Option<&mut C>,
        trace: Option<&mut (dyn TraceSink + 'static)>,
    ) {
        if !self.root.is_started() {
            return;
        }
        let tick = self.last_tick;
        let mut ctx = NodeContext {
            tick: &tick,
            now: self.clock,
            blackboard: &mut self.blackboard,
            host: host.or(self.context.as_mut()),
            rng: &mut *self.rng,
            trace: trace.or(self.trace.as_deref_mut()),
        };
        self.root.abort(&mut ctx);
        self.state = TreeState::Bound;
    }

    /// Pre-order walk over the node hierarchy.
    pub fn visit(&self, mut f: impl FnMut(&NodeInfo)) {
        self.root.visit(0, &mut f);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TreeState {
        self.state
    }

    /// Seconds of tick time accumulated by this instance.
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn root(&self) -> &Node<C> {
        &self.root
    }

    pub fn defaults(&self) -> &[KeyDecl] {
        &self.defaults
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    pub fn get<T: BlackboardValue>(&self, key: BbKey<T>) -> Option<T> {
        self.blackboard.get(key)
    }

    pub fn set<T: BlackboardValue>(&mut self, key: BbKey<T>, value: T) {
        self.blackboard.set(key, value);
    }

    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    pub fn context_mut(&mut self) -> Option<&mut C> {
        self.context.as_mut()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restarts the tree RNG from `seed`.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Box::new(SplitMix64::new(seed));
    }

    /// Replaces the tree RNG, e.g. with a scripted one in tests.
    pub fn set_rng(&mut self, rng: Box<dyn DeterministicRng>) {
        self.rng = rng;
    }

    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace = Some(sink);
    }

    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.trace.take()
    }
}

/// Same as [`Tree::instantiate`].
impl<C: Host> Clone for Tree<C> {
    fn clone(&self) -> Self {
        self.instantiate()
    }
}

impl<C: Host> std::fmt::Debug for Tree<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("clock", &self.clock)
            .field("blackboard", &self.blackboard)
            .field("root", &self.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{sequence, wait};

    #[test]
    fn declare_replaces_existing_decl() {
        let mut tree: Tree = Tree::new(wait(1.0));
        tree.declare(KeyDecl::new("hp").with_default(10i64));
        tree.declare(KeyDecl::new("hp").with_default(20i64));

        assert_eq!(tree.defaults().len(), 1);
        assert_eq!(tree.get(BbKey::<i64>::new("hp")), Some(20));
    }

    #[test]
    fn ids_are_assigned_in_pre_order() {
        let mut tree: Tree = Tree::new(sequence(vec![
            wait(1.0),
            sequence(vec![wait(1.0), wait(1.0)]),
        ]));
        tree.bind(()).unwrap();

        let mut ids = Vec::new();
        tree.visit(|info| ids.push((info.depth, info.id, info.name)));
        assert_eq!(
            ids,
            vec![
                (0, 0, "sequence"),
                (1, 1, "wait"),
                (1, 2, "sequence"),
                (2, 3, "wait"),
                (2, 4, "wait"),
            ]
        );
    }

    #[test]
    fn unbound_tree_initialises_on_first_update() {
        let mut tree: Tree = Tree::new(wait(0.5));
        assert_eq!(tree.state(), TreeState::Uninitialized);

        let status = tree.update(&TickContext::new(0, 0.25));
        assert_eq!(status, Status::Running);
        assert_eq!(tree.state(), TreeState::Running);
        assert!(tree.context().is_none());
    }
}
