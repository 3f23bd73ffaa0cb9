/// Effect capability injected into a tree through `bind`.
///
/// The host is whatever the owning agent needs to expose to nodes (a handle to the agent,
/// its navigation target, ...). Sub-trees reach the host of the tree they are nested in, so
/// changes made through `Tree::context_mut` are visible to every nested node. The default effect
/// implementations forward to `tracing`.
pub trait Host: Clone + 'static {
    fn log(&mut self, message: &str) {
        tracing::info!(target: "bt::log", "{message}");
    }

    /// Suspend the host's editor/debugger. Only reached from breakpoint nodes.
    fn debug_break(&mut self) {
        tracing::warn!(target: "bt::log", "breakpoint hit");
    }
}

impl Host for () {}
