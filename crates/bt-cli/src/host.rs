use std::cell::Cell;
use std::rc::Rc;

use bt::Host;

/// Host used by the headless runner: log nodes print to stdout, breakpoints are counted and
/// reported but never block.
#[derive(Debug, Clone)]
pub struct ConsoleHost {
    tree: Rc<str>,
    quiet: bool,
    breaks: Rc<Cell<u32>>,
}

impl ConsoleHost {
    pub fn new(tree: &str) -> Self {
        Self {
            tree: Rc::from(tree),
            quiet: false,
            breaks: Rc::default(),
        }
    }

    /// Route log nodes to `tracing` only.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn breaks(&self) -> u32 {
        self.breaks.get()
    }
}

impl Host for ConsoleHost {
    fn log(&mut self, message: &str) {
        tracing::debug!(tree = %self.tree, "{message}");
        if !self.quiet {
            println!("[{}] {message}", self.tree);
        }
    }

    fn debug_break(&mut self) {
        self.breaks.set(self.breaks.get() + 1);
        tracing::warn!(tree = %self.tree, "breakpoint hit (headless, continuing)");
    }
}
