//! Loading, running and inspecting trees from asset directories.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bt::{AssetLibrary, BuildError, Host, NodeRegistry, TickContext, Tree, TreeLoader, TreeState};

use crate::config::RunnerConfig;
use crate::host::ConsoleHost;

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub tree: String,
    pub ticks: u64,
    pub clock: f32,
    pub state: TreeState,
    pub breaks: u32,
}

pub fn load_library(dirs: &[PathBuf]) -> Result<AssetLibrary> {
    let mut library = AssetLibrary::new();
    for dir in dirs {
        let count = library
            .load_dir(dir)
            .with_context(|| format!("Failed to load tree assets from {}", dir.display()))?;
        tracing::info!(dir = %dir.display(), count, "loaded tree assets");
    }
    Ok(library)
}

fn build<C: Host>(
    library: &AssetLibrary,
    name: &str,
    max_depth: usize,
) -> Result<Tree<C>, BuildError> {
    let registry = NodeRegistry::new();
    TreeLoader::new(library, &registry)
        .with_max_depth(max_depth)
        .build(name)
}

/// Builds `name`, binds it to `host` and ticks it with the configured step.
pub fn run_tree(
    library: &AssetLibrary,
    name: &str,
    config: &RunnerConfig,
    host: ConsoleHost,
) -> Result<RunSummary> {
    let mut tree: Tree<ConsoleHost> = build(library, name, config.max_subtree_depth)
        .with_context(|| format!("Failed to build tree `{name}`"))?;
    tree.set_seed(config.seed);
    tree.bind(host.clone())
        .with_context(|| format!("Failed to bind tree `{name}`"))?;

    tracing::info!(tree = name, dt = config.dt_seconds, seed = config.seed, "running tree");

    let mut tick = TickContext::new(0, config.dt_seconds);
    let mut ticks = 0;
    let mut last = tree.state();
    while ticks < config.max_ticks {
        let status = tree.update(&tick);
        ticks += 1;
        if tree.state() != last {
            tracing::info!(tree = name, tick = tick.tick, state = ?tree.state(), "state changed");
            last = tree.state();
        }
        if config.until_complete && status.is_terminal() {
            break;
        }
        tick = tick.next();
    }
    tree.abort();

    Ok(RunSummary {
        tree: name.to_owned(),
        ticks,
        clock: tree.clock(),
        state: last,
        breaks: host.breaks(),
    })
}

/// Builds and binds every asset in the library. Returns the ones that failed, with the reason.
pub fn check_library(library: &AssetLibrary, max_depth: usize) -> Vec<(String, BuildError)> {
    let mut failures = Vec::new();
    for name in library.names() {
        let result = build::<ConsoleHost>(library, name, max_depth)
            .and_then(|mut tree| tree.bind(ConsoleHost::new(name).quiet()));
        match result {
            Ok(()) => tracing::debug!(tree = name, "ok"),
            Err(err) => {
                tracing::warn!(tree = name, error = %err, "tree failed to build");
                failures.push((name.to_owned(), err));
            }
        }
    }
    failures
}

/// Indented outline of the node hierarchy, one node per line.
pub fn render_tree(library: &AssetLibrary, name: &str, max_depth: usize) -> Result<String> {
    let mut tree: Tree<ConsoleHost> = build(library, name, max_depth)
        .with_context(|| format!("Failed to build tree `{name}`"))?;
    // Node ids are assigned when the tree is bound.
    tree.bind(ConsoleHost::new(name).quiet())
        .with_context(|| format!("Failed to bind tree `{name}`"))?;

    let mut out = String::new();
    let _ = writeln!(out, "{name}");
    for decl in tree.defaults() {
        match &decl.default {
            Some(value) => {
                let _ = writeln!(out, "  bb {} = {value:?}", decl.name);
            }
            None => {
                let _ = writeln!(out, "  bb {}", decl.name);
            }
        }
    }
    tree.visit(|info| {
        let indent = 2 + info.depth * 2;
        let _ = writeln!(out, "{:indent$}#{} {}", "", info.id, info.name);
    });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATROL: &str = "\
name: patrol
root:
  type: sequence
  children:
    - type: log
      message: leaving
    - type: wait
      duration: 0.25
    - type: breakpoint
";

    fn library_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, text) in files {
            std::fs::write(dir.path().join(name), text).unwrap();
        }
        dir
    }

    #[test]
    fn run_stops_on_completion_when_asked() {
        let dir = library_dir(&[("patrol.yaml", PATROL)]);
        let library = load_library(&[dir.path().to_path_buf()]).unwrap();
        let config = RunnerConfig {
            until_complete: true,
            ..RunnerConfig::default()
        };

        let host = ConsoleHost::new("patrol").quiet();
        let summary = run_tree(&library, "patrol", &config, host).unwrap();
        assert_eq!(summary.state, TreeState::Success);
        assert_eq!(summary.ticks, 3);
        #[cfg(feature = "breakpoints")]
        assert_eq!(summary.breaks, 1);
    }

    #[test]
    fn run_without_completion_uses_all_ticks() {
        let dir = library_dir(&[("patrol.yaml", PATROL)]);
        let library = load_library(&[dir.path().to_path_buf()]).unwrap();
        let config = RunnerConfig {
            max_ticks: 10,
            dt_seconds: 0.25,
            ..RunnerConfig::default()
        };

        let host = ConsoleHost::new("patrol").quiet();
        let summary = run_tree(&library, "patrol", &config, host).unwrap();
        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.clock, 2.5);
    }

    #[test]
    fn run_reports_unknown_tree() {
        let library = AssetLibrary::new();
        let err = run_tree(&library, "ghost", &RunnerConfig::default(), ConsoleHost::new("ghost"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("ghost"));
    }

    #[test]
    fn check_lists_broken_assets() {
        let dir = library_dir(&[
            ("patrol.yaml", PATROL),
            ("loop.yaml", "name: loop\nroot:\n  type: sub_tree\n  tree: loop\n"),
            ("bad.yaml", "name: bad\nroot:\n  type: wait\n  duration: -2\n"),
        ]);
        let library = load_library(&[dir.path().to_path_buf()]).unwrap();

        let failures = check_library(&library, bt::DEFAULT_MAX_SUBTREE_DEPTH);
        let names: Vec<_> = failures.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["bad", "loop"]);
        assert!(matches!(failures[1].1, BuildError::SubtreeCycle(_)));
    }

    #[test]
    fn missing_library_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_library(&[dir.path().join("nope")]).unwrap_err();
        assert!(format!("{err:#}").contains("nope"));
    }

    #[test]
    fn render_outlines_nodes_with_ids() {
        let dir = library_dir(&[("patrol.yaml", PATROL)]);
        let library = load_library(&[dir.path().to_path_buf()]).unwrap();

        let out = render_tree(&library, "patrol", bt::DEFAULT_MAX_SUBTREE_DEPTH).unwrap();
        assert_eq!(
            out,
            "patrol\n  #0 sequence\n    #1 log\n    #2 wait\n    #3 breakpoint\n"
        );
    }
}
