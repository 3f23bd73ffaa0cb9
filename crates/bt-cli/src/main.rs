//! bt - headless behaviour tree driver.
//!
//! - `bt run <TREE>` - tick a tree asset against a console host
//! - `bt check` - build every asset in the library
//! - `bt show <TREE>` - print a tree's node hierarchy

mod config;
mod host;
mod runner;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use config::{Overrides, RunnerConfig};
use host::ConsoleHost;

#[derive(Parser)]
#[command(name = "bt")]
#[command(about = "Run and inspect behaviour tree assets", version)]
struct Cli {
    /// Runner config file (defaults to ./bt.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tick a tree and print its final state
    Run {
        /// Asset name of the tree
        tree: String,

        /// Asset directory (repeatable, replaces the configured ones)
        #[arg(short, long = "library")]
        library: Vec<PathBuf>,

        /// Number of ticks to run
        #[arg(long)]
        ticks: Option<u64>,

        /// Seconds per tick
        #[arg(long)]
        dt: Option<f32>,

        /// Tree RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Stop once the root succeeds or fails
        #[arg(long)]
        until_complete: bool,

        /// Don't echo log nodes to stdout
        #[arg(short, long)]
        quiet: bool,
    },

    /// Build every asset and report the ones that fail
    Check {
        /// Asset directory (repeatable, replaces the configured ones)
        #[arg(short, long = "library")]
        library: Vec<PathBuf>,
    },

    /// Print the node hierarchy of a tree
    Show {
        /// Asset name of the tree
        tree: String,

        /// Asset directory (repeatable, replaces the configured ones)
        #[arg(short, long = "library")]
        library: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    if cli.log_json {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).with_target(false).init();
    }

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let config = RunnerConfig::discover(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Commands::Run {
            tree,
            library,
            ticks,
            dt,
            seed,
            until_complete,
            quiet,
        } => {
            let overrides = Overrides {
                library_dirs: library,
                dt_seconds: dt,
                max_ticks: ticks,
                seed,
                until_complete,
            };
            run(config, overrides, &cwd, &tree, quiet)
        }
        Commands::Check { library } => check(config, library, &cwd),
        Commands::Show { tree, library } => show(config, library, &cwd, &tree),
    }
}

fn resolve(mut config: RunnerConfig, overrides: Overrides, cwd: &Path) -> RunnerConfig {
    config.apply(overrides);
    config.resolve_paths(cwd);
    config
}

fn run(
    config: RunnerConfig,
    overrides: Overrides,
    cwd: &Path,
    tree: &str,
    quiet: bool,
) -> Result<()> {
    let config = resolve(config, overrides, cwd);
    if !(config.dt_seconds.is_finite() && config.dt_seconds >= 0.0) {
        bail!("dt must be a non-negative number of seconds, got {}", config.dt_seconds);
    }

    let library = runner::load_library(&config.library_dirs)?;
    let mut host = ConsoleHost::new(tree);
    if quiet {
        host = host.quiet();
    }

    let summary = runner::run_tree(&library, tree, &config, host)?;
    println!(
        "{}: {:?} after {} ticks ({:.3}s)",
        summary.tree, summary.state, summary.ticks, summary.clock
    );
    if summary.breaks > 0 {
        println!("  breakpoints hit: {}", summary.breaks);
    }
    Ok(())
}

fn check(config: RunnerConfig, library: Vec<PathBuf>, cwd: &Path) -> Result<()> {
    let overrides = Overrides {
        library_dirs: library,
        ..Overrides::default()
    };
    let config = resolve(config, overrides, cwd);
    let library = runner::load_library(&config.library_dirs)?;

    let failures = runner::check_library(&library, config.max_subtree_depth);
    for (name, err) in &failures {
        println!("  FAIL {name}: {err}");
    }
    println!(
        "{} trees checked, {} failed",
        library.len(),
        failures.len()
    );
    if !failures.is_empty() {
        bail!("{} of {} trees failed to build", failures.len(), library.len());
    }
    Ok(())
}

fn show(config: RunnerConfig, library: Vec<PathBuf>, cwd: &Path, tree: &str) -> Result<()> {
    let overrides = Overrides {
        library_dirs: library,
        ..Overrides::default()
    };
    let config = resolve(config, overrides, cwd);
    let library = runner::load_library(&config.library_dirs)?;
    print!(
        "{}",
        runner::render_tree(&library, tree, config.max_subtree_depth)?
    );
    Ok(())
}
