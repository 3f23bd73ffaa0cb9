//! Runner configuration, loaded from `bt.yaml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "bt.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Directories scanned for tree assets, in order.
    #[serde(default = "default_library_dirs")]
    pub library_dirs: Vec<PathBuf>,

    /// Seconds of tree time per tick
    #[serde(default = "default_dt_seconds")]
    pub dt_seconds: f32,

    /// Upper bound on ticks for one run
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Tree RNG seed
    #[serde(default)]
    pub seed: u64,

    /// Stop as soon as the root reports success or failure.
    #[serde(default)]
    pub until_complete: bool,

    /// Sub-tree nesting limit
    #[serde(default = "default_max_subtree_depth")]
    pub max_subtree_depth: usize,
}

fn default_library_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("trees")]
}
fn default_dt_seconds() -> f32 {
    0.1
}
fn default_max_ticks() -> u64 {
    100
}
fn default_max_subtree_depth() -> usize {
    bt::DEFAULT_MAX_SUBTREE_DEPTH
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            library_dirs: default_library_dirs(),
            dt_seconds: default_dt_seconds(),
            max_ticks: default_max_ticks(),
            seed: 0,
            until_complete: false,
            max_subtree_depth: default_max_subtree_depth(),
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub library_dirs: Vec<PathBuf>,
    pub dt_seconds: Option<f32>,
    pub max_ticks: Option<u64>,
    pub seed: Option<u64>,
    pub until_complete: bool,
}

impl RunnerConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Loads `explicit` if given, else `bt.yaml` under `dir` when present, else the defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let path = dir.join(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve relative library directories against `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        for dir in &mut self.library_dirs {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if !overrides.library_dirs.is_empty() {
            self.library_dirs = overrides.library_dirs;
        }
        if let Some(dt) = overrides.dt_seconds {
            self.dt_seconds = dt;
        }
        if let Some(ticks) = overrides.max_ticks {
            self.max_ticks = ticks;
        }
        if let Some(seed) = overrides.seed {
            self.seed = seed;
        }
        self.until_complete |= overrides.until_complete;
    }
}
