//! Serializable tree templates.
//!
//! A [`TreeAsset`] describes a node hierarchy plus blackboard declarations. Assets live in an
//! [`AssetLibrary`] (an explicit catalog, passed in by the caller) and are turned into runtime
//! trees by a [`TreeLoader`], which resolves `sub_tree` references by name and builds
//! `custom` nodes through a [`NodeRegistry`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bt_core::{Host, KeyDecl, PropertyPair};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    Breakpoint, BuildError, CompareProperty, Fail, Inverter, Log, Node, Parallel, RandomFailure,
    RandomSelector, ReactiveSelector, ReactiveSequence, Repeat, Selector, Sequence, SetProperty,
    SubTree, Succeed, Timeout, Tree, Wait, DEFAULT_MAX_SUBTREE_DEPTH,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeAsset {
    pub name: String,
    #[serde(default)]
    pub blackboard: Vec<KeyDecl>,
    pub root: NodeSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeSpec {
    Sequence {
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
    Selector {
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
    ReactiveSequence {
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
    ReactiveSelector {
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
    RandomSelector {
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
    Parallel {
        #[serde(default)]
        children: Vec<NodeSpec>,
        #[serde(default)]
        success_threshold: Option<usize>,
        #[serde(default = "default_failure_threshold")]
        failure_threshold: usize,
    },
    Succeed {
        #[serde(default)]
        child: Option<Box<NodeSpec>>,
    },
    Fail {
        #[serde(default)]
        child: Option<Box<NodeSpec>>,
    },
    Inverter {
        #[serde(default)]
        child: Option<Box<NodeSpec>>,
    },
    Repeat {
        #[serde(default)]
        child: Option<Box<NodeSpec>>,
        #[serde(default = "default_true")]
        restart_on_success: bool,
        #[serde(default)]
        restart_on_failure: bool,
        #[serde(default)]
        max_repeats: u32,
    },
    Timeout {
        #[serde(default)]
        child: Option<Box<NodeSpec>>,
        #[serde(default = "default_timeout")]
        duration: f32,
    },
    Wait {
        #[serde(default = "default_wait")]
        duration: f32,
    },
    Log {
        #[serde(default)]
        message: String,
    },
    SetProperty {
        pair: PropertyPair,
    },
    CompareProperty {
        pair: PropertyPair,
    },
    RandomFailure {
        #[serde(default = "default_chance_of_failure")]
        chance_of_failure: f32,
    },
    SubTree {
        #[serde(default)]
        tree: Option<String>,
    },
    Breakpoint,
    Custom {
        kind: String,
        #[serde(default)]
        params: serde_json::Value,
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
}

fn default_true() -> bool {
    true
}
fn default_failure_threshold() -> usize {
    1
}
fn default_timeout() -> f32 {
    1.0
}
fn default_wait() -> f32 {
    1.0
}
fn default_chance_of_failure() -> f32 {
    0.5
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse {origin}: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("duplicate tree asset `{0}`")]
    Duplicate(String),
}

impl TreeAsset {
    pub fn from_json_str(s: &str) -> Result<Self, AssetError> {
        serde_json::from_str(s).map_err(|source| AssetError::Json {
            origin: "<inline json>".to_owned(),
            source,
        })
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, AssetError> {
        serde_yaml::from_str(s).map_err(|source| AssetError::Yaml {
            origin: "<inline yaml>".to_owned(),
            source,
        })
    }

    /// Reads one asset; the format is picked from the extension (`.json`, else YAML).
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let text = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let origin = path.display().to_string();
        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&text).map_err(|source| AssetError::Json { origin, source })
        } else {
            serde_yaml::from_str(&text).map_err(|source| AssetError::Yaml { origin, source })
        }
    }
}

/// Named catalog of tree assets.
#[derive(Debug, Clone, Default)]
pub struct AssetLibrary {
    assets: BTreeMap<String, TreeAsset>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset: TreeAsset) -> Result<(), AssetError> {
        if self.assets.contains_key(&asset.name) {
            return Err(AssetError::Duplicate(asset.name));
        }
        self.assets.insert(asset.name.clone(), asset);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TreeAsset> {
        self.assets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Loads every `*.json`, `*.yaml` and `*.yml` file directly under `dir`, in name order.
    /// Returns the number of assets added.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, AssetError> {
        let io_err = |source| AssetError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_asset = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| matches!(ext, "json" | "yaml" | "yml"));
            if path.is_file() && is_asset {
                paths.push(path);
            }
        }
        paths.sort();

        let count = paths.len();
        for path in paths {
            let asset = TreeAsset::load(&path)?;
            tracing::debug!(asset = %asset.name, path = %path.display(), "loaded tree asset");
            self.insert(asset)?;
        }
        Ok(count)
    }
}

/// Builds a custom node from its params and already-built children.
pub trait NodeFactory<C: Host>: 'static {
    fn build(&self, params: &serde_json::Value, children: Vec<Node<C>>)
        -> Result<Node<C>, BuildError>;
}

impl<C, F> NodeFactory<C> for F
where
    C: Host,
    F: Fn(&serde_json::Value, Vec<Node<C>>) -> Result<Node<C>, BuildError> + 'static,
{
    fn build(
        &self,
        params: &serde_json::Value,
        children: Vec<Node<C>>,
    ) -> Result<Node<C>, BuildError> {
        self(params, children)
    }
}

/// Factory map for `custom` nodes, keyed by kind.
pub struct NodeRegistry<C: Host> {
    factories: BTreeMap<String, Box<dyn NodeFactory<C>>>,
}

impl<C: Host> Default for NodeRegistry<C> {
    fn default() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }
}

impl<C: Host> NodeRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `kind`, replacing any previous one.
    pub fn register(&mut self, kind: impl Into<String>, factory: impl NodeFactory<C>) {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    pub fn with(mut self, kind: impl Into<String>, factory: impl NodeFactory<C>) -> Self {
        self.register(kind, factory);
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn build(
        &self,
        kind: &str,
        params: &serde_json::Value,
        children: Vec<Node<C>>,
    ) -> Result<Node<C>, BuildError> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| BuildError::UnknownNodeKind(kind.to_owned()))?;
        factory.build(params, children)
    }
}

/// Deserializes custom node params, mapping failures to [`BuildError::InvalidCustomParams`].
pub fn parse_params<T: DeserializeOwned>(
    kind: &str,
    params: &serde_json::Value,
) -> Result<T, BuildError> {
    T::deserialize(params).map_err(|err| BuildError::InvalidCustomParams {
        kind: kind.to_owned(),
        reason: err.to_string(),
    })
}

/// Turns library assets into runtime trees.
pub struct TreeLoader<'a, C: Host> {
    library: &'a AssetLibrary,
    registry: &'a NodeRegistry<C>,
    max_depth: usize,
}

impl<'a, C: Host> TreeLoader<'a, C> {
    pub fn new(library: &'a AssetLibrary, registry: &'a NodeRegistry<C>) -> Self {
        Self {
            library,
            registry,
            max_depth: DEFAULT_MAX_SUBTREE_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Builds the named tree and, recursively, every sub-tree it references.
    pub fn build(&self, name: &str) -> Result<Tree<C>, BuildError> {
        let mut stack = Vec::new();
        self.build_tree(name, &mut stack)
    }

    fn build_tree(&self, name: &str, stack: &mut Vec<String>) -> Result<Tree<C>, BuildError> {
        if stack.iter().any(|n| n == name) {
            let mut chain = stack.clone();
            chain.push(name.to_owned());
            return Err(BuildError::SubtreeCycle(chain));
        }
        if stack.len() > self.max_depth {
            return Err(BuildError::DepthLimit {
                limit: self.max_depth,
            });
        }
        let asset = self
            .library
            .get(name)
            .ok_or_else(|| BuildError::UnknownAsset(name.to_owned()))?;

        stack.push(name.to_owned());
        let root = self.build_node(&asset.root, stack)?;
        stack.pop();

        Ok(Tree::new(root)
            .with_name(asset.name.clone())
            .with_blackboard(asset.blackboard.iter().cloned())
            .with_max_subtree_depth(self.max_depth))
    }

    fn build_children(
        &self,
        specs: &[NodeSpec],
        stack: &mut Vec<String>,
    ) -> Result<Vec<Node<C>>, BuildError> {
        specs.iter().map(|s| self.build_node(s, stack)).collect()
    }

    fn build_child(
        &self,
        spec: &Option<Box<NodeSpec>>,
        stack: &mut Vec<String>,
    ) -> Result<Option<Node<C>>, BuildError> {
        spec.as_deref()
            .map(|s| self.build_node(s, stack))
            .transpose()
    }

    fn build_node(&self, spec: &NodeSpec, stack: &mut Vec<String>) -> Result<Node<C>, BuildError> {
        let node = match spec {
            NodeSpec::Sequence { children } => {
                Node::new(Sequence::new(self.build_children(children, stack)?))
            }
            NodeSpec::Selector { children } => {
                Node::new(Selector::new(self.build_children(children, stack)?))
            }
            NodeSpec::ReactiveSequence { children } => {
                Node::new(ReactiveSequence::new(self.build_children(children, stack)?))
            }
            NodeSpec::ReactiveSelector { children } => {
                Node::new(ReactiveSelector::new(self.build_children(children, stack)?))
            }
            NodeSpec::RandomSelector { children } => {
                Node::new(RandomSelector::new(self.build_children(children, stack)?))
            }
            NodeSpec::Parallel {
                children,
                success_threshold,
                failure_threshold,
            } => {
                if *failure_threshold == 0 {
                    return Err(invalid("parallel", "failure_threshold", "must be at least 1"));
                }
                let mut parallel = Parallel::new(self.build_children(children, stack)?)
                    .with_failure_threshold(*failure_threshold);
                if let Some(n) = success_threshold {
                    parallel = parallel.with_success_threshold(*n);
                }
                Node::new(parallel)
            }
            NodeSpec::Succeed { child } => Node::new(match self.build_child(child, stack)? {
                Some(child) => Succeed::new(child),
                None => Succeed::default(),
            }),
            NodeSpec::Fail { child } => Node::new(match self.build_child(child, stack)? {
                Some(child) => Fail::new(child),
                None => Fail::default(),
            }),
            NodeSpec::Inverter { child } => Node::new(match self.build_child(child, stack)? {
                Some(child) => Inverter::new(child),
                None => Inverter::default(),
            }),
            NodeSpec::Repeat {
                child,
                restart_on_success,
                restart_on_failure,
                max_repeats,
            } => {
                let repeat = match self.build_child(child, stack)? {
                    Some(child) => Repeat::new(child),
                    None => Repeat::default(),
                };
                Node::new(
                    repeat
                        .restart_on_success(*restart_on_success)
                        .restart_on_failure(*restart_on_failure)
                        .max_repeats(*max_repeats),
                )
            }
            NodeSpec::Timeout { child, duration } => {
                check_duration("timeout", *duration)?;
                Node::new(match self.build_child(child, stack)? {
                    Some(child) => Timeout::new(child, *duration),
                    None => Timeout::empty(*duration),
                })
            }
            NodeSpec::Wait { duration } => {
                check_duration("wait", *duration)?;
                Node::new(Wait::new(*duration))
            }
            NodeSpec::Log { message } => Node::new(Log::new(message.clone())),
            NodeSpec::SetProperty { pair } => Node::new(SetProperty::new(pair.clone())),
            NodeSpec::CompareProperty { pair } => Node::new(CompareProperty::new(pair.clone())),
            NodeSpec::RandomFailure { chance_of_failure } => {
                if !(0.0..=1.0).contains(chance_of_failure) {
                    return Err(invalid(
                        "random_failure",
                        "chance_of_failure",
                        format!("{chance_of_failure} is outside [0, 1]"),
                    ));
                }
                Node::new(RandomFailure::new(*chance_of_failure))
            }
            NodeSpec::SubTree { tree } => match tree {
                Some(name) => Node::new(SubTree::new(self.build_tree(name, stack)?)),
                None => Node::new(SubTree::unassigned()),
            },
            NodeSpec::Breakpoint => Node::new(Breakpoint),
            NodeSpec::Custom {
                kind,
                params,
                children,
            } => {
                let children = self.build_children(children, stack)?;
                self.registry.build(kind, params, children)?
            }
        };
        Ok(node)
    }
}

fn invalid(node: &'static str, param: &'static str, reason: impl Into<String>) -> BuildError {
    BuildError::InvalidParameter {
        node,
        param,
        reason: reason.into(),
    }
}

fn check_duration(node: &'static str, duration: f32) -> Result<(), BuildError> {
    if duration.is_finite() && duration >= 0.0 {
        Ok(())
    } else {
        Err(invalid(
            node,
            "duration",
            format!("{duration} is not a non-negative number of seconds"),
        ))
    }
}
