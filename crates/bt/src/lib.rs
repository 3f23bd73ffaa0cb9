//! Tick-driven behaviour tree runtime built on `bt-core`.
//!
//! A [`Tree`] owns a root [`Node`] and a blackboard. The host calls [`Tree::update`] once per
//! frame; the status bubbles up from the leaves as `Running`, `Success` or `Failure`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod actions;
#[cfg(feature = "asset")]
#[cfg_attr(docsrs, doc(cfg(feature = "asset")))]
pub mod asset;
pub mod builder;
pub mod composites;
pub mod decorators;
pub mod error;
pub mod node;
pub mod tree;

pub use actions::{
    Breakpoint, CompareProperty, Condition, Log, RandomFailure, SetProperty, SubTree, Wait,
};
#[cfg(feature = "asset")]
pub use asset::{AssetError, AssetLibrary, NodeFactory, NodeRegistry, NodeSpec, TreeAsset, TreeLoader};
pub use composites::{
    Parallel, RandomSelector, ReactiveSelector, ReactiveSequence, Selector, Sequence,
};
pub use decorators::{Fail, Inverter, Repeat, Succeed, Timeout};
pub use error::BuildError;
pub use node::{Behaviour, BehaviourClone, InitContext, Node, NodeContext, NodeInfo};
pub use tree::{Tree, TreeState, DEFAULT_MAX_SUBTREE_DEPTH};

pub use bt_core::{
    BbKey, Blackboard, Handle, Host, KeyDecl, PairValue, PropertyPair, Status, TickContext, Value,
};
