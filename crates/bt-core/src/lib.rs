//! Engine-agnostic behaviour tree primitives.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod host;
pub mod rng;
pub mod status;
pub mod tick;

pub use blackboard::{
    BbKey, Blackboard, BlackboardValue, Handle, KeyDecl, PairValue, PropertyPair, Value,
};
pub use host::Host;
pub use rng::{DeterministicRng, SplitMix64};
pub use status::{Outcome, Status};
pub use tick::TickContext;
