//! Tooling primitives for behaviour trees.
//!
//! This crate is intentionally lightweight and engine-agnostic. Editor views and inspectors
//! should live in dedicated adapter crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod host;
pub mod trace;

pub use host::{HostEvent, RecordingHost};
pub use trace::{NullTraceSink, SharedTraceSink, TraceEvent, TraceLog, TraceSink, VecTraceSink};
