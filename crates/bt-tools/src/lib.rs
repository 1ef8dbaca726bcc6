//! Tooling primitives for behavior tree runtimes.
//!
//! This crate is intentionally lightweight and engine-agnostic: it only defines
//! the lifecycle trace events a tick emits while debugging and a few sinks to
//! collect them. Inspectors and editors build on top of these.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{NullTraceSink, Phase, TraceEvent, TraceSink, TracingSink, VecTraceSink};
