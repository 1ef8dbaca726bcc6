//! Behavior tree runtime built on `bt-core`.
//!
//! A [`BehaviorTree`] owns a root [`Node`] and evaluates it once per call to
//! [`BehaviorTree::tick`] against a caller-owned target and [`Blackboard`].
//! Nodes keep no per-run state of their own: everything that must survive
//! between ticks (open flags, resume indices, counters, start times) lives in
//! the blackboard, scoped by tree id and node id. That is what lets one tree
//! drive many targets, and several trees share one blackboard.
//!
//! Trees can be built in code from the [`nodes`] library or loaded from
//! [`TreeData`] through a [`Registry`] of node factories.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod data;
pub mod error;
pub mod keys;
pub mod node;
pub mod nodes;
pub mod registry;
pub mod tick;
pub mod tree;

pub use bt_core::{
    Blackboard, Clock, ManualClock, NodeId, Properties, State, SystemClock, TreeId, Value,
};
pub use data::{CustomNodeData, NodeData, TreeData};
pub use error::{NodeError, TreeError};
pub use node::{Category, Node, NodeMeta};
pub use registry::{Factory, Registry};
pub use tick::Tick;
pub use tree::BehaviorTree;
