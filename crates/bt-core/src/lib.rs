//! Engine-agnostic behavior tree primitives.
//!
//! Everything here is independent of the node library: the traversal result
//! ([`State`]), identifiers, the heterogeneous [`Value`] type used for node
//! configuration and memory, the scoped [`Blackboard`], and the [`Clock`]
//! time-gated nodes read from.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod clock;
pub mod id;
pub mod state;
pub mod value;

pub use blackboard::Blackboard;
pub use clock::{Clock, ManualClock, SystemClock};
pub use id::{NodeId, TreeId};
pub use state::State;
pub use value::{Properties, Value};
