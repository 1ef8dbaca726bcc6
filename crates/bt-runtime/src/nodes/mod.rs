//! Built-in node library.
//!
//! - Composites: [`Sequence`], [`Priority`], [`MemSequence`], [`MemPriority`]
//! - Decorators: [`Inverter`], [`Limiter`], [`MaxTime`], [`Repeater`],
//!   [`RepeatUntilSuccess`], [`RepeatUntilFailure`]
//! - Actions: [`Succeeder`], [`Failer`], [`ErrorAction`], [`Runner`], [`Wait`]
//! - Closure leaves for trees built in code: [`Condition`], [`RunAction`]
//!
//! Every type except the closure leaves is available by name in
//! [`Registry::builtin`](crate::Registry::builtin).

use serde::de::DeserializeOwned;

use bt_core::{NodeId, Properties, State, Value};

use crate::{NodeError, NodeMeta, Tick};

pub mod actions;
pub mod composites;
pub mod decorators;
pub mod leaves;

pub use actions::{ErrorAction, Failer, Runner, Succeeder, Wait};
pub use composites::{MemPriority, MemSequence, Priority, Sequence};
pub use decorators::{
    Inverter, Limiter, MaxTime, RepeatUntilFailure, RepeatUntilSuccess, Repeater,
};
pub use leaves::{Condition, RunAction};

/// Resolves a node's authored properties into its typed parameter struct.
pub(crate) fn parse_properties<C: DeserializeOwned>(
    node: &str,
    properties: &Properties,
) -> Result<C, NodeError> {
    serde_json::from_value(Value::Object(properties.clone())).map_err(|source| {
        NodeError::InvalidProperties {
            node: node.to_owned(),
            source,
        }
    })
}

/// Unsigned counter stored in node memory; missing reads as zero.
pub(crate) fn read_count<T: 'static>(tick: &Tick<'_, T>, node: &NodeId, key: &str) -> u64 {
    tick.get(node, key).and_then(Value::as_u64).unwrap_or(0)
}

/// Decorators without a child cannot be evaluated.
pub(crate) fn missing_child(meta: &NodeMeta) -> State {
    tracing::warn!(node = %meta.id(), name = meta.name(), "decorator has no child");
    State::Error
}
