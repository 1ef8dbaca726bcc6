//! Blackboard keys written by the runtime and the built-in nodes.
//!
//! Tree-scoped keys live in `(key, tree)`; node-scoped keys in
//! `(key, tree, node)`. Custom nodes should avoid reusing the node-scoped
//! names for unrelated data.

/// Tree scope: ids of the nodes left open by the last traversal.
pub const OPEN_NODES: &str = "openNodes";
/// Tree scope: number of nodes entered by the last traversal.
pub const NODE_COUNT: &str = "nodeCount";

/// Node scope: whether the node returned `Running` last time it was ticked.
pub const IS_OPEN: &str = "isOpen";
/// Node scope: child index a memory composite resumes from.
pub const RUNNING_CHILD: &str = "runningChild";
/// Node scope: clock reading (ms) taken when a timed node opened.
pub const START_TIME: &str = "startTime";
/// Node scope: loop/activation counter of limiting and repeating decorators.
pub const COUNT: &str = "i";
