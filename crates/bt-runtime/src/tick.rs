use bt_core::{Blackboard, NodeId, State, TreeId, Value};
use bt_tools::{Phase, TraceEvent, TraceSink};

use crate::keys;
use crate::{BehaviorTree, NodeMeta};

/// Context of a single traversal.
///
/// Created by [`BehaviorTree::tick`] and dropped when it returns. Besides
/// handing nodes their target and blackboard, it records which nodes were
/// entered and not closed (the open-node stack) and how many nodes ran.
pub struct Tick<'a, T> {
    pub(crate) tree: &'a BehaviorTree<T>,
    pub(crate) target: &'a mut T,
    pub(crate) blackboard: &'a mut Blackboard,
    pub(crate) debug: Option<&'a mut (dyn TraceSink + 'a)>,
    pub(crate) open_nodes: Vec<NodeId>,
    pub(crate) node_count: usize,
}

impl<'a, T: 'static> Tick<'a, T> {
    pub(crate) fn new(
        tree: &'a BehaviorTree<T>,
        target: &'a mut T,
        blackboard: &'a mut Blackboard,
        debug: Option<&'a mut (dyn TraceSink + 'a)>,
    ) -> Self {
        Self {
            tree,
            target,
            blackboard,
            debug,
            open_nodes: Vec::new(),
            node_count: 0,
        }
    }

    pub fn tree(&self) -> &'a BehaviorTree<T> {
        self.tree
    }

    pub fn tree_id(&self) -> &'a TreeId {
        self.tree.id()
    }

    pub fn target(&self) -> &T {
        &*self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut *self.target
    }

    pub fn blackboard(&self) -> &Blackboard {
        &*self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut *self.blackboard
    }

    /// Target and blackboard borrowed together, for leaves that touch both.
    pub fn parts_mut(&mut self) -> (&mut T, &mut Blackboard) {
        (&mut *self.target, &mut *self.blackboard)
    }

    /// Whether lifecycle events are being traced.
    pub fn is_debug(&self) -> bool {
        self.debug.is_some()
    }

    /// Nodes entered and not yet closed, in traversal order.
    pub fn open_nodes(&self) -> &[NodeId] {
        &self.open_nodes
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Current reading of the tree's clock, in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.tree.clock().now_ms()
    }

    /// Reads `key` from the memory of `node` in this tree.
    pub fn get(&self, node: &NodeId, key: &str) -> Option<&Value> {
        self.blackboard
            .get(key, Some(self.tree.id().as_str()), Some(node.as_str()))
    }

    /// Writes `key` into the memory of `node` in this tree.
    pub fn set(&mut self, node: &NodeId, key: &str, value: impl Into<Value>) {
        self.blackboard.set(
            key,
            value,
            Some(self.tree.id().as_str()),
            Some(node.as_str()),
        );
    }

    pub(crate) fn is_open(&self, node: &NodeId) -> bool {
        self.get(node, keys::IS_OPEN)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub(crate) fn enter_node(&mut self, node: &NodeMeta) {
        self.node_count += 1;
        self.open_nodes.push(node.id().clone());
        self.trace(node, Phase::Enter, None);
    }

    pub(crate) fn open_node(&mut self, node: &NodeMeta) {
        self.set(node.id(), keys::IS_OPEN, true);
        self.trace(node, Phase::Open, None);
    }

    pub(crate) fn tick_node(&mut self, node: &NodeMeta) {
        self.trace(node, Phase::Tick, None);
    }

    /// Removes `node` from the open-node stack along with every entry above
    /// it, returning those entries in traversal order.
    ///
    /// Anything above a closing node is a descendant it entered and left
    /// running. Nodes not on the stack leave it untouched.
    pub(crate) fn truncate_open(&mut self, node: &NodeId) -> Vec<NodeId> {
        match self.open_nodes.iter().rposition(|id| id == node) {
            Some(pos) => {
                let mut above = self.open_nodes.split_off(pos);
                above.remove(0);
                above
            }
            None => Vec::new(),
        }
    }

    pub(crate) fn close_node(&mut self, node: &NodeMeta) {
        self.set(node.id(), keys::IS_OPEN, false);
        self.trace(node, Phase::Close, None);
    }

    pub(crate) fn exit_node(&mut self, node: &NodeMeta, state: State) {
        self.trace(node, Phase::Exit, Some(state));
    }

    fn trace(&mut self, node: &NodeMeta, phase: Phase, state: Option<State>) {
        tracing::trace!(
            tree = %self.tree.id(),
            node = %node.id(),
            name = node.name(),
            phase = phase.as_str(),
            state = ?state,
            "bt.lifecycle"
        );

        if let Some(sink) = self.debug.as_deref_mut() {
            let mut event = TraceEvent::new(
                self.tree.id().clone(),
                node.id().clone(),
                node.name(),
                phase,
            );
            event.state = state;
            sink.emit(event);
        }
    }
}
