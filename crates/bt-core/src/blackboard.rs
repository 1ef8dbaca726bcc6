use std::collections::HashMap;

use crate::Value;

type Memory = HashMap<String, Value>;

#[derive(Debug, Default)]
struct TreeMemory {
    values: Memory,
    nodes: HashMap<String, Memory>,
}

/// Scoped key/value memory shared by the nodes of one or more trees.
///
/// Three tiers, picked by the scopes passed to [`get`](Self::get) and
/// [`set`](Self::set):
///
/// - `(key, None, _)`: global memory. A node scope without a tree scope also
///   lands here.
/// - `(key, Some(tree), None)`: memory private to one tree.
/// - `(key, Some(tree), Some(node))`: memory private to one node of one tree.
///
/// Tree and node memory is created on first write. Nothing is ever evicted;
/// callers own one blackboard per target entity and drop it with the entity.
#[derive(Debug, Default)]
pub struct Blackboard {
    base: Memory,
    trees: HashMap<String, TreeMemory>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
        tree_scope: Option<&str>,
        node_scope: Option<&str>,
    ) {
        self.memory_mut(tree_scope, node_scope)
            .insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str, tree_scope: Option<&str>, node_scope: Option<&str>) -> Option<&Value> {
        self.memory(tree_scope, node_scope)?.get(key)
    }

    pub fn contains(&self, key: &str, tree_scope: Option<&str>, node_scope: Option<&str>) -> bool {
        self.get(key, tree_scope, node_scope).is_some()
    }

    /// Whether any memory was ever written for `tree`.
    pub fn has_tree_memory(&self, tree: &str) -> bool {
        self.trees.contains_key(tree)
    }

    fn memory(&self, tree_scope: Option<&str>, node_scope: Option<&str>) -> Option<&Memory> {
        let Some(tree) = tree_scope else {
            return Some(&self.base);
        };
        let tree_memory = self.trees.get(tree)?;
        match node_scope {
            Some(node) => tree_memory.nodes.get(node),
            None => Some(&tree_memory.values),
        }
    }

    fn memory_mut(&mut self, tree_scope: Option<&str>, node_scope: Option<&str>) -> &mut Memory {
        let Some(tree) = tree_scope else {
            return &mut self.base;
        };
        let tree_memory = self.trees.entry(tree.to_owned()).or_default();
        match node_scope {
            Some(node) => tree_memory.nodes.entry(node.to_owned()).or_default(),
            None => &mut tree_memory.values,
        }
    }
}
