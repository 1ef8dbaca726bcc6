//! Plain-data form of a tree, as produced by [`BehaviorTree::dump`] and
//! consumed by [`BehaviorTree::load`].
//!
//! [`BehaviorTree::dump`]: crate::BehaviorTree::dump
//! [`BehaviorTree::load`]: crate::BehaviorTree::load

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use bt_core::{NodeId, Properties, TreeId};

use crate::{Category, NodeMeta};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TreeId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub root: Option<NodeId>,
    /// Every node of the tree, keyed by id.
    #[serde(default)]
    pub nodes: BTreeMap<NodeId, NodeData>,
    /// Node types referenced by the tree that are not built in.
    #[serde(default)]
    pub custom_nodes: Vec<CustomNodeData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub parameters: Properties,
    /// Composites only, in evaluation order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeId>>,
    /// Decorators only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<NodeId>,
}

impl NodeData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            title: String::new(),
            description: String::new(),
            properties: Properties::new(),
            parameters: Properties::new(),
            children: None,
            child: None,
        }
    }
}

impl From<&NodeMeta> for NodeData {
    fn from(meta: &NodeMeta) -> Self {
        Self {
            id: Some(meta.id().clone()),
            name: meta.name().to_owned(),
            title: meta.title().to_owned(),
            description: meta.description().to_owned(),
            properties: meta.properties().clone(),
            parameters: meta.parameters().clone(),
            children: None,
            child: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomNodeData {
    pub name: String,
    #[serde(default)]
    pub title: String,
    pub category: Category,
}
