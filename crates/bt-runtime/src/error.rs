use bt_core::NodeId;
use thiserror::Error;

use crate::Category;

/// A node could not be constructed from its parameters.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("{node}: `{parameter}` is an obligatory parameter")]
    MissingParameter {
        node: &'static str,
        parameter: &'static str,
    },

    #[error("{node}: invalid properties: {source}")]
    InvalidProperties {
        node: String,
        source: serde_json::Error,
    },

    #[error("{0}")]
    Custom(String),
}

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("behavior tree has no root node")]
    NoRoot,

    #[error("invalid node name \"{0}\"")]
    UnknownNode(String),

    #[error("root node `{0}` is not defined in the tree data")]
    MissingRoot(NodeId),

    #[error("node `{parent}` references undefined node `{child}`")]
    MissingNode { parent: NodeId, child: NodeId },

    #[error("node `{0}` is referenced more than once")]
    SharedNode(NodeId),

    /// The entry links children the node's category cannot hold, or the node
    /// did not accept them.
    #[error("node `{node}` ({}) cannot hold `{link}`", .category.as_str())]
    UnexpectedLink {
        node: NodeId,
        category: Category,
        link: &'static str,
    },

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("malformed tree data: {0}")]
    Json(#[from] serde_json::Error),
}
