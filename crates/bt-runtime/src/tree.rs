use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use bt_core::{Blackboard, Clock, NodeId, Properties, State, SystemClock, TreeId, Value};
use bt_tools::TraceSink;

use crate::data::{CustomNodeData, NodeData, TreeData};
use crate::keys;
use crate::{Category, Node, Registry, Tick, TreeError};

const DEFAULT_TITLE: &str = "The behavior tree";
const DEFAULT_DESCRIPTION: &str = "Default description";

/// A rooted tree of nodes evaluated against targets of type `T`.
///
/// The tree itself holds no run state: [`tick`](Self::tick) takes `&self`,
/// and everything that must persist between ticks is written to the
/// blackboard under this tree's id. One tree can therefore drive any number
/// of targets, each with its own blackboard.
pub struct BehaviorTree<T> {
    id: TreeId,
    title: String,
    description: String,
    properties: Properties,
    root: Option<Box<dyn Node<T>>>,
    clock: Arc<dyn Clock>,
    /// Type tags the last `load` resolved through the caller's registry.
    caller_names: BTreeSet<String>,
}

impl<T: 'static> BehaviorTree<T> {
    /// Empty tree with a fresh id and the system clock.
    pub fn new() -> Self {
        Self {
            id: TreeId::generate(),
            title: DEFAULT_TITLE.to_owned(),
            description: DEFAULT_DESCRIPTION.to_owned(),
            properties: Properties::new(),
            root: None,
            clock: Arc::new(SystemClock),
            caller_names: BTreeSet::new(),
        }
    }

    pub fn with_root(root: Box<dyn Node<T>>) -> Self {
        let mut tree = Self::new();
        tree.root = Some(root);
        tree
    }

    /// Clock read by time-gated nodes (`Wait`, `MaxTime`).
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Builds a tree from data; see [`load`](Self::load).
    pub fn from_data(data: &TreeData, names: Option<&Registry<T>>) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        tree.load(data, names)?;
        Ok(tree)
    }

    pub fn id(&self) -> &TreeId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    pub fn root(&self) -> Option<&dyn Node<T>> {
        self.root.as_deref()
    }

    pub fn set_root(&mut self, root: Option<Box<dyn Node<T>>>) {
        self.root = root;
    }

    pub fn clock(&self) -> &dyn Clock {
        &*self.clock
    }

    pub fn set_clock(&mut self, clock: impl Clock + 'static) {
        self.clock = Arc::new(clock);
    }

    /// Finds a node of this tree by id.
    pub fn find(&self, id: &NodeId) -> Option<&dyn Node<T>> {
        self.root()?.find(id)
    }

    /// Runs one traversal of the tree against `target`.
    ///
    /// After the root returns, nodes that were left open by the previous
    /// traversal but were not reached again this time are closed, so their
    /// `close` hooks run and they start fresh when next visited.
    pub fn tick(&self, target: &mut T, blackboard: &mut Blackboard) -> Result<State, TreeError> {
        self.run(target, blackboard, None)
    }

    /// [`tick`](Self::tick), emitting every lifecycle step into `sink`.
    pub fn tick_traced(
        &self,
        target: &mut T,
        blackboard: &mut Blackboard,
        sink: &mut dyn TraceSink,
    ) -> Result<State, TreeError> {
        self.run(target, blackboard, Some(sink))
    }

    /// Ids of the nodes the last traversal left open, as stored in `blackboard`.
    pub fn open_nodes(&self, blackboard: &Blackboard) -> Vec<NodeId> {
        blackboard
            .get(keys::OPEN_NODES, Some(self.id.as_str()), None)
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(NodeId::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of nodes entered by the last traversal, as stored in `blackboard`.
    pub fn node_count(&self, blackboard: &Blackboard) -> usize {
        blackboard
            .get(keys::NODE_COUNT, Some(self.id.as_str()), None)
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize
    }

    fn run<'a>(
        &'a self,
        target: &'a mut T,
        blackboard: &'a mut Blackboard,
        debug: Option<&'a mut (dyn TraceSink + 'a)>,
    ) -> Result<State, TreeError> {
        let root = self.root.as_deref().ok_or(TreeError::NoRoot)?;
        let last_open = self.open_nodes(blackboard);

        let mut tick = Tick::new(self, target, blackboard, debug);
        let state = root.execute(&mut tick);

        let current_open = tick.open_nodes.clone();
        let start = last_open
            .iter()
            .zip(&current_open)
            .take_while(|(last, current)| last == current)
            .count();

        for id in last_open[start..].iter().rev() {
            if !tick.is_open(id) {
                continue;
            }
            match root.find(id) {
                Some(node) => {
                    tracing::debug!(tree = %self.id, node = %id, name = node.name(), "closing node no longer visited");
                    node.release(&mut tick);
                }
                None => {
                    tracing::debug!(tree = %self.id, node = %id, "open node is no longer part of the tree");
                }
            }
        }

        let node_count = tick.node_count;
        let ids: Vec<Value> = current_open
            .into_iter()
            .map(|id| Value::String(id.into_string()))
            .collect();
        let tree_scope = Some(self.id.as_str());
        tick.blackboard
            .set(keys::OPEN_NODES, Value::Array(ids), tree_scope, None);
        tick.blackboard
            .set(keys::NODE_COUNT, node_count, tree_scope, None);

        Ok(state)
    }

    /// Replaces this tree's content with `data`.
    ///
    /// Nodes are created by type name, looking in `names` first and then in
    /// the built-in registry. Once every node exists, children are attached
    /// by id starting from `data.root`. Nodes no other node references are
    /// dropped. The tree id only changes when the data carries one.
    ///
    /// Structure is checked before anything is replaced: dangling, shared or
    /// cyclic references fail, and so does a link the node's category cannot
    /// hold (a composite with `child`, a decorator with `children`, a leaf
    /// with either).
    pub fn load(&mut self, data: &TreeData, names: Option<&Registry<T>>) -> Result<(), TreeError> {
        let builtin = Registry::builtin();

        let mut caller_names = BTreeSet::new();
        let mut nodes: HashMap<&str, Box<dyn Node<T>>> = HashMap::with_capacity(data.nodes.len());
        for (key, entry) in &data.nodes {
            let from_caller =
                names.and_then(|registry| registry.create(&entry.name, &entry.properties));
            let created = match from_caller {
                Some(created) => {
                    caller_names.insert(entry.name.clone());
                    created
                }
                None => builtin
                    .create(&entry.name, &entry.properties)
                    .ok_or_else(|| TreeError::UnknownNode(entry.name.clone()))?,
            };
            let mut node = created?;

            let meta = node.meta_mut();
            meta.set_id(entry.id.clone().unwrap_or_else(|| key.clone()));
            if !entry.title.is_empty() {
                meta.set_title(entry.title.as_str());
            }
            if !entry.description.is_empty() {
                meta.set_description(entry.description.as_str());
            }
            meta.properties_mut()
                .extend(entry.properties.iter().map(|(k, v)| (k.clone(), v.clone())));
            meta.parameters_mut()
                .extend(entry.parameters.iter().map(|(k, v)| (k.clone(), v.clone())));

            nodes.insert(key.as_str(), node);
        }

        let root = match &data.root {
            Some(root_id) => {
                if !data.nodes.contains_key(root_id) {
                    return Err(TreeError::MissingRoot(root_id.clone()));
                }
                Some(assemble(root_id, data, &mut nodes)?)
            }
            None => None,
        };

        if !nodes.is_empty() {
            tracing::debug!(tree = %self.id, count = nodes.len(), "dropping unreachable nodes");
        }

        if let Some(id) = &data.id {
            self.id = id.clone();
        }
        if !data.title.is_empty() {
            self.title = data.title.clone();
        }
        if !data.description.is_empty() {
            self.description = data.description.clone();
        }
        if !data.properties.is_empty() {
            self.properties = data.properties.clone();
        }
        self.root = root;
        self.caller_names = caller_names;

        tracing::debug!(tree = %self.id, nodes = data.nodes.len(), "loaded behavior tree");
        Ok(())
    }

    /// [`load`](Self::load) from a JSON document.
    pub fn load_json(&mut self, json: &str, names: Option<&Registry<T>>) -> Result<(), TreeError> {
        let data: TreeData = serde_json::from_str(json)?;
        self.load(&data, names)
    }

    /// Serializes the structure and authored data of the tree.
    ///
    /// Node memory (counters, start times, open flags) lives in blackboards
    /// and is not part of the dump.
    ///
    /// `custom_nodes` lists every type tag that is not built in, plus built-in
    /// tags the last [`load`](Self::load) resolved through the caller's
    /// registry. A tree built in code that reuses a built-in tag for its own
    /// node type is not detected.
    pub fn dump(&self) -> TreeData {
        let mut data = TreeData {
            id: None,
            title: self.title.clone(),
            description: self.description.clone(),
            properties: self.properties.clone(),
            root: self.root.as_ref().map(|root| root.id().clone()),
            nodes: Default::default(),
            custom_nodes: Vec::new(),
        };

        let Some(root) = self.root.as_deref() else {
            return data;
        };

        let mut custom_names = HashSet::new();
        let mut stack: Vec<&dyn Node<T>> = vec![root];
        while let Some(node) = stack.pop() {
            let meta = node.meta();

            let custom =
                !Registry::<T>::is_builtin(meta.name()) || self.caller_names.contains(meta.name());
            if custom && custom_names.insert(meta.name().to_owned()) {
                data.custom_nodes.push(CustomNodeData {
                    name: meta.name().to_owned(),
                    title: meta.title().to_owned(),
                    category: meta.category(),
                });
            }

            let mut entry = NodeData::from(meta);
            match meta.category() {
                Category::Composite => {
                    let children = node.children();
                    entry.children = Some(children.iter().map(|c| c.id().clone()).collect());
                    stack.extend(children.iter().rev().map(|c| &**c));
                }
                Category::Decorator => {
                    if let Some(child) = node.child() {
                        entry.child = Some(child.id().clone());
                        stack.push(child);
                    }
                }
                Category::Action | Category::Condition => {}
            }

            data.nodes.insert(meta.id().clone(), entry);
        }

        tracing::debug!(tree = %self.id, nodes = data.nodes.len(), "dumped behavior tree");
        data
    }

    /// [`dump`](Self::dump) as a JSON document.
    pub fn dump_json(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(&self.dump())?)
    }
}

impl<T: 'static> Default for BehaviorTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> fmt::Debug for BehaviorTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorTree")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("root", &self.root.as_ref().map(|root| root.meta().name().to_owned()))
            .finish()
    }
}

/// Child ids an entry links, checked against what `category` can hold.
///
/// An empty `children` list counts as no link.
fn links<'d>(id: &NodeId, category: Category, entry: &'d NodeData) -> Result<&'d [NodeId], TreeError> {
    let children = entry.children.as_deref().unwrap_or(&[]);
    let child = entry.child.as_slice();

    let unexpected = |link| TreeError::UnexpectedLink {
        node: id.clone(),
        category,
        link,
    };
    match category {
        Category::Composite if !child.is_empty() => Err(unexpected("child")),
        Category::Composite => Ok(children),
        Category::Decorator if !children.is_empty() => Err(unexpected("children")),
        Category::Decorator => Ok(child),
        Category::Action | Category::Condition if !children.is_empty() => {
            Err(unexpected("children"))
        }
        Category::Action | Category::Condition if !child.is_empty() => Err(unexpected("child")),
        Category::Action | Category::Condition => Ok(&[]),
    }
}

/// Builds the subtree rooted at `root_id` out of `nodes`.
///
/// Walks with an explicit stack: first claiming every reachable node
/// top-down, then attaching children bottom-up, so authored depth never
/// grows the call stack.
fn assemble<'d, T: 'static>(
    root_id: &'d NodeId,
    data: &'d TreeData,
    nodes: &mut HashMap<&'d str, Box<dyn Node<T>>>,
) -> Result<Box<dyn Node<T>>, TreeError> {
    let mut claimed: Vec<(&'d NodeId, &'d [NodeId], Box<dyn Node<T>>)> = Vec::new();
    let mut stack = vec![root_id];
    while let Some(id) = stack.pop() {
        let node = nodes
            .remove(id.as_str())
            .ok_or_else(|| TreeError::SharedNode(id.clone()))?;
        let child_ids = match data.nodes.get(id) {
            Some(entry) => links(id, node.category(), entry)?,
            None => &[],
        };
        for child_id in child_ids {
            if !data.nodes.contains_key(child_id) {
                return Err(TreeError::MissingNode {
                    parent: id.clone(),
                    child: child_id.clone(),
                });
            }
            stack.push(child_id);
        }
        claimed.push((id, child_ids, node));
    }

    // Every child was claimed after its parent, so walking back attaches
    // finished subtrees only.
    let mut built: HashMap<&'d str, Box<dyn Node<T>>> = HashMap::with_capacity(claimed.len());
    for (id, child_ids, mut node) in claimed.into_iter().rev() {
        let mut take = |child_id: &NodeId| {
            built
                .remove(child_id.as_str())
                .ok_or_else(|| TreeError::SharedNode(child_id.clone()))
        };
        let category = node.category();
        match category {
            Category::Composite if !child_ids.is_empty() => {
                let children = child_ids.iter().map(&mut take).collect::<Result<Vec<_>, _>>()?;
                node.set_children(children);
                if node.children().len() != child_ids.len() {
                    return Err(TreeError::UnexpectedLink {
                        node: id.clone(),
                        category,
                        link: "children",
                    });
                }
            }
            Category::Decorator => {
                if let Some(child_id) = child_ids.first() {
                    node.set_child(Some(take(child_id)?));
                    if node.child().is_none() {
                        return Err(TreeError::UnexpectedLink {
                            node: id.clone(),
                            category,
                            link: "child",
                        });
                    }
                }
            }
            _ => {}
        }
        built.insert(id.as_str(), node);
    }

    built
        .remove(root_id.as_str())
        .ok_or_else(|| TreeError::MissingRoot(root_id.clone()))
}
