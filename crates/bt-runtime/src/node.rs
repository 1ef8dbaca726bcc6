//! The node contract and the lifecycle every node goes through.

use serde::{Deserialize, Serialize};

use bt_core::{NodeId, Properties, State, Value};

use crate::Tick;

/// Structural kind of a node. Fixed per node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Ordered list of children.
    Composite,
    /// Exactly one (possibly missing) child.
    Decorator,
    Action,
    Condition,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Composite => "composite",
            Category::Decorator => "decorator",
            Category::Action => "action",
            Category::Condition => "condition",
        }
    }

    pub fn is_leaf(self) -> bool {
        matches!(self, Category::Action | Category::Condition)
    }
}

/// Identity and authored data of a node instance.
#[derive(Debug, Clone)]
pub struct NodeMeta {
    id: NodeId,
    name: String,
    category: Category,
    title: String,
    description: String,
    properties: Properties,
    parameters: Properties,
}

impl NodeMeta {
    /// New metadata with a fresh id; the title defaults to the type name.
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        let name = name.into();
        Self {
            id: NodeId::generate(),
            title: name.clone(),
            name,
            category,
            description: String::new(),
            properties: Properties::new(),
            parameters: Properties::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Type tag the node is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn parameters(&self) -> &Properties {
        &self.parameters
    }

    pub fn set_id(&mut self, id: NodeId) {
        self.id = id;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    pub fn parameters_mut(&mut self) -> &mut Properties {
        &mut self.parameters
    }
}

/// A behavior tree node evaluated against targets of type `T`.
///
/// Implementors provide [`meta`](Node::meta) and usually [`tick`](Node::tick);
/// every other hook has a no-op default. Hooks take `&self`: anything a node
/// must remember between ticks goes into the blackboard through
/// [`Tick::get`] / [`Tick::set`], so the same node instance can serve many
/// targets.
///
/// Nodes are driven through [`execute`](#method.execute), which runs the
/// hooks in lifecycle order:
///
/// 1. `enter`: always.
/// 2. `open`: only when the node is not already open (it did not return
///    `Running` last time).
/// 3. `tick`: always; produces the state.
/// 4. `close`: only when the state is not `Running`.
/// 5. `exit`: always.
pub trait Node<T>: 'static {
    fn meta(&self) -> &NodeMeta;

    fn meta_mut(&mut self) -> &mut NodeMeta;

    fn id(&self) -> &NodeId {
        self.meta().id()
    }

    fn name(&self) -> &str {
        self.meta().name()
    }

    fn category(&self) -> Category {
        self.meta().category()
    }

    fn children(&self) -> &[Box<dyn Node<T>>] {
        &[]
    }

    fn child(&self) -> Option<&dyn Node<T>> {
        None
    }

    /// Replaces the children of a composite. Other categories ignore it.
    fn set_children(&mut self, _children: Vec<Box<dyn Node<T>>>) {}

    /// Replaces the child of a decorator. Other categories ignore it.
    fn set_child(&mut self, _child: Option<Box<dyn Node<T>>>) {}

    fn enter(&self, _tick: &mut Tick<'_, T>) {}

    fn open(&self, _tick: &mut Tick<'_, T>) {}

    fn tick(&self, _tick: &mut Tick<'_, T>) -> State {
        State::Success
    }

    fn close(&self, _tick: &mut Tick<'_, T>) {}

    fn exit(&self, _tick: &mut Tick<'_, T>) {}

    fn boxed(self) -> Box<dyn Node<T>>
    where
        Self: Sized,
    {
        Box::new(self)
    }
}

impl<T: 'static> dyn Node<T> {
    /// Runs one full lifecycle of this node and returns its state.
    pub fn execute(&self, tick: &mut Tick<'_, T>) -> State {
        tick.enter_node(self.meta());
        self.enter(tick);

        if !tick.is_open(self.id()) {
            tick.open_node(self.meta());
            self.open(tick);
        }

        tick.tick_node(self.meta());
        let state = self.tick(tick);

        if state != State::Running {
            self.release(tick);
        }

        tick.exit_node(self.meta(), state);
        self.exit(tick);
        state
    }

    /// Closes the node: clears its open flag and runs the `close` hook.
    ///
    /// Descendants it leaves running are closed first, deepest first, so a
    /// decorator that finishes over a `Running` child does not leave that
    /// child open.
    pub fn release(&self, tick: &mut Tick<'_, T>) {
        let abandoned = tick.truncate_open(self.id());
        for id in abandoned.iter().rev() {
            if !tick.is_open(id) {
                continue;
            }
            if let Some(node) = self.find(id) {
                tracing::debug!(node = %id, parent = %self.id(), "closing abandoned descendant");
                node.release(tick);
            }
        }

        tick.close_node(self.meta());
        self.close(tick);
    }

    /// Depth-first search of this subtree for the node with `id`.
    pub fn find(&self, id: &NodeId) -> Option<&dyn Node<T>> {
        let mut stack: Vec<&dyn Node<T>> = vec![self];
        while let Some(node) = stack.pop() {
            if node.id() == id {
                return Some(node);
            }
            stack.extend(node.children().iter().map(|c| &**c));
            stack.extend(node.child());
        }
        None
    }
}
