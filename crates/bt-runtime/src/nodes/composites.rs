//! Composite nodes: ordered children, evaluated left to right.
//!
//! [`Sequence`] and [`Priority`] restart from the first child on every tick.
//! Their memory variants resume at the child that was running, without
//! re-checking the children before it.

use bt_core::State;

use crate::keys;
use crate::nodes::read_count;
use crate::{Category, Node, NodeMeta, Tick};

/// Short-circuited AND over children.
///
/// Returns the first state that is not `Success`; `Success` when every child
/// succeeds (including when there are no children).
pub struct Sequence<T> {
    meta: NodeMeta,
    children: Vec<Box<dyn Node<T>>>,
}

impl<T: 'static> Sequence<T> {
    pub const NAME: &'static str = "Sequence";

    pub fn new(children: Vec<Box<dyn Node<T>>>) -> Self {
        Self {
            meta: NodeMeta::new(Self::NAME, Category::Composite),
            children,
        }
    }
}

impl<T: 'static> Node<T> for Sequence<T> {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn children(&self) -> &[Box<dyn Node<T>>] {
        &self.children
    }

    fn set_children(&mut self, children: Vec<Box<dyn Node<T>>>) {
        self.children = children;
    }

    fn tick(&self, tick: &mut Tick<'_, T>) -> State {
        for child in &self.children {
            let state = child.execute(tick);
            if state != State::Success {
                return state;
            }
        }
        State::Success
    }
}

/// Short-circuited OR over children.
///
/// Returns the first state that is not `Failure`; `Failure` when every child
/// fails (including when there are no children).
pub struct Priority<T> {
    meta: NodeMeta,
    children: Vec<Box<dyn Node<T>>>,
}

impl<T: 'static> Priority<T> {
    pub const NAME: &'static str = "Priority";

    pub fn new(children: Vec<Box<dyn Node<T>>>) -> Self {
        Self {
            meta: NodeMeta::new(Self::NAME, Category::Composite),
            children,
        }
    }
}

impl<T: 'static> Node<T> for Priority<T> {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn children(&self) -> &[Box<dyn Node<T>>] {
        &self.children
    }

    fn set_children(&mut self, children: Vec<Box<dyn Node<T>>>) {
        self.children = children;
    }

    fn tick(&self, tick: &mut Tick<'_, T>) -> State {
        for child in &self.children {
            let state = child.execute(tick);
            if state != State::Failure {
                return state;
            }
        }
        State::Failure
    }
}

/// [`Sequence`] that resumes at the child which returned `Running`.
pub struct MemSequence<T> {
    meta: NodeMeta,
    children: Vec<Box<dyn Node<T>>>,
}

impl<T: 'static> MemSequence<T> {
    pub const NAME: &'static str = "MemSequence";

    pub fn new(children: Vec<Box<dyn Node<T>>>) -> Self {
        Self {
            meta: NodeMeta::new(Self::NAME, Category::Composite),
            children,
        }
    }
}

impl<T: 'static> Node<T> for MemSequence<T> {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn children(&self) -> &[Box<dyn Node<T>>] {
        &self.children
    }

    fn set_children(&mut self, children: Vec<Box<dyn Node<T>>>) {
        self.children = children;
    }

    fn open(&self, tick: &mut Tick<'_, T>) {
        tick.set(self.meta.id(), keys::RUNNING_CHILD, 0);
    }

    fn tick(&self, tick: &mut Tick<'_, T>) -> State {
        let start = read_count(tick, self.meta.id(), keys::RUNNING_CHILD) as usize;
        for (i, child) in self.children.iter().enumerate().skip(start) {
            let state = child.execute(tick);
            if state != State::Success {
                if state == State::Running {
                    tick.set(self.meta.id(), keys::RUNNING_CHILD, i);
                }
                return state;
            }
        }
        State::Success
    }
}

/// [`Priority`] that resumes at the child which returned `Running`.
pub struct MemPriority<T> {
    meta: NodeMeta,
    children: Vec<Box<dyn Node<T>>>,
}

impl<T: 'static> MemPriority<T> {
    pub const NAME: &'static str = "MemPriority";

    pub fn new(children: Vec<Box<dyn Node<T>>>) -> Self {
        Self {
            meta: NodeMeta::new(Self::NAME, Category::Composite),
            children,
        }
    }
}

impl<T: 'static> Node<T> for MemPriority<T> {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn children(&self) -> &[Box<dyn Node<T>>] {
        &self.children
    }

    fn set_children(&mut self, children: Vec<Box<dyn Node<T>>>) {
        self.children = children;
    }

    fn open(&self, tick: &mut Tick<'_, T>) {
        tick.set(self.meta.id(), keys::RUNNING_CHILD, 0);
    }

    fn tick(&self, tick: &mut Tick<'_, T>) -> State {
        let start = read_count(tick, self.meta.id(), keys::RUNNING_CHILD) as usize;
        for (i, child) in self.children.iter().enumerate().skip(start) {
            let state = child.execute(tick);
            if state != State::Failure {
                if state == State::Running {
                    tick.set(self.meta.id(), keys::RUNNING_CHILD, i);
                }
                return state;
            }
        }
        State::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Failer, Runner, Succeeder};
    use crate::{BehaviorTree, Blackboard};

    struct Agent;

    #[test]
    fn empty_sequence_succeeds_and_empty_priority_fails() {
        let mut bb = Blackboard::new();

        let seq = BehaviorTree::with_root(Sequence::<Agent>::new(Vec::new()).boxed());
        assert_eq!(seq.tick(&mut Agent, &mut bb).unwrap(), State::Success);

        let pri = BehaviorTree::with_root(Priority::<Agent>::new(Vec::new()).boxed());
        assert_eq!(pri.tick(&mut Agent, &mut bb).unwrap(), State::Failure);
    }

    #[test]
    fn mem_priority_resumes_at_running_child() {
        let tree = BehaviorTree::with_root(
            MemPriority::<Agent>::new(vec![Failer::new().boxed(), Runner::new().boxed()]).boxed(),
        );
        let mut bb = Blackboard::new();

        assert_eq!(tree.tick(&mut Agent, &mut bb).unwrap(), State::Running);
        let root = tree.root().unwrap();
        let resume = bb
            .get(keys::RUNNING_CHILD, Some(tree.id().as_str()), Some(root.id().as_str()))
            .cloned();
        assert_eq!(resume, Some(serde_json::json!(1)));
    }

    #[test]
    fn sequence_propagates_running() {
        let tree = BehaviorTree::with_root(
            Sequence::<Agent>::new(vec![
                Succeeder::new().boxed(),
                Runner::new().boxed(),
                Failer::new().boxed(),
            ])
            .boxed(),
        );
        let mut bb = Blackboard::new();
        assert_eq!(tree.tick(&mut Agent, &mut bb).unwrap(), State::Running);
    }
}
