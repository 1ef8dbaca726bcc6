use bt_core::{Blackboard, State};

use crate::{Category, Node, NodeMeta, Tick};

/// Leaf that succeeds when `predicate(target, blackboard)` holds.
pub struct Condition<F> {
    meta: NodeMeta,
    predicate: F,
}

impl<F> Condition<F> {
    pub const NAME: &'static str = "Condition";

    pub fn new(predicate: F) -> Self {
        Self::named(Self::NAME, predicate)
    }

    /// Condition registered under its own type tag, so dumps can tell
    /// conditions apart.
    pub fn named(name: impl Into<String>, predicate: F) -> Self {
        Self {
            meta: NodeMeta::new(name, Category::Condition),
            predicate,
        }
    }
}

impl<T, F> Node<T> for Condition<F>
where
    T: 'static,
    F: Fn(&T, &Blackboard) -> bool + 'static,
{
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn tick(&self, tick: &mut Tick<'_, T>) -> State {
        if (self.predicate)(tick.target(), tick.blackboard()) {
            State::Success
        } else {
            State::Failure
        }
    }
}

/// Action leaf backed by a closure over the target and blackboard.
pub struct RunAction<F> {
    meta: NodeMeta,
    action: F,
}

impl<F> RunAction<F> {
    pub const NAME: &'static str = "RunAction";

    pub fn new(action: F) -> Self {
        Self::named(Self::NAME, action)
    }

    pub fn named(name: impl Into<String>, action: F) -> Self {
        Self {
            meta: NodeMeta::new(name, Category::Action),
            action,
        }
    }
}

impl<T, F> Node<T> for RunAction<F>
where
    T: 'static,
    F: Fn(&mut T, &mut Blackboard) -> State + 'static,
{
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn tick(&self, tick: &mut Tick<'_, T>) -> State {
        let (target, blackboard) = tick.parts_mut();
        (self.action)(target, blackboard)
    }
}
