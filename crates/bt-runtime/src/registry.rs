use std::collections::HashMap;
use std::fmt;

use bt_core::Properties;

use crate::nodes::{
    ErrorAction, Failer, Inverter, Limiter, MaxTime, MemPriority, MemSequence, Priority,
    RepeatUntilFailure, RepeatUntilSuccess, Repeater, Runner, Sequence, Succeeder, Wait,
};
use crate::{Node, NodeError};

/// Builds a node (without children) from its authored properties.
pub type Factory<T> = Box<dyn Fn(&Properties) -> Result<Box<dyn Node<T>>, NodeError>>;

/// Type tags of the nodes available in [`Registry::builtin`].
pub const BUILTIN_NAMES: [&str; 15] = [
    "Sequence",
    "Priority",
    "MemSequence",
    "MemPriority",
    "Inverter",
    "Limiter",
    "MaxTime",
    "Repeater",
    "RepeatUntilSuccess",
    "RepeatUntilFailure",
    "Succeeder",
    "Failer",
    "Error",
    "Runner",
    "Wait",
];

/// Maps node type tags to factories, used when loading tree data.
///
/// Callers register their own node types in a registry of their own and pass
/// it to [`BehaviorTree::load`](crate::BehaviorTree::load); it is consulted
/// before the built-ins, so it may also shadow them.
pub struct Registry<T> {
    factories: HashMap<String, Factory<T>>,
}

impl<T: 'static> Registry<T> {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry holding every built-in node type.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register(Sequence::<T>::NAME, |_| Ok(Sequence::<T>::new(Vec::new()).boxed()))
            .register(Priority::<T>::NAME, |_| Ok(Priority::<T>::new(Vec::new()).boxed()))
            .register(MemSequence::<T>::NAME, |_| {
                Ok(MemSequence::<T>::new(Vec::new()).boxed())
            })
            .register(MemPriority::<T>::NAME, |_| {
                Ok(MemPriority::<T>::new(Vec::new()).boxed())
            })
            .register(Inverter::<T>::NAME, |p| Ok(Inverter::<T>::from_properties(p)?.boxed()))
            .register(Limiter::<T>::NAME, |p| Ok(Limiter::<T>::from_properties(p)?.boxed()))
            .register(MaxTime::<T>::NAME, |p| Ok(MaxTime::<T>::from_properties(p)?.boxed()))
            .register(Repeater::<T>::NAME, |p| Ok(Repeater::<T>::from_properties(p)?.boxed()))
            .register(RepeatUntilSuccess::<T>::NAME, |p| {
                Ok(RepeatUntilSuccess::<T>::from_properties(p)?.boxed())
            })
            .register(RepeatUntilFailure::<T>::NAME, |p| {
                Ok(RepeatUntilFailure::<T>::from_properties(p)?.boxed())
            })
            .register(Succeeder::NAME, |_| Ok(Node::<T>::boxed(Succeeder::new())))
            .register(Failer::NAME, |_| Ok(Node::<T>::boxed(Failer::new())))
            .register(ErrorAction::NAME, |_| Ok(Node::<T>::boxed(ErrorAction::new())))
            .register(Runner::NAME, |_| Ok(Node::<T>::boxed(Runner::new())))
            .register(Wait::NAME, |p| Ok(Node::<T>::boxed(Wait::from_properties(p)?)));
        registry
    }

    /// Whether `name` is one of the built-in node types.
    pub fn is_builtin(name: &str) -> bool {
        BUILTIN_NAMES.contains(&name)
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&Properties) -> Result<Box<dyn Node<T>>, NodeError> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Factory<T>> {
        self.factories.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Instantiates `name`, or `None` when it is not registered here.
    pub fn create(
        &self,
        name: &str,
        properties: &Properties,
    ) -> Option<Result<Box<dyn Node<T>>, NodeError>> {
        self.get(name).map(|factory| factory(properties))
    }
}

impl<T: 'static> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("names", &names).finish()
    }
}
