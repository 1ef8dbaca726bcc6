//! Action leaves with fixed results, plus [`Wait`].
//!
//! None of these depend on the target type, so one value serves trees of any
//! target.

use serde::Deserialize;

use bt_core::{Properties, State};

use crate::keys;
use crate::nodes::parse_properties;
use crate::{Category, Node, NodeError, NodeMeta, Tick};

/// Always `Success`.
#[derive(Debug, Clone)]
pub struct Succeeder {
    meta: NodeMeta,
}

impl Succeeder {
    pub const NAME: &'static str = "Succeeder";

    pub fn new() -> Self {
        Self {
            meta: NodeMeta::new(Self::NAME, Category::Action),
        }
    }
}

impl Default for Succeeder {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Node<T> for Succeeder {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn tick(&self, _tick: &mut Tick<'_, T>) -> State {
        State::Success
    }
}

/// Always `Failure`.
#[derive(Debug, Clone)]
pub struct Failer {
    meta: NodeMeta,
}

impl Failer {
    pub const NAME: &'static str = "Failer";

    pub fn new() -> Self {
        Self {
            meta: NodeMeta::new(Self::NAME, Category::Action),
        }
    }
}

impl Default for Failer {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Node<T> for Failer {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn tick(&self, _tick: &mut Tick<'_, T>) -> State {
        State::Failure
    }
}

/// Always `Error`. Registered as `"Error"`.
#[derive(Debug, Clone)]
pub struct ErrorAction {
    meta: NodeMeta,
}

impl ErrorAction {
    pub const NAME: &'static str = "Error";

    pub fn new() -> Self {
        Self {
            meta: NodeMeta::new(Self::NAME, Category::Action),
        }
    }
}

impl Default for ErrorAction {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Node<T> for ErrorAction {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn tick(&self, _tick: &mut Tick<'_, T>) -> State {
        State::Error
    }
}

/// Always `Running`: a placeholder for work completed outside the tree.
#[derive(Debug, Clone)]
pub struct Runner {
    meta: NodeMeta,
}

impl Runner {
    pub const NAME: &'static str = "Runner";

    pub fn new() -> Self {
        Self {
            meta: NodeMeta::new(Self::NAME, Category::Action),
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Node<T> for Runner {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn tick(&self, _tick: &mut Tick<'_, T>) -> State {
        State::Running
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct WaitConfig {
    #[serde(default)]
    milliseconds: u64,
}

/// `Running` until `milliseconds` have passed since the node opened, then
/// `Success`.
#[derive(Debug, Clone)]
pub struct Wait {
    meta: NodeMeta,
    milliseconds: u64,
}

impl Wait {
    pub const NAME: &'static str = "Wait";

    pub fn new(milliseconds: u64) -> Self {
        let meta = NodeMeta::new(Self::NAME, Category::Action)
            .with_title("Wait <milliseconds>ms")
            .with_property("milliseconds", milliseconds);
        Self { meta, milliseconds }
    }

    pub fn from_properties(properties: &Properties) -> Result<Self, NodeError> {
        let config: WaitConfig = parse_properties(Self::NAME, properties)?;
        Ok(Self::new(config.milliseconds))
    }

    pub fn milliseconds(&self) -> u64 {
        self.milliseconds
    }
}

impl<T: 'static> Node<T> for Wait {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn open(&self, tick: &mut Tick<'_, T>) {
        let now = tick.now_ms();
        tick.set(self.meta.id(), keys::START_TIME, now);
    }

    fn tick(&self, tick: &mut Tick<'_, T>) -> State {
        let now = tick.now_ms();
        let start = tick
            .get(self.meta.id(), keys::START_TIME)
            .and_then(|v| v.as_u64())
            .unwrap_or(now);

        if now.saturating_sub(start) >= self.milliseconds {
            State::Success
        } else {
            State::Running
        }
    }
}
