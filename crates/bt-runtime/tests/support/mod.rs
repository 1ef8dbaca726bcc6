#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};

use bt_runtime::{Category, Node, NodeError, NodeMeta, Properties, Registry, State, Tick};
use serde::Deserialize;

/// Target that records what the tree did to it.
#[derive(Debug, Default)]
pub struct World {
    /// Labels of stubs in tick order.
    pub log: Vec<String>,
    pub opened: Vec<String>,
    pub closed: Vec<String>,
    /// Per-label results, consumed one per tick; the stub's own state once empty.
    pub scripts: HashMap<String, VecDeque<State>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&mut self, label: &str, states: impl IntoIterator<Item = State>) {
        self.scripts
            .entry(label.to_owned())
            .or_default()
            .extend(states);
    }

    pub fn ticks_of(&self, label: &str) -> usize {
        self.log.iter().filter(|l| *l == label).count()
    }

    pub fn take_log(&mut self) -> Vec<String> {
        std::mem::take(&mut self.log)
    }
}

#[derive(Debug, Deserialize)]
struct StubConfig {
    label: String,
    #[serde(default = "default_state")]
    state: State,
}

fn default_state() -> State {
    State::Success
}

/// Scriptable action that logs its label on every hook that matters.
pub struct Stub {
    meta: NodeMeta,
    label: String,
    state: State,
}

impl Stub {
    pub const NAME: &'static str = "Stub";

    pub fn new(label: &str, state: State) -> Self {
        let meta = NodeMeta::new(Self::NAME, Category::Action)
            .with_title(format!("Stub {label}"))
            .with_property("label", label)
            .with_property("state", serde_json::to_value(state).unwrap_or_default());
        Self {
            meta,
            label: label.to_owned(),
            state,
        }
    }

    pub fn from_properties(properties: &Properties) -> Result<Self, NodeError> {
        let config: StubConfig =
            serde_json::from_value(serde_json::Value::Object(properties.clone())).map_err(
                |source| NodeError::InvalidProperties {
                    node: Self::NAME.to_owned(),
                    source,
                },
            )?;
        Ok(Self::new(&config.label, config.state))
    }
}

impl Node<World> for Stub {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn open(&self, tick: &mut Tick<'_, World>) {
        tick.target_mut().opened.push(self.label.clone());
    }

    fn tick(&self, tick: &mut Tick<'_, World>) -> State {
        let world = tick.target_mut();
        world.log.push(self.label.clone());
        world
            .scripts
            .get_mut(&self.label)
            .and_then(VecDeque::pop_front)
            .unwrap_or(self.state)
    }

    fn close(&self, tick: &mut Tick<'_, World>) {
        tick.target_mut().closed.push(self.label.clone());
    }
}

pub fn stub(label: &str, state: State) -> Box<dyn Node<World>> {
    Stub::new(label, state).boxed()
}

/// Registry knowing about [`Stub`].
pub fn registry() -> Registry<World> {
    let mut registry = Registry::new();
    registry.register(Stub::NAME, |p| Ok(Stub::from_properties(p)?.boxed()));
    registry
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
