//! Decorator nodes: wrap a single child and reshape its result or how often
//! it runs.
//!
//! A decorator loaded from data may have no child; ticking it returns
//! `Error` so the malformed tree is visible instead of silently passing.

use serde::Deserialize;

use bt_core::{Properties, State};

use crate::keys;
use crate::nodes::{missing_child, parse_properties, read_count};
use crate::{Category, Node, NodeError, NodeMeta, Tick};

/// Loop bound as authored: any negative number means unlimited.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoopConfig {
    #[serde(default = "default_max_loop")]
    max_loop: i64,
}

fn default_max_loop() -> i64 {
    -1
}

fn loop_bound(max_loop: i64) -> Option<u64> {
    u64::try_from(max_loop).ok()
}

fn within(bound: Option<u64>, i: u64) -> bool {
    bound.map_or(true, |max| i < max)
}

fn bound_property(bound: Option<u64>) -> i64 {
    bound.map_or(-1, |max| max as i64)
}

/// Swaps `Success` and `Failure`; `Running` and `Error` pass through.
pub struct Inverter<T> {
    meta: NodeMeta,
    child: Option<Box<dyn Node<T>>>,
}

impl<T: 'static> Inverter<T> {
    pub const NAME: &'static str = "Inverter";

    pub fn new(child: Box<dyn Node<T>>) -> Self {
        Self::build(Some(child))
    }

    /// Inverter with no child yet, as created when loading tree data.
    pub fn from_properties(_properties: &Properties) -> Result<Self, NodeError> {
        Ok(Self::build(None))
    }

    fn build(child: Option<Box<dyn Node<T>>>) -> Self {
        Self {
            meta: NodeMeta::new(Self::NAME, Category::Decorator),
            child,
        }
    }
}

impl<T: 'static> Node<T> for Inverter<T> {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn child(&self) -> Option<&dyn Node<T>> {
        self.child.as_deref()
    }

    fn set_child(&mut self, child: Option<Box<dyn Node<T>>>) {
        self.child = child;
    }

    fn tick(&self, tick: &mut Tick<'_, T>) -> State {
        let Some(child) = self.child.as_deref() else {
            return missing_child(&self.meta);
        };
        child.execute(tick).invert()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LimiterConfig {
    #[serde(default)]
    max_loop: u64,
}

/// Lets the child finish at most `maxLoop` times; afterwards returns
/// `Failure` without ticking it.
///
/// Only `Success` and `Failure` count as a finished activation. The count
/// lives in node memory and is never reset by the limiter itself.
pub struct Limiter<T> {
    meta: NodeMeta,
    child: Option<Box<dyn Node<T>>>,
    max_loop: u64,
}

impl<T: 'static> Limiter<T> {
    pub const NAME: &'static str = "Limiter";

    /// Fails when `max_loop` is zero.
    pub fn new(child: Box<dyn Node<T>>, max_loop: u64) -> Result<Self, NodeError> {
        Self::build(Some(child), max_loop)
    }

    pub fn from_properties(properties: &Properties) -> Result<Self, NodeError> {
        let config: LimiterConfig = parse_properties(Self::NAME, properties)?;
        Self::build(None, config.max_loop)
    }

    fn build(child: Option<Box<dyn Node<T>>>, max_loop: u64) -> Result<Self, NodeError> {
        if max_loop == 0 {
            return Err(NodeError::MissingParameter {
                node: Self::NAME,
                parameter: "maxLoop",
            });
        }
        let meta = NodeMeta::new(Self::NAME, Category::Decorator)
            .with_title("Limit <maxLoop> Activations")
            .with_property("maxLoop", max_loop);
        Ok(Self {
            meta,
            child,
            max_loop,
        })
    }

    pub fn max_loop(&self) -> u64 {
        self.max_loop
    }
}

impl<T: 'static> Node<T> for Limiter<T> {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn child(&self) -> Option<&dyn Node<T>> {
        self.child.as_deref()
    }

    fn set_child(&mut self, child: Option<Box<dyn Node<T>>>) {
        self.child = child;
    }

    fn tick(&self, tick: &mut Tick<'_, T>) -> State {
        let Some(child) = self.child.as_deref() else {
            return missing_child(&self.meta);
        };

        let i = read_count(tick, self.meta.id(), keys::COUNT);
        if i >= self.max_loop {
            return State::Failure;
        }

        let state = child.execute(tick);
        if state.is_terminal() {
            tick.set(self.meta.id(), keys::COUNT, i + 1);
        }
        state
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaxTimeConfig {
    #[serde(default)]
    max_time: u64,
}

/// Turns the child's result into `Failure` once more than `maxTime`
/// milliseconds have passed since this node opened.
///
/// Not preemptive: the child is still ticked every time and pays its full
/// cost; only the result is overridden.
pub struct MaxTime<T> {
    meta: NodeMeta,
    child: Option<Box<dyn Node<T>>>,
    max_time: u64,
}

impl<T: 'static> MaxTime<T> {
    pub const NAME: &'static str = "MaxTime";

    /// Fails when `max_time_ms` is zero.
    pub fn new(child: Box<dyn Node<T>>, max_time_ms: u64) -> Result<Self, NodeError> {
        Self::build(Some(child), max_time_ms)
    }

    pub fn from_properties(properties: &Properties) -> Result<Self, NodeError> {
        let config: MaxTimeConfig = parse_properties(Self::NAME, properties)?;
        Self::build(None, config.max_time)
    }

    fn build(child: Option<Box<dyn Node<T>>>, max_time: u64) -> Result<Self, NodeError> {
        if max_time == 0 {
            return Err(NodeError::MissingParameter {
                node: Self::NAME,
                parameter: "maxTime",
            });
        }
        let meta = NodeMeta::new(Self::NAME, Category::Decorator)
            .with_title("Max <maxTime>ms")
            .with_property("maxTime", max_time);
        Ok(Self {
            meta,
            child,
            max_time,
        })
    }

    pub fn max_time_ms(&self) -> u64 {
        self.max_time
    }
}

impl<T: 'static> Node<T> for MaxTime<T> {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn child(&self) -> Option<&dyn Node<T>> {
        self.child.as_deref()
    }

    fn set_child(&mut self, child: Option<Box<dyn Node<T>>>) {
        self.child = child;
    }

    fn open(&self, tick: &mut Tick<'_, T>) {
        let now = tick.now_ms();
        tick.set(self.meta.id(), keys::START_TIME, now);
    }

    fn tick(&self, tick: &mut Tick<'_, T>) -> State {
        let Some(child) = self.child.as_deref() else {
            return missing_child(&self.meta);
        };

        let now = tick.now_ms();
        let start = tick
            .get(self.meta.id(), keys::START_TIME)
            .and_then(|v| v.as_u64())
            .unwrap_or(now);

        let state = child.execute(tick);
        if now.saturating_sub(start) > self.max_time {
            return State::Failure;
        }
        state
    }
}

/// Ticks the child again within the same tick for as long as it finishes
/// (`Success` or `Failure`), up to `maxLoop` finished runs in total.
///
/// Stops early on `Running` or `Error`. The run count is reset when the node
/// opens. With no bound and a child that always finishes, this never returns.
pub struct Repeater<T> {
    meta: NodeMeta,
    child: Option<Box<dyn Node<T>>>,
    max_loop: Option<u64>,
}

impl<T: 'static> Repeater<T> {
    pub const NAME: &'static str = "Repeater";

    /// Unbounded repeater.
    pub fn new(child: Box<dyn Node<T>>) -> Self {
        Self::build(Some(child), None)
    }

    pub fn from_properties(properties: &Properties) -> Result<Self, NodeError> {
        let config: LoopConfig = parse_properties(Self::NAME, properties)?;
        Ok(Self::build(None, loop_bound(config.max_loop)))
    }

    pub fn with_max_loop(mut self, max_loop: u64) -> Self {
        self.max_loop = Some(max_loop);
        self.meta.set_property("maxLoop", max_loop);
        self
    }

    fn build(child: Option<Box<dyn Node<T>>>, max_loop: Option<u64>) -> Self {
        let meta = NodeMeta::new(Self::NAME, Category::Decorator)
            .with_title("Repeat <maxLoop>x")
            .with_property("maxLoop", bound_property(max_loop));
        Self {
            meta,
            child,
            max_loop,
        }
    }

    pub fn max_loop(&self) -> Option<u64> {
        self.max_loop
    }
}

impl<T: 'static> Node<T> for Repeater<T> {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn child(&self) -> Option<&dyn Node<T>> {
        self.child.as_deref()
    }

    fn set_child(&mut self, child: Option<Box<dyn Node<T>>>) {
        self.child = child;
    }

    fn open(&self, tick: &mut Tick<'_, T>) {
        tick.set(self.meta.id(), keys::COUNT, 0);
    }

    fn tick(&self, tick: &mut Tick<'_, T>) -> State {
        let Some(child) = self.child.as_deref() else {
            return missing_child(&self.meta);
        };

        let mut i = read_count(tick, self.meta.id(), keys::COUNT);
        let mut state = State::Success;
        while within(self.max_loop, i) {
            state = child.execute(tick);
            if state.is_terminal() {
                i += 1;
            } else {
                break;
            }
        }

        tick.set(self.meta.id(), keys::COUNT, i);
        state
    }
}

/// Re-ticks the child while it fails, until it succeeds, runs, errors or
/// `maxLoop` failures have been consumed.
///
/// Returns the child's last state, or `Error` if the bound left no run.
pub struct RepeatUntilSuccess<T> {
    meta: NodeMeta,
    child: Option<Box<dyn Node<T>>>,
    max_loop: Option<u64>,
}

impl<T: 'static> RepeatUntilSuccess<T> {
    pub const NAME: &'static str = "RepeatUntilSuccess";

    pub fn new(child: Box<dyn Node<T>>) -> Self {
        Self::build(Some(child), None)
    }

    pub fn from_properties(properties: &Properties) -> Result<Self, NodeError> {
        let config: LoopConfig = parse_properties(Self::NAME, properties)?;
        Ok(Self::build(None, loop_bound(config.max_loop)))
    }

    pub fn with_max_loop(mut self, max_loop: u64) -> Self {
        self.max_loop = Some(max_loop);
        self.meta.set_property("maxLoop", max_loop);
        self
    }

    fn build(child: Option<Box<dyn Node<T>>>, max_loop: Option<u64>) -> Self {
        let meta = NodeMeta::new(Self::NAME, Category::Decorator)
            .with_title("Repeat Until Success")
            .with_property("maxLoop", bound_property(max_loop));
        Self {
            meta,
            child,
            max_loop,
        }
    }

    pub fn max_loop(&self) -> Option<u64> {
        self.max_loop
    }
}

impl<T: 'static> Node<T> for RepeatUntilSuccess<T> {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn child(&self) -> Option<&dyn Node<T>> {
        self.child.as_deref()
    }

    fn set_child(&mut self, child: Option<Box<dyn Node<T>>>) {
        self.child = child;
    }

    fn open(&self, tick: &mut Tick<'_, T>) {
        tick.set(self.meta.id(), keys::COUNT, 0);
    }

    fn tick(&self, tick: &mut Tick<'_, T>) -> State {
        let Some(child) = self.child.as_deref() else {
            return missing_child(&self.meta);
        };

        let mut i = read_count(tick, self.meta.id(), keys::COUNT);
        let mut state = State::Error;
        while within(self.max_loop, i) {
            state = child.execute(tick);
            if state == State::Failure {
                i += 1;
            } else {
                break;
            }
        }

        tick.set(self.meta.id(), keys::COUNT, i);
        state
    }
}

/// Re-ticks the child while it succeeds, until it fails, runs, errors or
/// `maxLoop` successes have been consumed.
///
/// Returns the child's last state, or `Error` if the bound left no run.
pub struct RepeatUntilFailure<T> {
    meta: NodeMeta,
    child: Option<Box<dyn Node<T>>>,
    max_loop: Option<u64>,
}

impl<T: 'static> RepeatUntilFailure<T> {
    pub const NAME: &'static str = "RepeatUntilFailure";

    pub fn new(child: Box<dyn Node<T>>) -> Self {
        Self::build(Some(child), None)
    }

    pub fn from_properties(properties: &Properties) -> Result<Self, NodeError> {
        let config: LoopConfig = parse_properties(Self::NAME, properties)?;
        Ok(Self::build(None, loop_bound(config.max_loop)))
    }

    pub fn with_max_loop(mut self, max_loop: u64) -> Self {
        self.max_loop = Some(max_loop);
        self.meta.set_property("maxLoop", max_loop);
        self
    }

    fn build(child: Option<Box<dyn Node<T>>>, max_loop: Option<u64>) -> Self {
        let meta = NodeMeta::new(Self::NAME, Category::Decorator)
            .with_title("Repeat Until Failure")
            .with_property("maxLoop", bound_property(max_loop));
        Self {
            meta,
            child,
            max_loop,
        }
    }

    pub fn max_loop(&self) -> Option<u64> {
        self.max_loop
    }
}

impl<T: 'static> Node<T> for RepeatUntilFailure<T> {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }

    fn child(&self) -> Option<&dyn Node<T>> {
        self.child.as_deref()
    }

    fn set_child(&mut self, child: Option<Box<dyn Node<T>>>) {
        self.child = child;
    }

    fn open(&self, tick: &mut Tick<'_, T>) {
        tick.set(self.meta.id(), keys::COUNT, 0);
    }

    fn tick(&self, tick: &mut Tick<'_, T>) -> State {
        let Some(child) = self.child.as_deref() else {
            return missing_child(&self.meta);
        };

        let mut i = read_count(tick, self.meta.id(), keys::COUNT);
        let mut state = State::Error;
        while within(self.max_loop, i) {
            state = child.execute(tick);
            if state == State::Success {
                i += 1;
            } else {
                break;
            }
        }

        tick.set(self.meta.id(), keys::COUNT, i);
        state
    }
}
