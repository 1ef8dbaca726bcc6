#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use bt_core::{NodeId, State, TreeId};

/// Lifecycle step a node went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Phase {
    Enter,
    Open,
    Tick,
    Close,
    Exit,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Enter => "enter",
            Phase::Open => "open",
            Phase::Tick => "tick",
            Phase::Close => "close",
            Phase::Exit => "exit",
        }
    }
}

/// One lifecycle step of one node during one traversal.
///
/// This is intentionally "dumb data" so it can be recorded while a tree runs
/// and rendered later by tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tree: TreeId,
    pub node: NodeId,
    pub name: String,
    pub phase: Phase,
    /// Set on `Exit`: the state the node returned.
    pub state: Option<State>,
}

impl TraceEvent {
    pub fn new(tree: TreeId, node: NodeId, name: impl Into<String>, phase: Phase) -> Self {
        Self {
            tree,
            node,
            name: name.into(),
            phase,
            state: None,
        }
    }

    pub fn with_state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl VecTraceSink {
    /// Events for one phase, in emission order.
    pub fn phase(&self, phase: Phase) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(move |e| e.phase == phase)
    }

    /// Node names for one phase, in emission order.
    pub fn names(&self, phase: Phase) -> Vec<&str> {
        self.phase(phase).map(|e| e.name.as_str()).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

/// Forwards events to `tracing` at `DEBUG` level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn emit(&mut self, event: TraceEvent) {
        tracing::debug!(
            tree = %event.tree,
            node = %event.node,
            name = %event.name,
            phase = event.phase.as_str(),
            state = ?event.state,
            "bt.trace"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str, phase: Phase) -> TraceEvent {
        TraceEvent::new(TreeId::from("t"), NodeId::from(name), name, phase)
    }

    #[test]
    fn vec_sink_filters_by_phase() {
        let mut sink = VecTraceSink::default();
        sink.emit(event("a", Phase::Enter));
        sink.emit(event("a", Phase::Open));
        sink.emit(event("b", Phase::Enter));
        sink.emit(event("a", Phase::Exit).with_state(State::Running));

        assert_eq!(sink.names(Phase::Enter), vec!["a", "b"]);
        assert_eq!(sink.names(Phase::Open), vec!["a"]);
        let exit = sink.phase(Phase::Exit).next().unwrap();
        assert_eq!(exit.state, Some(State::Running));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn events_serialize_with_lowercase_phase() {
        let json = serde_json::to_value(event("a", Phase::Close)).unwrap();
        assert_eq!(json["phase"], "close");
        assert_eq!(json["node"], "a");
    }
}
