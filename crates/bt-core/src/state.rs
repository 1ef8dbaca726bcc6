use serde::{Deserialize, Serialize};

/// Result of ticking a node.
///
/// The discriminants are part of the external contract and match the numeric
/// codes used by tree data produced by other tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum State {
    Success = 1,
    Failure = 2,
    Running = 3,
    Error = 4,
}

impl State {
    pub fn is_success(self) -> bool {
        matches!(self, State::Success)
    }

    pub fn is_failure(self) -> bool {
        matches!(self, State::Failure)
    }

    pub fn is_running(self) -> bool {
        matches!(self, State::Running)
    }

    pub fn is_error(self) -> bool {
        matches!(self, State::Error)
    }

    /// `Success` or `Failure`: the node finished and produced a domain answer.
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Success | State::Failure)
    }

    /// Swaps `Success` and `Failure`; `Running` and `Error` pass through.
    pub fn invert(self) -> Self {
        match self {
            State::Success => State::Failure,
            State::Failure => State::Success,
            other => other,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}
