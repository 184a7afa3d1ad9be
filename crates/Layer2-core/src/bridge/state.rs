use std::fmt;
use tracing::debug;

/// 한 번의 도구 호출 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Idle,
    ResolvingSession,
    BuildingCommand,
    Running,
    Succeeded,
    Failed,
}

impl InvocationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvocationState::Succeeded | InvocationState::Failed)
    }
}

impl fmt::Display for InvocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InvocationState::Idle => "idle",
            InvocationState::ResolvingSession => "resolving_session",
            InvocationState::BuildingCommand => "building_command",
            InvocationState::Running => "running",
            InvocationState::Succeeded => "succeeded",
            InvocationState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// 상태 전이 기록기
#[derive(Debug)]
pub(crate) struct StateTracker<'a> {
    tool_name: &'a str,
    state: InvocationState,
}

impl<'a> StateTracker<'a> {
    pub(crate) fn new(tool_name: &'a str) -> Self {
        Self {
            tool_name,
            state: InvocationState::Idle,
        }
    }

    pub(crate) fn advance(&mut self, next: InvocationState) {
        debug!(tool = %self.tool_name, "{} -> {}", self.state, next);
        self.state = next;
    }

    pub(crate) fn state(&self) -> InvocationState {
        self.state
    }
}
