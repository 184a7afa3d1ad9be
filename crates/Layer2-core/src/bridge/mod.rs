//! Bridge - 도구 호출 오케스트레이션
//!
//! 세션 해석 → 명령 생성 → 실행 → 세션 갱신 순서로 한 번의 도구 호출을
//! 처리한다. 실패는 에러가 아니라 호출자에게 돌려줄 데이터(`ToolOutcome`)다.

mod orchestrator;
mod outcome;
mod state;

pub use orchestrator::{PlannedCall, ToolBridge, NEW_SESSION_ARG};
pub use outcome::{FailureDetails, FailurePayload, ToolOutcome};
pub use state::InvocationState;
