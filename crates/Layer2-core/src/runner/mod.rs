//! Runner - 외부 에이전트 프로세스 실행
//!
//! - `AgentRunner`: 오케스트레이터가 의존하는 실행 추상화
//! - `StreamingRunner`: stdout을 줄 단위로 해석하는 실제 구현
//! - `RunOutput`: 누적 로그 + 최종 답변

mod output;
mod process;

pub use output::{RunOutput, StreamCollector, LOG_HEADER, NO_TEXT_OUTPUT};
pub use process::StreamingRunner;

use crate::command::PromptCommand;
use async_trait::async_trait;
use std::path::Path;
use toolbridge_foundation::Result;

/// 에이전트 실행기
#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// 명령을 `working_dir`에서 실행하고 스트림을 해석한 결과를 돌려준다
    async fn run(
        &self,
        command: &PromptCommand,
        working_dir: &Path,
        tool_name: &str,
    ) -> Result<RunOutput>;
}
