//! Error types for ToolBridge
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// ToolBridge 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 저장소 관련
    // ========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    // ========================================================================
    // Tool 관련
    // ========================================================================
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Missing template parameter: {0}")]
    TemplateParameterMissing(String),

    #[error("Command construction failed: {0}")]
    CommandConstruction(String),

    // ========================================================================
    // 프로세스 실행 관련
    // ========================================================================
    #[error("Failed to spawn agent process: {0}")]
    ProcessSpawn(String),

    #[error("Agent process exited with code {code}: {stderr}")]
    ProcessExit { code: i32, stderr: String },

    #[error("Agent process timed out after {0} seconds")]
    ProcessTimeout(u64),

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 같은 호출을 다시 시도해 볼 만한 에러인지 (실패 페이로드의 `retryable`)
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::ProcessTimeout(_) | Error::ProcessExit { .. })
    }

    /// 호출자에게 전달되는 에러 코드
    pub fn error_code(&self) -> String {
        match self {
            Error::Config(_) => "CONFIG_ERROR".to_string(),
            Error::Storage(_) => "STORAGE_ERROR".to_string(),
            Error::ToolNotFound(_) => "TOOL_NOT_FOUND".to_string(),
            Error::TemplateParameterMissing(_) => "TEMPLATE_PARAMETER_MISSING".to_string(),
            Error::CommandConstruction(_) => "COMMAND_CONSTRUCTION_FAILED".to_string(),
            Error::ProcessSpawn(_) => "SPAWN_FAILED".to_string(),
            Error::ProcessExit { code, .. } => format!("EXIT_{}", code),
            Error::ProcessTimeout(_) => "TIMEOUT".to_string(),
            Error::InvalidInput(_) => "INVALID_INPUT".to_string(),
            Error::Io(_) => "IO_ERROR".to_string(),
            Error::Json(_) => "JSON_ERROR".to_string(),
        }
    }

    /// 호출한 에이전트를 위한 다음 행동 제안
    pub fn suggestion(&self) -> &'static str {
        match self {
            Error::ProcessTimeout(_) => {
                "The agent ran past the time limit. Split the task into smaller steps and retry."
            }
            Error::ProcessExit { .. } => {
                "The agent exited with an error. Check the stderr output; retrying starts a fresh session."
            }
            Error::ProcessSpawn(_) => {
                "The agent binary could not be started. Verify it is installed and on PATH."
            }
            Error::CommandConstruction(_) => {
                "The command line could not be built. Simplify the tool arguments and retry."
            }
            Error::ToolNotFound(_) => "List the available tools and call one of them by name.",
            Error::Config(_) | Error::InvalidInput(_) => {
                "Check the tool definition and the arguments passed to it."
            }
            _ => "Retry the call; a fresh agent session will be used.",
        }
    }

    /// 프로세스 종료 에러 생성 헬퍼
    pub fn process_exit(code: i32, stderr: impl Into<String>) -> Self {
        Error::ProcessExit {
            code,
            stderr: stderr.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::process_exit(2, "boom").error_code(), "EXIT_2");
        assert_eq!(Error::ProcessTimeout(900).error_code(), "TIMEOUT");
        assert_eq!(Error::ProcessSpawn("nope".into()).error_code(), "SPAWN_FAILED");
    }

    #[test]
    fn test_exit_message_includes_stderr() {
        let err = Error::process_exit(1, "permission denied");
        let msg = err.to_string();
        assert!(msg.contains("code 1"));
        assert!(msg.contains("permission denied"));
        assert!(err.is_retryable());
    }
}
