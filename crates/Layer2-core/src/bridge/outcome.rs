use serde::{Deserialize, Serialize};
use toolbridge_foundation::Error;

/// 실패 상세
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDetails {
    pub tool: String,
    pub error_code: String,
    pub suggestion: String,
    /// 같은 인자로 다시 호출해 볼 만한지 (재시도 판단은 호출자 몫)
    pub retryable: bool,
}

/// 호출자에게 돌려주는 실패 결과
///
/// ```json
/// {"success":false,"error":"...","details":{"tool":"...","errorCode":"...","suggestion":"...","retryable":true}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailurePayload {
    pub success: bool,
    pub error: String,
    pub details: FailureDetails,
}

impl FailurePayload {
    pub fn from_error(tool_name: &str, error: &Error) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            details: FailureDetails {
                tool: tool_name.to_string(),
                error_code: error.error_code(),
                suggestion: error.suggestion().to_string(),
                retryable: error.is_retryable(),
            },
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.error.clone())
    }
}

/// 도구 호출 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// 렌더링된 실행 로그 + 답변
    Success(String),
    Failure(FailurePayload),
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }

    /// 호출자에게 보낼 텍스트 (실패는 JSON)
    pub fn text(&self) -> String {
        match self {
            ToolOutcome::Success(text) => text.clone(),
            ToolOutcome::Failure(payload) => payload.to_json(),
        }
    }
}
