use toolbridge_foundation::strings::{preview, short_id};

/// 로그 한 줄에 표시할 최대 문자 수
pub const LOG_PREVIEW_CHARS: usize = 200;

/// 에이전트 스트림 이벤트
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// 세션 시작 (`system` / `init`)
    SystemInit {
        session_id: String,
        model: String,
        tool_count: usize,
    },

    /// 하위 도구 호출 (`assistant` / `tool_use`)
    ToolInvocation { tool_name: String },

    /// 응답 텍스트 (`assistant` / `text`) - 전체 텍스트 보존
    TextFragment { text: String },

    /// 하위 도구 결과 (`user` / `tool_result`)
    ToolResult { is_error: bool, detail: String },

    /// 최종 요약 (`result`)
    Result {
        is_error: bool,
        duration_ms: u64,
        turns: u64,
        cost: f64,
    },

    /// 알려진 이벤트지만 내부 구조가 예상과 다름
    Generic {
        kind: String,
        subtype: Option<String>,
    },

    /// 무시
    Unrecognized,
}

impl StreamEvent {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, StreamEvent::Unrecognized)
    }

    /// 최종 답변에 들어가는 텍스트
    pub fn answer_text(&self) -> Option<&str> {
        match self {
            StreamEvent::TextFragment { text } => Some(text),
            _ => None,
        }
    }

    /// 에이전트가 발급한 세션 ID
    pub fn session_id(&self) -> Option<&str> {
        match self {
            StreamEvent::SystemInit { session_id, .. } if !session_id.is_empty() => {
                Some(session_id)
            }
            _ => None,
        }
    }

    /// 누적 로그에 들어갈 한 줄
    pub fn log_line(&self) -> Option<String> {
        let line = match self {
            StreamEvent::SystemInit {
                session_id,
                model,
                tool_count,
            } => format!(
                "[init] session {} · model {} · {} tools",
                short_id(session_id),
                model,
                tool_count
            ),
            StreamEvent::ToolInvocation { tool_name } => format!("[tool] {}", tool_name),
            StreamEvent::TextFragment { text } => {
                format!("[text] {}", preview(text, LOG_PREVIEW_CHARS))
            }
            StreamEvent::ToolResult { is_error, detail } => {
                let detail = if detail.trim().is_empty() {
                    "(no output)".to_string()
                } else {
                    preview(detail, LOG_PREVIEW_CHARS)
                };
                if *is_error {
                    format!("[tool ✗] {}", detail)
                } else {
                    format!("[tool ✓] {}", detail)
                }
            }
            StreamEvent::Result {
                is_error,
                duration_ms,
                turns,
                cost,
            } => format!(
                "[done] {} · {:.1}s · {} turns · ${:.4}",
                if *is_error { "error" } else { "success" },
                *duration_ms as f64 / 1000.0,
                turns,
                cost
            ),
            StreamEvent::Generic { kind, subtype } => {
                format!("[{}] {}", kind, subtype.as_deref().unwrap_or("event"))
            }
            StreamEvent::Unrecognized => return None,
        };
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_lines() {
        let init = StreamEvent::SystemInit {
            session_id: "4f1c2a9e-77b0-4c1e".to_string(),
            model: "sonnet".to_string(),
            tool_count: 12,
        };
        assert_eq!(
            init.log_line().unwrap(),
            "[init] session 4f1c2a9e… · model sonnet · 12 tools"
        );

        let done = StreamEvent::Result {
            is_error: false,
            duration_ms: 1500,
            turns: 3,
            cost: 0.0123,
        };
        assert_eq!(
            done.log_line().unwrap(),
            "[done] success · 1.5s · 3 turns · $0.0123"
        );

        let failed = StreamEvent::ToolResult {
            is_error: true,
            detail: String::new(),
        };
        assert_eq!(failed.log_line().unwrap(), "[tool ✗] (no output)");

        assert!(StreamEvent::Unrecognized.log_line().is_none());
    }

    #[test]
    fn test_text_log_is_truncated_but_answer_is_not() {
        let text = "x".repeat(LOG_PREVIEW_CHARS * 2);
        let event = StreamEvent::TextFragment { text: text.clone() };
        let line = event.log_line().unwrap();
        assert!(line.chars().count() < text.len());
        assert_eq!(event.answer_text(), Some(text.as_str()));
    }

    #[test]
    fn test_session_id_requires_value() {
        let empty = StreamEvent::SystemInit {
            session_id: String::new(),
            model: "m".to_string(),
            tool_count: 0,
        };
        assert_eq!(empty.session_id(), None);
    }
}
