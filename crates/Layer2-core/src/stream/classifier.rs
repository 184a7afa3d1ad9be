//! stream-json 한 줄 → 이벤트
//!
//! 모든 함수는 전체 함수(total)다. 어떤 입력에도 패닉하거나 에러를 돌려주지
//! 않고 `Unrecognized`로 떨어진다.

use super::event::StreamEvent;
use serde_json::Value;
use tracing::trace;

/// 한 줄에 담긴 의미 있는 이벤트 전부
///
/// `assistant` 메시지 하나에 여러 content 블록이 있을 수 있으므로 여러 개를
/// 돌려줄 수 있다. 무시할 줄이면 빈 목록.
pub fn decode(line: &str) -> Vec<StreamEvent> {
    decode_line(line)
        .into_iter()
        .filter(StreamEvent::is_recognized)
        .collect()
}

/// 해석할 수 없는 줄은 `[Unrecognized]`
fn decode_line(line: &str) -> Vec<StreamEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return vec![StreamEvent::Unrecognized];
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(_) => return vec![StreamEvent::Unrecognized],
    };

    let Some(kind) = value.get("type").and_then(Value::as_str) else {
        return vec![StreamEvent::Unrecognized];
    };

    match kind {
        "system" => vec![decode_system(&value)],
        "assistant" => decode_assistant(&value),
        "user" => decode_user(&value),
        "result" => vec![decode_result(&value)],
        _ => vec![StreamEvent::Unrecognized],
    }
}

/// 한 줄의 첫 번째 의미 있는 이벤트
///
/// 무시할 줄이면 `None`.
pub fn classify(line: &str, tool_name: &str) -> Option<StreamEvent> {
    let event = decode(line).into_iter().next();
    if event.is_none() {
        trace!(tool = %tool_name, "Ignoring stream line: {}", line);
    }
    event
}

// ============================================================================
// 이벤트별 해석
// ============================================================================

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// 정수 또는 실수 필드 (음수/비숫자는 0)
fn u64_field(value: &Value, key: &str) -> u64 {
    match value.get(key) {
        Some(v) => v
            .as_u64()
            .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        None => 0,
    }
}

fn decode_system(value: &Value) -> StreamEvent {
    let subtype = str_field(value, "subtype");
    if subtype.as_deref() != Some("init") {
        return StreamEvent::Generic {
            kind: "system".to_string(),
            subtype,
        };
    }

    StreamEvent::SystemInit {
        session_id: str_field(value, "session_id").unwrap_or_default(),
        model: str_field(value, "model").unwrap_or_else(|| "unknown".to_string()),
        tool_count: value
            .get("tools")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0),
    }
}

fn message_content(value: &Value) -> Option<&Value> {
    value.get("message").and_then(|m| m.get("content"))
}

fn decode_assistant(value: &Value) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    match message_content(value) {
        Some(Value::Array(parts)) => {
            for part in parts {
                match part.get("type").and_then(Value::as_str) {
                    Some("tool_use") => events.push(StreamEvent::ToolInvocation {
                        tool_name: str_field(part, "name")
                            .unwrap_or_else(|| "unknown".to_string()),
                    }),
                    Some("text") => {
                        if let Some(text) = part.get("text").and_then(Value::as_str) {
                            if !text.is_empty() {
                                events.push(StreamEvent::TextFragment {
                                    text: text.to_string(),
                                });
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        Some(Value::String(text)) if !text.is_empty() => {
            events.push(StreamEvent::TextFragment { text: text.clone() });
        }
        _ => {}
    }

    if events.is_empty() {
        events.push(StreamEvent::Generic {
            kind: "assistant".to_string(),
            subtype: None,
        });
    }
    events
}

/// tool_result의 content: 문자열 또는 `{type: text, text}` 블록 배열
fn tool_result_detail(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(blocks)) => blocks
            .iter()
            .filter_map(|b| b.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn decode_user(value: &Value) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    if let Some(Value::Array(parts)) = message_content(value) {
        for part in parts {
            if part.get("type").and_then(Value::as_str) == Some("tool_result") {
                events.push(StreamEvent::ToolResult {
                    is_error: bool_field(part, "is_error"),
                    detail: tool_result_detail(part.get("content")),
                });
            }
        }
    }

    if events.is_empty() {
        events.push(StreamEvent::Generic {
            kind: "user".to_string(),
            subtype: None,
        });
    }
    events
}

fn decode_result(value: &Value) -> StreamEvent {
    StreamEvent::Result {
        is_error: bool_field(value, "is_error"),
        duration_ms: u64_field(value, "duration_ms"),
        turns: u64_field(value, "num_turns"),
        cost: value
            .get("total_cost_usd")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
    }
}

// ============================================================================
// 테스트
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_line() {
        let line = r#"{"type":"result","is_error":false,"duration_ms":500,"num_turns":2,"total_cost_usd":0.01}"#;
        assert_eq!(
            classify(line, "echo"),
            Some(StreamEvent::Result {
                is_error: false,
                duration_ms: 500,
                turns: 2,
                cost: 0.01,
            })
        );
    }

    #[test]
    fn test_system_init() {
        let line = r#"{"type":"system","subtype":"init","session_id":"abc-123","model":"sonnet","tools":["Bash","Read"]}"#;
        let event = classify(line, "echo").unwrap();
        assert_eq!(event.session_id(), Some("abc-123"));
        assert_eq!(
            event,
            StreamEvent::SystemInit {
                session_id: "abc-123".to_string(),
                model: "sonnet".to_string(),
                tool_count: 2,
            }
        );
    }

    #[test]
    fn test_system_other_subtype() {
        let line = r#"{"type":"system","subtype":"compact_boundary"}"#;
        assert_eq!(
            classify(line, "echo"),
            Some(StreamEvent::Generic {
                kind: "system".to_string(),
                subtype: Some("compact_boundary".to_string()),
            })
        );
    }

    #[test]
    fn test_assistant_mixed_content() {
        let line = r#"{"type":"assistant","message":{"content":[{"type":"text","text":"Looking"},{"type":"tool_use","name":"Grep","input":{}},{"type":"thinking","thinking":"..."}]}}"#;
        let events = decode(line);
        assert_eq!(
            events,
            vec![
                StreamEvent::TextFragment {
                    text: "Looking".to_string()
                },
                StreamEvent::ToolInvocation {
                    tool_name: "Grep".to_string()
                },
            ]
        );
        // classify는 첫 번째만
        assert_eq!(classify(line, "echo"), Some(events[0].clone()));
    }

    #[test]
    fn test_assistant_without_content_is_generic() {
        let line = r#"{"type":"assistant","message":{}}"#;
        assert_eq!(
            classify(line, "echo"),
            Some(StreamEvent::Generic {
                kind: "assistant".to_string(),
                subtype: None
            })
        );
    }

    #[test]
    fn test_tool_result_shapes() {
        let string_content = r#"{"type":"user","message":{"content":[{"type":"tool_result","content":"ok","is_error":false}]}}"#;
        assert_eq!(
            classify(string_content, "echo"),
            Some(StreamEvent::ToolResult {
                is_error: false,
                detail: "ok".to_string()
            })
        );

        let block_content = r#"{"type":"user","message":{"content":[{"type":"tool_result","content":[{"type":"text","text":"a"},{"type":"text","text":"b"}],"is_error":true}]}}"#;
        assert_eq!(
            classify(block_content, "echo"),
            Some(StreamEvent::ToolResult {
                is_error: true,
                detail: "a\nb".to_string()
            })
        );
    }

    #[test]
    fn test_malformed_lines() {
        for line in [
            "",
            "   ",
            "not json",
            "{\"type\":",
            "[]",
            "42",
            r#"{"no_type":true}"#,
            r#"{"type":7}"#,
            r#"{"type":"stream_event"}"#,
        ] {
            assert_eq!(classify(line, "echo"), None, "line {:?}", line);
            assert!(decode(line).is_empty());
        }
    }

    #[test]
    fn test_result_defaults() {
        let line = r#"{"type":"result","duration_ms":"slow","num_turns":-1}"#;
        assert_eq!(
            classify(line, "echo"),
            Some(StreamEvent::Result {
                is_error: false,
                duration_ms: 0,
                turns: 0,
                cost: 0.0,
            })
        );
    }
}
