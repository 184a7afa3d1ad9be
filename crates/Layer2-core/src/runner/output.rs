use crate::stream::StreamEvent;

/// 로그가 있을 때 결과 맨 앞에 붙는 제목
pub const LOG_HEADER: &str = "Execution log:";

/// 텍스트 응답이 하나도 없을 때의 답변
pub const NO_TEXT_OUTPUT: &str = "Task completed successfully (no text output).";

/// 실행 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// 이벤트별 로그 한 줄 (도착 순서)
    pub log_lines: Vec<String>,
    /// 마지막 텍스트 응답
    pub answer: String,
    /// 스트림에서 관찰된 세션 ID
    pub session_id: Option<String>,
}

impl RunOutput {
    /// 호출자에게 돌려줄 텍스트
    pub fn render(&self) -> String {
        if self.log_lines.is_empty() {
            return self.answer.clone();
        }
        format!(
            "{}\n{}\n\n{}",
            LOG_HEADER,
            self.log_lines.join("\n"),
            self.answer
        )
    }
}

/// 스트림 이벤트 누적기
#[derive(Debug, Default)]
pub struct StreamCollector {
    log_lines: Vec<String>,
    last_text: Option<String>,
    session_id: Option<String>,
}

impl StreamCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: StreamEvent) {
        if let Some(line) = event.log_line() {
            self.log_lines.push(line);
        }
        if let Some(id) = event.session_id() {
            self.session_id = Some(id.to_string());
        }
        if let StreamEvent::TextFragment { text } = event {
            self.last_text = Some(text);
        }
    }

    pub fn event_count(&self) -> usize {
        self.log_lines.len()
    }

    pub fn finish(self) -> RunOutput {
        RunOutput {
            log_lines: self.log_lines,
            answer: self
                .last_text
                .unwrap_or_else(|| NO_TEXT_OUTPUT.to_string()),
            session_id: self.session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::decode;

    fn collect(lines: &[&str]) -> RunOutput {
        let mut collector = StreamCollector::new();
        for line in lines {
            for event in decode(line) {
                collector.push(event);
            }
        }
        collector.finish()
    }

    #[test]
    fn test_last_text_wins() {
        let output = collect(&[
            r#"{"type":"system","subtype":"init","session_id":"s-1","model":"m","tools":[]}"#,
            r#"{"type":"assistant","message":{"content":[{"type":"text","text":"first"}]}}"#,
            "garbage",
            r#"{"type":"assistant","message":{"content":[{"type":"text","text":"second"}]}}"#,
        ]);
        assert_eq!(output.answer, "second");
        assert_eq!(output.session_id.as_deref(), Some("s-1"));
        assert_eq!(output.log_lines.len(), 3);
    }

    #[test]
    fn test_no_text_output() {
        let output = collect(&[r#"{"type":"result","is_error":false,"duration_ms":10,"num_turns":1,"total_cost_usd":0}"#]);
        assert_eq!(output.answer, NO_TEXT_OUTPUT);
    }

    #[test]
    fn test_render_with_logs() {
        let output = RunOutput {
            log_lines: vec!["[tool] Read".to_string(), "[text] done".to_string()],
            answer: "done".to_string(),
            session_id: None,
        };
        assert_eq!(
            output.render(),
            "Execution log:\n[tool] Read\n[text] done\n\ndone"
        );
    }

    #[test]
    fn test_render_without_logs() {
        let output = collect(&["", "not json"]);
        assert!(output.log_lines.is_empty());
        assert_eq!(output.render(), NO_TEXT_OUTPUT);
    }
}
