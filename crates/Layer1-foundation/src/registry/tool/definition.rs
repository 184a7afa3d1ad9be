use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// 스키마가 없을 때 사용하는 기본 입력 필드
pub const DEFAULT_INPUT_FIELD: &str = "input";

/// 개별 도구 정의
///
/// ```json
/// {
///   "name": "review",
///   "description": "Review the current diff",
///   "prompt": "Review this change: {{input}}",
///   "inputSchema": { "type": "object", "properties": { "input": { "type": "string" } } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// 도구 이름 (고유)
    pub name: String,

    /// 도구 설명
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// 프롬프트 템플릿 (`{{name}}` 플레이스홀더)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// 입력 스키마 (JSON Schema)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            prompt: None,
            input_schema: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn input_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }

    /// 목록에 노출할 설명
    pub fn display_description(&self) -> String {
        self.description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("LLM-backed tool: {}", self.name))
    }

    /// 목록에 노출할 입력 스키마
    pub fn effective_schema(&self) -> Value {
        self.input_schema.clone().unwrap_or_else(|| {
            json!({
                "type": "object",
                "properties": {
                    "input": {
                        "type": "string",
                        "description": "Input for the tool"
                    },
                    "new_session": {
                        "type": "boolean",
                        "description": "Start a fresh agent session instead of resuming the previous one",
                        "default": false
                    }
                },
                "required": ["input"]
            })
        })
    }

    /// 실행에 사용할 프롬프트 템플릿
    ///
    /// `prompt`가 없으면 스키마의 첫 번째 required 속성을 과제 내용으로 쓰고,
    /// 그것도 없으면 `{{input}}`.
    pub fn prompt_template(&self) -> String {
        if let Some(prompt) = self.prompt.as_ref().filter(|p| !p.trim().is_empty()) {
            return prompt.clone();
        }
        let field = self
            .input_schema
            .as_ref()
            .and_then(|schema| schema.get("required"))
            .and_then(Value::as_array)
            .and_then(|required| required.iter().find_map(Value::as_str))
            .unwrap_or(DEFAULT_INPUT_FIELD);
        format!("{{{{{}}}}}", field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_template_configured() {
        let tool = ToolDefinition::new("review").prompt("Review {{input}}");
        assert_eq!(tool.prompt_template(), "Review {{input}}");
    }

    #[test]
    fn test_prompt_template_from_required_field() {
        let tool = ToolDefinition::new("plan").input_schema(json!({
            "type": "object",
            "properties": { "task": { "type": "string" } },
            "required": ["task"]
        }));
        assert_eq!(tool.prompt_template(), "{{task}}");
    }

    #[test]
    fn test_prompt_template_placeholder() {
        let tool = ToolDefinition::new("bare");
        assert_eq!(tool.prompt_template(), "{{input}}");
    }

    #[test]
    fn test_display_defaults() {
        let tool = ToolDefinition::new("echo");
        assert_eq!(tool.display_description(), "LLM-backed tool: echo");
        let schema = tool.effective_schema();
        assert_eq!(schema["required"][0], "input");
        assert!(schema["properties"]["new_session"].is_object());
    }
}
