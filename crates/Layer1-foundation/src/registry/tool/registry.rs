use super::ToolDefinition;
use crate::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 도구 정의 레지스트리
///
/// 파일 내용을 캐시하지 않는다. `load()`와 `find()`는 매번 파일을 다시 읽어
/// 외부에서 수정된 정의를 즉시 반영한다.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    path: PathBuf,
}

impl ToolRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 파일에서 도구 정의를 다시 읽음
    ///
    /// 파일이 없으면 빈 목록. 잘못된 항목은 로그를 남기고 건너뛴다.
    pub fn load(&self) -> Result<Vec<ToolDefinition>> {
        if !self.path.exists() {
            warn!("Tool definition file not found: {}", self.path.display());
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        let tools = Self::parse(&content)?;
        debug!(
            "Loaded {} tool definitions from {}",
            tools.len(),
            self.path.display()
        );
        Ok(tools)
    }

    /// 이름으로 도구 찾기 (파일 재로드)
    pub fn find(&self, name: &str) -> Result<Option<ToolDefinition>> {
        Ok(self.load()?.into_iter().find(|tool| tool.name == name))
    }

    /// 설정 내용 파싱 (배열 또는 `{ "tools": [...] }`)
    pub fn parse(content: &str) -> Result<Vec<ToolDefinition>> {
        let root: Value = serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid tool definition JSON: {}", e)))?;

        let entries = match root {
            Value::Array(entries) => entries,
            Value::Object(mut map) => match map.remove("tools") {
                Some(Value::Array(entries)) => entries,
                _ => {
                    let keys: Vec<&String> = map.keys().collect();
                    return Err(Error::Config(format!(
                        "Expected an array or an object with a 'tools' array, got keys: {:?}",
                        keys
                    )));
                }
            },
            other => {
                return Err(Error::Config(format!(
                    "Expected an array or an object with a 'tools' array, got: {}",
                    json_kind(&other)
                )));
            }
        };

        let mut tools: Vec<ToolDefinition> = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<ToolDefinition>(entry) {
                Ok(tool) if tool.name.trim().is_empty() => {
                    warn!("Skipping tool definition #{}: empty name", index);
                }
                Ok(tool) if tools.iter().any(|t| t.name == tool.name) => {
                    warn!("Skipping duplicate tool definition: {}", tool.name);
                }
                Ok(tool) => tools.push(tool),
                Err(e) => {
                    warn!("Skipping tool definition #{}: {}", index, e);
                }
            }
        }
        Ok(tools)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
