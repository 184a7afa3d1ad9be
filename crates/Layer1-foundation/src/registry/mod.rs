//! Registry - 도구 정의 등록/관리
//!
//! - `tool/` - 프롬프트 기반 도구 정의 (자체 load)

pub mod tool;

// Tool
pub use tool::{ToolDefinition, ToolRegistry, DEFAULT_INPUT_FIELD};
