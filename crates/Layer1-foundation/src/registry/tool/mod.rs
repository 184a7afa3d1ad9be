//! Tool 정의 레지스트리
//!
//! 설정 파일에 선언된 도구들. 파일은 배열 형식과 `{ "tools": [...] }`
//! 래핑 형식을 모두 지원한다.

mod definition;
mod registry;

pub use definition::{ToolDefinition, DEFAULT_INPUT_FIELD};
pub use registry::ToolRegistry;
