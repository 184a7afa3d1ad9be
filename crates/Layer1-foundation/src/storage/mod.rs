//! Storage module for ToolBridge
//!
//! - `json`: JSON - 설정/세션 파일 저장/로드

mod json;

// JSON Storage (범용)
pub use json::{JsonStore, DATA_DIR_NAME};
