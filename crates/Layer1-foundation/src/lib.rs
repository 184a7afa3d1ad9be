//! # toolbridge-foundation
//!
//! Foundation layer for ToolBridge:
//! - Error: 에러 분류 (설정, 템플릿, 프로세스 실행)
//! - Storage: JsonStore (설정/세션 파일)
//! - Config: 통합 설정 (BridgeConfig)
//! - Registry: 프롬프트 기반 도구 정의
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  MCP stdio server (tools/list, tools/call)              │
//! │                     │                                   │
//! │                     ▼                                   │
//! │          ToolBridge (세션 해석 → 명령 생성 → 실행)         │
//! │          ┌─────────┴─────────┐                         │
//! │          ▼                   ▼                         │
//! │   SessionStore        StreamingRunner                  │
//! │   (sessions.json)     (agent stream-json)              │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod registry;
pub mod storage;
pub mod strings;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{BridgeConfig, BRIDGE_CONFIG_FILE, DEFAULT_TIMEOUT_SECS};

// ============================================================================
// Registry (도구 정의)
// ============================================================================
pub use registry::{ToolDefinition, ToolRegistry, DEFAULT_INPUT_FIELD};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::{JsonStore, DATA_DIR_NAME};
