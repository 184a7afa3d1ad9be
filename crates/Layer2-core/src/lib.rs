//! toolbridge-core: Core Runtime for ToolBridge
//!
//! Layer2 - 도구 호출 → 외부 에이전트 실행 레이어
//!
//! # 주요 모듈
//!
//! - `session`: 도구별 에이전트 세션 영속화 (sessions.json)
//! - `command`: 템플릿 치환, 셸 이스케이프, 명령어 조립
//! - `stream`: 에이전트 stream-json 이벤트 해석
//! - `runner`: 에이전트 프로세스 실행 (stdout 스트리밍, 타임아웃)
//! - `bridge`: 도구 호출 오케스트레이션
//! - `mcp`: MCP stdio 서버
//!
//! # 사용 예시
//!
//! ```ignore
//! use toolbridge_core::{ToolBridge, StdioServer};
//! use toolbridge_foundation::{BridgeConfig, ToolRegistry};
//!
//! let config = BridgeConfig::load()?;
//! let registry = ToolRegistry::new(config.tools_path());
//! let bridge = Arc::new(ToolBridge::from_config(config)?);
//!
//! // 도구 한 번 호출
//! let tool = registry.find("review")?.unwrap();
//! let outcome = bridge.invoke(&tool, &args).await;
//! println!("{}", outcome.text());
//!
//! // 또는 MCP 서버로 노출
//! StdioServer::new(bridge, registry).run().await?;
//! ```

pub mod bridge;
pub mod command;
pub mod mcp;
pub mod runner;
pub mod session;
pub mod stream;

// Re-exports: Session
pub use session::{encode_project_dir, latest_session_id, SessionMap, SessionStore, ToolSession};

// Re-exports: Command
pub use command::{
    build, escape_argument, fresh_base, resume_base, should_use_stdin, substitute, PromptCommand,
    PromptMode, Substitution, STDIN_THRESHOLD,
};

// Re-exports: Stream
pub use stream::{classify, decode, StreamEvent};

// Re-exports: Runner
pub use runner::{AgentRunner, RunOutput, StreamCollector, StreamingRunner, NO_TEXT_OUTPUT};

// Re-exports: Bridge
pub use bridge::{
    FailureDetails, FailurePayload, InvocationState, PlannedCall, ToolBridge, ToolOutcome,
    NEW_SESSION_ARG,
};

// Re-exports: MCP
pub use mcp::{McpTool, McpToolResult, StdioServer, PROTOCOL_VERSION};
