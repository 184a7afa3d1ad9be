//! Config - 통합 설정 관리
//!
//! - `bridge.rs` - BridgeConfig (에이전트 명령, 타임아웃, 파일 경로)

mod bridge;

pub use bridge::{BridgeConfig, BRIDGE_CONFIG_FILE, DEFAULT_TIMEOUT_SECS};
