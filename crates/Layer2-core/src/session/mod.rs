//! Session - 도구별 외부 에이전트 세션 영속화
//!
//! - `store`: 도구 이름 → {세션 ID, 작업 디렉토리, 마지막 사용 시각}
//! - `discovery`: 에이전트 자체 세션 로그에서 최신 세션 ID 탐색

mod discovery;
mod store;

pub use discovery::{encode_project_dir, latest_session_id};
pub use store::{SessionMap, SessionStore, ToolSession};
