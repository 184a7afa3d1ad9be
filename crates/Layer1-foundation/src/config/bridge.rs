//! Bridge Config - 통합 설정
//!
//! 로드 순서: 기본값 → `~/.toolbridge/config.json` → 환경 변수 → CLI 플래그

use crate::storage::{JsonStore, DATA_DIR_NAME};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 설정 파일명
pub const BRIDGE_CONFIG_FILE: &str = "config.json";

/// 기본 타임아웃 (15분)
pub const DEFAULT_TIMEOUT_SECS: u64 = 900;

/// 도구 정의 파일명
const TOOLS_FILE: &str = "tools.json";

/// 세션 저장 파일명
const SESSIONS_FILE: &str = "sessions.json";

// 환경 변수
const ENV_AGENT: &str = "TOOLBRIDGE_AGENT";
const ENV_TOOLS: &str = "TOOLBRIDGE_TOOLS";
const ENV_SESSIONS: &str = "TOOLBRIDGE_SESSIONS";
const ENV_TIMEOUT: &str = "TOOLBRIDGE_TIMEOUT_SECS";

// ============================================================================
// Bridge Config
// ============================================================================

/// ToolBridge 통합 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    /// 외부 에이전트 실행 파일
    #[serde(default = "default_agent_command")]
    pub agent_command: String,

    /// 모든 호출에 붙는 인자 (stream-json 출력 모드)
    #[serde(default = "default_agent_args")]
    pub agent_args: Vec<String>,

    /// 프로세스 최대 실행 시간 (초)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// 도구 정의 파일
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_file: Option<PathBuf>,

    /// 세션 저장 파일
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions_file: Option<PathBuf>,

    /// 에이전트 자체 세션 로그 디렉토리 (~/.claude/projects)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_sessions_dir: Option<PathBuf>,

    /// 새 세션의 작업 디렉토리
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            agent_command: default_agent_command(),
            agent_args: default_agent_args(),
            timeout_secs: default_timeout_secs(),
            tools_file: None,
            sessions_file: None,
            agent_sessions_dir: None,
            working_dir: None,
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// 글로벌 설정 + 환경 변수 로드
    pub fn load() -> Result<Self> {
        let mut config = match JsonStore::global() {
            Ok(store) => store
                .load_optional::<BridgeConfig>(BRIDGE_CONFIG_FILE)?
                .unwrap_or_default(),
            Err(_) => Self::default(),
        };
        config.sanitize();
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// 지정한 파일에서 로드
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let (store, filename) = JsonStore::for_file(path)?;
        let mut config: BridgeConfig = store.load(&filename)?;
        config.sanitize();
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// 파일에서 읽은 값 보정 (0초 타임아웃은 기본값으로)
    fn sanitize(&mut self) {
        if self.timeout_secs == 0 {
            warn!(
                "Ignoring timeoutSecs of 0, using {}s",
                DEFAULT_TIMEOUT_SECS
            );
            self.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
    }

    /// 환경 변수 덮어쓰기
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(agent) = lookup(ENV_AGENT).filter(|v| !v.trim().is_empty()) {
            self.agent_command = agent;
        }
        if let Some(tools) = lookup(ENV_TOOLS).filter(|v| !v.trim().is_empty()) {
            self.tools_file = Some(PathBuf::from(tools));
        }
        if let Some(sessions) = lookup(ENV_SESSIONS).filter(|v| !v.trim().is_empty()) {
            self.sessions_file = Some(PathBuf::from(sessions));
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT) {
            match timeout.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => debug!("Ignoring invalid {}: {}", ENV_TIMEOUT, timeout),
            }
        }
    }

    // ========================================================================
    // 경로 해석
    // ========================================================================

    /// 도구 정의 파일 경로
    pub fn tools_path(&self) -> PathBuf {
        self.tools_file
            .clone()
            .unwrap_or_else(|| data_dir().join(TOOLS_FILE))
    }

    /// 세션 저장 파일 경로
    pub fn sessions_path(&self) -> PathBuf {
        self.sessions_file
            .clone()
            .unwrap_or_else(|| data_dir().join(SESSIONS_FILE))
    }

    /// 에이전트 세션 로그 디렉토리
    pub fn agent_sessions_path(&self) -> PathBuf {
        self.agent_sessions_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".claude")
                .join("projects")
        })
    }

    /// 새 세션 작업 디렉토리 (항상 절대 경로)
    pub fn working_directory(&self) -> PathBuf {
        let dir = self.working_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        absolutize(dir)
    }

    /// PATH에서 에이전트 실행 파일 찾기
    pub fn resolve_agent_binary(&self) -> Option<PathBuf> {
        which::which(&self.agent_command).ok()
    }

    // === Builder methods ===

    pub fn agent_command(mut self, command: impl Into<String>) -> Self {
        self.agent_command = command.into();
        self
    }

    pub fn agent_args(mut self, args: Vec<String>) -> Self {
        self.agent_args = args;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn tools_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.tools_file = Some(path.into());
        self
    }

    pub fn sessions_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sessions_file = Some(path.into());
        self
    }

    pub fn agent_sessions_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.agent_sessions_dir = Some(path.into());
        self
    }

    pub fn working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// 상대 경로를 현재 디렉토리 기준 절대 경로로. `.` 구성요소는 제거된다.
fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(&path).components().collect(),
        Err(e) => {
            warn!("Cannot resolve {}: {}", path.display(), e);
            path
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

fn default_agent_command() -> String {
    "claude".to_string()
}

fn default_agent_args() -> Vec<String> {
    vec![
        "--output-format".to_string(),
        "stream-json".to_string(),
        "--verbose".to_string(),
    ]
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
