//! Session Store - 도구별 세션 파일 저장소
//!
//! 파일 하나(`sessions.json`)가 유일한 진실 공급원이다. 모든 접근은 파일을
//! 새로 읽고 전체를 다시 쓴다. 동시 호출 사이의 read-modify-write는 원자적이지
//! 않다.

use super::discovery::latest_session_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use toolbridge_foundation::{BridgeConfig, JsonStore, Result};
use tracing::{debug, info, warn};

/// 도구 이름 → 세션
pub type SessionMap = BTreeMap<String, ToolSession>;

/// 도구 하나의 외부 에이전트 세션
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSession {
    /// 에이전트가 발급한 세션 ID
    pub session_id: String,

    /// 세션이 생성된 작업 디렉토리 (재개 시 같은 디렉토리에서 실행해야 함)
    pub working_directory: PathBuf,

    /// 마지막 성공 사용 시각
    pub last_used: DateTime<Utc>,
}

impl ToolSession {
    pub fn new(session_id: impl Into<String>, working_directory: impl Into<PathBuf>) -> Self {
        Self {
            session_id: session_id.into(),
            working_directory: working_directory.into(),
            last_used: Utc::now(),
        }
    }
}

/// 세션 저장소
#[derive(Debug, Clone)]
pub struct SessionStore {
    store: JsonStore,
    filename: String,
    /// 에이전트 자체 세션 로그 루트
    sessions_root: PathBuf,
}

impl SessionStore {
    pub fn new(sessions_file: impl AsRef<Path>, sessions_root: impl Into<PathBuf>) -> Result<Self> {
        let (store, filename) = JsonStore::for_file(sessions_file)?;
        Ok(Self {
            store,
            filename,
            sessions_root: sessions_root.into(),
        })
    }

    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        Self::new(config.sessions_path(), config.agent_sessions_path())
    }

    pub fn path(&self) -> PathBuf {
        self.store.file_path(&self.filename)
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 전체 세션 로드
    ///
    /// 파일이 없거나 읽을 수 없으면 빈 맵. 실패하지 않는다.
    pub fn load(&self) -> SessionMap {
        match self.store.load_optional::<SessionMap>(&self.filename) {
            Ok(Some(sessions)) => sessions,
            Ok(None) => SessionMap::new(),
            Err(e) => {
                warn!("Ignoring unreadable session store: {}", e);
                SessionMap::new()
            }
        }
    }

    /// 전체 세션 저장 (덮어쓰기)
    ///
    /// 쓰기 실패는 로그만 남긴다. 도구 실행은 영속화 없이 계속된다.
    pub fn save(&self, sessions: &SessionMap) {
        if let Err(e) = self.store.save(&self.filename, sessions) {
            warn!("Failed to persist sessions (continuing without): {}", e);
        }
    }

    /// 도구 세션 조회
    pub fn get(&self, tool_name: &str) -> Option<ToolSession> {
        self.load().remove(tool_name)
    }

    /// 전체 세션 목록
    pub fn list(&self) -> Vec<(String, ToolSession)> {
        self.load().into_iter().collect()
    }

    // ========================================================================
    // 세션 기록
    // ========================================================================

    /// 작업 디렉토리의 최신 외부 세션 ID
    pub fn latest_external_session_id(&self, working_dir: &Path) -> Option<String> {
        latest_session_id(&self.sessions_root, working_dir)
    }

    /// 방금 끝난 실행의 세션을 탐색해서 기록
    pub fn record_session(&self, tool_name: &str, working_dir: &Path) -> Option<ToolSession> {
        match self.latest_external_session_id(working_dir) {
            Some(session_id) => {
                Some(self.record_session_with_id(tool_name, &session_id, working_dir))
            }
            None => {
                warn!(
                    "No agent session found for tool '{}' in {}; session will not be resumed",
                    tool_name,
                    working_dir.display()
                );
                None
            }
        }
    }

    /// 알려진 세션 ID로 기록 (기존 레코드 덮어쓰기)
    pub fn record_session_with_id(
        &self,
        tool_name: &str,
        session_id: &str,
        working_dir: &Path,
    ) -> ToolSession {
        let session = ToolSession::new(session_id, working_dir);
        let mut sessions = self.load();
        sessions.insert(tool_name.to_string(), session.clone());
        self.save(&sessions);
        info!(
            "Recorded session {} for tool '{}'",
            session_id, tool_name
        );
        session
    }

    /// `last_used`만 갱신 (재개된 세션)
    pub fn touch(&self, tool_name: &str) -> bool {
        let mut sessions = self.load();
        match sessions.get_mut(tool_name) {
            Some(session) => {
                session.last_used = Utc::now();
                self.save(&sessions);
                debug!("Touched session for tool '{}'", tool_name);
                true
            }
            None => {
                debug!("No session to touch for tool '{}'", tool_name);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::encode_project_dir;

    fn temp_store(dir: &Path) -> SessionStore {
        SessionStore::new(dir.join("sessions.json"), dir.join("projects")).unwrap()
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(dir.path());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sessions.json"), "{ not json").unwrap();
        let store = temp_store(dir.path());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(dir.path());
        store.record_session_with_id("echo", "abc-123", Path::new("/work"));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["echo"]["sessionId"], "abc-123");
        assert_eq!(raw["echo"]["workingDirectory"], "/work");
        assert!(raw["echo"]["lastUsed"].is_string());
    }

    #[test]
    fn test_record_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(dir.path());
        store.record_session_with_id("echo", "first", Path::new("/a"));
        store.record_session_with_id("echo", "second", Path::new("/b"));

        let sessions = store.load();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions["echo"].session_id, "second");
        assert_eq!(sessions["echo"].working_directory, PathBuf::from("/b"));
    }

    #[test]
    fn test_record_session_discovers_latest() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(dir.path());
        let cwd = Path::new("/srv/app");
        let project = dir.path().join("projects").join(encode_project_dir(cwd));
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(project.join("sess-42.jsonl"), "{}\n").unwrap();

        let recorded = store.record_session("review", cwd).unwrap();
        assert_eq!(recorded.session_id, "sess-42");
        assert_eq!(store.get("review").unwrap().working_directory, cwd);
    }

    #[test]
    fn test_record_session_without_logs_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(dir.path());
        assert!(store.record_session("review", Path::new("/srv/app")).is_none());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_touch_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(dir.path());
        let original = store.record_session_with_id("echo", "abc", Path::new("/work"));

        assert!(store.touch("echo"));
        let once = store.get("echo").unwrap();
        assert!(store.touch("echo"));
        let twice = store.get("echo").unwrap();

        assert_eq!(twice.session_id, original.session_id);
        assert_eq!(twice.working_directory, original.working_directory);
        assert!(once.last_used >= original.last_used);
        assert!(twice.last_used >= once.last_used);
    }

    #[test]
    fn test_touch_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(dir.path());
        assert!(!store.touch("ghost"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // 디렉토리 자리에 파일이 있어서 쓰기가 실패한다
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "").unwrap();
        let store = SessionStore::new(blocker.join("sessions.json"), dir.path()).unwrap();

        store.record_session_with_id("echo", "abc", Path::new("/work"));
        assert!(store.load().is_empty());
    }
}
