//! 외부 에이전트 세션 로그 탐색
//!
//! 에이전트는 성공한 실행의 세션 ID를 돌려주지 않는다. 대신 작업 디렉토리별
//! 로그 디렉토리(`<root>/<encoded cwd>/<session-id>.jsonl`)에 기록하므로,
//! 가장 최근에 수정된 파일의 이름이 방금 끝난 세션의 ID다.

use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// 세션 로그 확장자
const SESSION_LOG_EXT: &str = "jsonl";

/// 작업 디렉토리를 에이전트의 프로젝트 디렉토리 이름으로 변환
///
/// 영숫자가 아닌 모든 문자는 `-`로 바뀐다 (`/root/my.app` → `-root-my-app`).
pub fn encode_project_dir(working_dir: &Path) -> String {
    working_dir
        .to_string_lossy()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

/// 작업 디렉토리의 가장 최근 세션 ID
pub fn latest_session_id(sessions_root: &Path, working_dir: &Path) -> Option<String> {
    let project_dir: PathBuf = sessions_root.join(encode_project_dir(working_dir));
    let entries = match std::fs::read_dir(&project_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("No agent session logs at {}: {}", project_dir.display(), e);
            return None;
        }
    };

    let mut latest: Option<(SystemTime, String)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SESSION_LOG_EXT) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let newer = match &latest {
            Some((time, _)) => modified > *time,
            None => true,
        };
        if newer {
            latest = Some((modified, stem.to_string()));
        }
    }

    latest.map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    #[test]
    fn test_encode_project_dir() {
        assert_eq!(encode_project_dir(Path::new("/root/crate")), "-root-crate");
        assert_eq!(
            encode_project_dir(Path::new("/home/dev/my.app_v2")),
            "-home-dev-my-app-v2"
        );
    }

    #[test]
    fn test_latest_session_id() {
        let root = tempfile::tempdir().unwrap();
        let cwd = Path::new("/work/project");
        let project = root.path().join(encode_project_dir(cwd));
        std::fs::create_dir_all(&project).unwrap();

        let old = File::create(project.join("old-session.jsonl")).unwrap();
        let new = File::create(project.join("new-session.jsonl")).unwrap();
        File::create(project.join("notes.txt")).unwrap();

        let now = SystemTime::now();
        old.set_modified(now - Duration::from_secs(60)).unwrap();
        new.set_modified(now).unwrap();

        assert_eq!(
            latest_session_id(root.path(), cwd),
            Some("new-session".to_string())
        );
    }

    #[test]
    fn test_latest_session_id_missing_dir() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(latest_session_id(root.path(), Path::new("/nowhere")), None);
    }
}
