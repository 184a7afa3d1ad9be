//! ToolBridge - 도구 호출 한 번의 전체 흐름

use super::outcome::{FailurePayload, ToolOutcome};
use super::state::{InvocationState, StateTracker};
use crate::command::{build, fresh_base, resume_base, substitute, PromptCommand};
use crate::runner::{AgentRunner, RunOutput, StreamingRunner};
use crate::session::SessionStore;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use toolbridge_foundation::{BridgeConfig, Result, ToolDefinition};
use tracing::{debug, error, info, warn};

/// 이전 세션을 무시하고 새로 시작하라는 인자
pub const NEW_SESSION_ARG: &str = "new_session";

/// 실행 직전의 호출 계획
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCall {
    pub command: PromptCommand,
    pub working_dir: PathBuf,
    /// 재개할 세션 (없으면 새 세션)
    pub resume_session_id: Option<String>,
    /// 값이 없어 그대로 남은 템플릿 파라미터
    pub missing_parameters: Vec<String>,
}

impl PlannedCall {
    pub fn is_resume(&self) -> bool {
        self.resume_session_id.is_some()
    }
}

/// 도구 호출 오케스트레이터
pub struct ToolBridge {
    config: BridgeConfig,
    sessions: SessionStore,
    runner: Arc<dyn AgentRunner>,
    /// 마지막 호출이 실패한 도구 (다음 호출은 새 세션)
    evicted: Mutex<HashSet<String>>,
}

impl ToolBridge {
    pub fn new(config: BridgeConfig, sessions: SessionStore, runner: Arc<dyn AgentRunner>) -> Self {
        Self {
            config,
            sessions,
            runner,
            evicted: Mutex::new(HashSet::new()),
        }
    }

    /// 설정으로부터 실제 실행기와 세션 저장소 구성
    pub fn from_config(config: BridgeConfig) -> Result<Self> {
        let sessions = SessionStore::from_config(&config)?;
        let runner = Arc::new(StreamingRunner::from_config(&config));
        Ok(Self::new(config, sessions, runner))
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn is_evicted(&self, tool_name: &str) -> bool {
        self.evicted.lock().contains(tool_name)
    }

    // ========================================================================
    // 계획
    // ========================================================================

    /// 실행하지 않고 명령만 조립
    pub fn plan(&self, tool: &ToolDefinition, args: &Map<String, Value>) -> Result<PlannedCall> {
        let mut tracker = StateTracker::new(&tool.name);
        self.plan_with(tool, args, &mut tracker)
    }

    fn plan_with(
        &self,
        tool: &ToolDefinition,
        args: &Map<String, Value>,
        tracker: &mut StateTracker<'_>,
    ) -> Result<PlannedCall> {
        tracker.advance(InvocationState::ResolvingSession);
        let new_session = args
            .get(NEW_SESSION_ARG)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let (working_dir, resume_session_id) = self.resolve_session(&tool.name, new_session);

        tracker.advance(InvocationState::BuildingCommand);
        let base = match &resume_session_id {
            Some(id) => resume_base(&self.config, id)?,
            None => fresh_base(&self.config)?,
        };
        let prompt = substitute(&tool.prompt_template(), args);
        let command = build(&prompt.text, &base);

        Ok(PlannedCall {
            command,
            working_dir,
            resume_session_id,
            missing_parameters: prompt.missing,
        })
    }

    /// (작업 디렉토리, 재개할 세션 ID)
    fn resolve_session(&self, tool_name: &str, new_session: bool) -> (PathBuf, Option<String>) {
        let fresh = || -> (PathBuf, Option<String>) { (self.config.working_directory(), None) };

        if new_session {
            debug!(tool = %tool_name, "Fresh session requested by caller");
            return fresh();
        }
        if self.is_evicted(tool_name) {
            debug!(tool = %tool_name, "Previous call failed; ignoring stored session");
            return fresh();
        }

        match self.sessions.get(tool_name) {
            Some(session) if session.working_directory.is_dir() => {
                debug!(
                    tool = %tool_name,
                    "Resuming session {} in {}",
                    session.session_id,
                    session.working_directory.display()
                );
                (session.working_directory, Some(session.session_id))
            }
            Some(session) => {
                warn!(
                    tool = %tool_name,
                    "Session directory {} no longer exists; starting fresh",
                    session.working_directory.display()
                );
                fresh()
            }
            None => fresh(),
        }
    }

    // ========================================================================
    // 실행
    // ========================================================================

    /// 도구 호출
    pub async fn invoke(&self, tool: &ToolDefinition, args: &Map<String, Value>) -> ToolOutcome {
        let mut tracker = StateTracker::new(&tool.name);
        info!("Invoking tool '{}'", tool.name);

        let result = self.execute(tool, args, &mut tracker).await;

        match result {
            Ok((plan, output)) => {
                tracker.advance(InvocationState::Succeeded);
                self.remember(&tool.name, &plan, &output);
                info!("Tool '{}' completed", tool.name);
                ToolOutcome::Success(output.render())
            }
            Err(e) => {
                tracker.advance(InvocationState::Failed);
                self.evicted.lock().insert(tool.name.clone());
                error!("Tool '{}' failed: {}", tool.name, e);
                ToolOutcome::Failure(FailurePayload::from_error(&tool.name, &e))
            }
        }
    }

    async fn execute(
        &self,
        tool: &ToolDefinition,
        args: &Map<String, Value>,
        tracker: &mut StateTracker<'_>,
    ) -> Result<(PlannedCall, RunOutput)> {
        let plan = self.plan_with(tool, args, tracker)?;
        tracker.advance(InvocationState::Running);
        let output = self
            .runner
            .run(&plan.command, &plan.working_dir, &tool.name)
            .await?;
        Ok((plan, output))
    }

    /// 성공한 실행의 세션 갱신
    fn remember(&self, tool_name: &str, plan: &PlannedCall, output: &RunOutput) {
        if plan.is_resume() {
            self.sessions.touch(tool_name);
            return;
        }

        match output.session_id.as_deref() {
            Some(id) => {
                self.sessions
                    .record_session_with_id(tool_name, id, &plan.working_dir);
            }
            None => {
                self.sessions.record_session(tool_name, &plan.working_dir);
            }
        }
        self.evicted.lock().remove(tool_name);
    }
}

// ============================================================================
// 테스트
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::NO_TEXT_OUTPUT;
    use crate::session::encode_project_dir;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::path::Path;
    use toolbridge_foundation::Error;

    /// 호출을 기록하고 미리 정한 결과를 돌려주는 실행기
    #[derive(Default)]
    struct ScriptedRunner {
        results: Mutex<VecDeque<Result<RunOutput>>>,
        calls: Mutex<Vec<(String, PathBuf)>>,
    }

    impl ScriptedRunner {
        fn push(&self, result: Result<RunOutput>) {
            self.results.lock().push_back(result);
        }

        fn calls(&self) -> Vec<(String, PathBuf)> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl AgentRunner for ScriptedRunner {
        async fn run(
            &self,
            command: &PromptCommand,
            working_dir: &Path,
            _tool_name: &str,
        ) -> Result<RunOutput> {
            self.calls
                .lock()
                .push((command.line.clone(), working_dir.to_path_buf()));
            self.results
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(Error::ProcessSpawn("no scripted result".to_string())))
        }
    }

    fn answer(text: &str, session_id: Option<&str>) -> Result<RunOutput> {
        Ok(RunOutput {
            log_lines: vec![format!("[text] {}", text)],
            answer: text.to_string(),
            session_id: session_id.map(str::to_string),
        })
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn setup(dir: &Path) -> (ToolBridge, Arc<ScriptedRunner>) {
        let config = BridgeConfig::default()
            .agent_command("agent")
            .agent_args(vec![])
            .sessions_file(dir.join("sessions.json"))
            .agent_sessions_dir(dir.join("projects"))
            .working_dir(dir);
        let sessions = SessionStore::from_config(&config).unwrap();
        let runner = Arc::new(ScriptedRunner::default());
        let bridge = ToolBridge::new(config, sessions, runner.clone());
        (bridge, runner)
    }

    fn echo_tool() -> ToolDefinition {
        ToolDefinition::new("echo").prompt("{{input}}")
    }

    #[tokio::test]
    async fn test_fresh_then_resume() {
        let dir = tempfile::tempdir().unwrap();
        let (bridge, runner) = setup(dir.path());
        runner.push(answer("hi", Some("sess-1")));
        runner.push(answer("again", Some("sess-2")));

        let first = bridge.invoke(&echo_tool(), &args(json!({"input": "hi"}))).await;
        assert_eq!(first, ToolOutcome::Success("Execution log:\n[text] hi\n\nhi".to_string()));
        let recorded = bridge.sessions().get("echo").unwrap();
        assert_eq!(recorded.session_id, "sess-1");
        assert_eq!(recorded.working_directory, dir.path());

        let second = bridge.invoke(&echo_tool(), &args(json!({"input": "again"}))).await;
        assert!(second.is_success());

        let calls = runner.calls();
        assert_eq!(calls[0].0, "agent -p \"hi\"");
        assert_eq!(calls[1].0, "agent --resume \"sess-1\" -p \"again\"");
        assert_eq!(calls[1].1, dir.path());

        // 재개된 실행은 ID를 바꾸지 않고 시각만 갱신
        let touched = bridge.sessions().get("echo").unwrap();
        assert_eq!(touched.session_id, "sess-1");
        assert!(touched.last_used >= recorded.last_used);
    }

    #[tokio::test]
    async fn test_discovery_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let (bridge, runner) = setup(dir.path());
        let project = dir
            .path()
            .join("projects")
            .join(encode_project_dir(dir.path()));
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(project.join("disk-session.jsonl"), "{}\n").unwrap();
        runner.push(answer(NO_TEXT_OUTPUT, None));

        bridge.invoke(&echo_tool(), &args(json!({"input": "x"}))).await;
        assert_eq!(
            bridge.sessions().get("echo").unwrap().session_id,
            "disk-session"
        );
    }

    #[tokio::test]
    async fn test_failure_evicts_until_fresh_success() {
        let dir = tempfile::tempdir().unwrap();
        let (bridge, runner) = setup(dir.path());
        runner.push(answer("ok", Some("sess-1")));
        runner.push(Err(Error::process_exit(2, "bad resume")));
        runner.push(answer("recovered", Some("sess-3")));
        runner.push(answer("resumed", None));

        bridge.invoke(&echo_tool(), &args(json!({"input": "a"}))).await;

        let failed = bridge.invoke(&echo_tool(), &args(json!({"input": "b"}))).await;
        match &failed {
            ToolOutcome::Failure(payload) => {
                assert!(!payload.success);
                assert_eq!(payload.details.tool, "echo");
                assert_eq!(payload.details.error_code, "EXIT_2");
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(bridge.is_evicted("echo"));
        // 디스크 기록은 그대로
        assert_eq!(bridge.sessions().get("echo").unwrap().session_id, "sess-1");

        bridge.invoke(&echo_tool(), &args(json!({"input": "c"}))).await;
        assert!(!bridge.is_evicted("echo"));
        assert_eq!(bridge.sessions().get("echo").unwrap().session_id, "sess-3");

        bridge.invoke(&echo_tool(), &args(json!({"input": "d"}))).await;

        let lines: Vec<String> = runner.calls().into_iter().map(|(line, _)| line).collect();
        assert_eq!(
            lines,
            vec![
                "agent -p \"a\"",
                "agent --resume \"sess-1\" -p \"b\"",
                "agent -p \"c\"",
                "agent --resume \"sess-3\" -p \"d\"",
            ]
        );
    }

    #[tokio::test]
    async fn test_new_session_flag() {
        let dir = tempfile::tempdir().unwrap();
        let (bridge, runner) = setup(dir.path());
        runner.push(answer("one", Some("sess-1")));
        runner.push(answer("two", Some("sess-2")));

        bridge.invoke(&echo_tool(), &args(json!({"input": "one"}))).await;
        bridge
            .invoke(&echo_tool(), &args(json!({"input": "two", "new_session": true})))
            .await;

        assert_eq!(runner.calls()[1].0, "agent -p \"two\"");
        assert_eq!(bridge.sessions().get("echo").unwrap().session_id, "sess-2");
    }

    #[tokio::test]
    async fn test_missing_session_directory_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let (bridge, runner) = setup(dir.path());
        bridge
            .sessions()
            .record_session_with_id("echo", "old", &dir.path().join("gone"));
        runner.push(answer("fresh", Some("new")));

        bridge.invoke(&echo_tool(), &args(json!({"input": "x"}))).await;
        assert_eq!(runner.calls()[0].0, "agent -p \"x\"");
        assert_eq!(runner.calls()[0].1, dir.path());
    }

    #[tokio::test]
    async fn test_relative_working_dir_recorded_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let config = BridgeConfig::default()
            .agent_command("agent")
            .agent_args(vec![])
            .sessions_file(dir.path().join("sessions.json"))
            .agent_sessions_dir(dir.path().join("projects"))
            .working_dir(".");
        let sessions = SessionStore::from_config(&config).unwrap();
        let runner = Arc::new(ScriptedRunner::default());
        let bridge = ToolBridge::new(config, sessions, runner.clone());
        runner.push(answer("hi", Some("sess-1")));

        bridge.invoke(&echo_tool(), &args(json!({"input": "hi"}))).await;

        let recorded = bridge.sessions().get("echo").unwrap();
        assert!(recorded.working_directory.is_absolute());
        assert_eq!(recorded.working_directory, std::env::current_dir().unwrap());
        assert!(runner.calls()[0].1.is_absolute());
    }

    #[test]
    fn test_plan_reports_missing_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let (bridge, _runner) = setup(dir.path());
        let tool = ToolDefinition::new("review").prompt("Review {{file}} for {{focus}}");

        let plan = bridge
            .plan(&tool, &args(json!({"file": "main.rs"})))
            .unwrap();
        assert_eq!(plan.missing_parameters, vec!["focus".to_string()]);
        assert!(!plan.is_resume());
        assert_eq!(plan.command.line, "agent -p 'Review main.rs for {{focus}}'");
    }

    #[test]
    fn test_plan_default_template() {
        let dir = tempfile::tempdir().unwrap();
        let (bridge, _runner) = setup(dir.path());
        let tool = ToolDefinition::new("ask");

        let plan = bridge.plan(&tool, &args(json!({"input": "why"}))).unwrap();
        assert_eq!(plan.command.line, "agent -p \"why\"");
    }
}
