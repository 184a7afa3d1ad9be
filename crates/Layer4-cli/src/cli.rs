//! Subcommand implementations

use anyhow::{bail, Context};
use serde_json::{Map, Value};
use std::sync::Arc;
use toolbridge_core::{SessionStore, StdioServer, ToolBridge, ToolOutcome, NEW_SESSION_ARG};
use toolbridge_foundation::strings::{preview, short_id};
use toolbridge_foundation::{BridgeConfig, Error, ToolRegistry, DEFAULT_INPUT_FIELD};

/// `run` 서브커맨드 입력
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub tool: String,
    pub input: Option<String>,
    pub args_json: Option<String>,
    pub new_session: bool,
    pub dry_run: bool,
    pub strict: bool,
}

impl RunRequest {
    /// `--args` JSON + `--input` + `--new-session` → 도구 인자
    fn arguments(&self) -> anyhow::Result<Map<String, Value>> {
        let mut args = match &self.args_json {
            Some(raw) => match serde_json::from_str::<Value>(raw).context("--args is not valid JSON")? {
                Value::Object(map) => map,
                _ => bail!(Error::InvalidInput("--args must be a JSON object".to_string())),
            },
            None => Map::new(),
        };
        if let Some(input) = &self.input {
            args.insert(DEFAULT_INPUT_FIELD.to_string(), Value::String(input.clone()));
        }
        if self.new_session {
            args.insert(NEW_SESSION_ARG.to_string(), Value::Bool(true));
        }
        Ok(args)
    }
}

/// MCP stdio 서버 실행
pub async fn serve(config: BridgeConfig) -> anyhow::Result<()> {
    let registry = ToolRegistry::new(config.tools_path());
    let bridge = Arc::new(ToolBridge::from_config(config)?);
    StdioServer::new(bridge, registry).run().await?;
    Ok(())
}

/// 도구 한 번 실행. 성공 여부를 돌려준다.
pub async fn run_tool(config: BridgeConfig, request: RunRequest) -> anyhow::Result<bool> {
    let registry = ToolRegistry::new(config.tools_path());
    let tool = registry
        .find(&request.tool)?
        .ok_or_else(|| Error::ToolNotFound(request.tool.clone()))?;
    let args = request.arguments()?;
    let bridge = ToolBridge::from_config(config)?;

    if request.dry_run || request.strict {
        let plan = bridge.plan(&tool, &args)?;
        if request.strict && !plan.missing_parameters.is_empty() {
            bail!(Error::TemplateParameterMissing(
                plan.missing_parameters.join(", ")
            ));
        }
        if request.dry_run {
            println!("Working directory: {}", plan.working_dir.display());
            match &plan.resume_session_id {
                Some(id) => println!("Session:           resume {}", id),
                None => println!("Session:           new"),
            }
            println!("Mode:              {:?}", plan.command.mode);
            println!("Command:\n{}", plan.command);
            return Ok(true);
        }
    }

    let outcome = bridge.invoke(&tool, &args).await;
    match &outcome {
        ToolOutcome::Success(text) => println!("{}", text),
        ToolOutcome::Failure(_) => eprintln!("{}", outcome.text()),
    }
    Ok(outcome.is_success())
}

/// 도구 목록 출력
pub fn list_tools(config: &BridgeConfig) -> anyhow::Result<()> {
    let registry = ToolRegistry::new(config.tools_path());
    let tools = registry.load()?;

    if tools.is_empty() {
        println!("No tools defined in {}", registry.path().display());
        return Ok(());
    }

    println!("\n🔧 Tools ({})\n", registry.path().display());
    println!("{:<20} {:<50} {:<30}", "Name", "Description", "Prompt");
    println!("{}", "-".repeat(100));
    for tool in &tools {
        println!(
            "{:<20} {:<50} {:<30}",
            tool.name,
            preview(&tool.display_description(), 48),
            preview(&tool.prompt_template(), 28)
        );
    }
    println!();
    Ok(())
}

/// 저장된 세션 출력
pub fn list_sessions(config: &BridgeConfig) -> anyhow::Result<()> {
    let store = SessionStore::from_config(config)?;
    let sessions = store.list();

    if sessions.is_empty() {
        println!("No sessions recorded in {}", store.path().display());
        return Ok(());
    }

    println!("\n📋 Tool Sessions\n");
    println!("{:<20} {:<12} {:<18} {}", "Tool", "Session", "Last used", "Directory");
    println!("{}", "-".repeat(90));
    for (tool, session) in sessions {
        println!(
            "{:<20} {:<12} {:<18} {}",
            tool,
            short_id(&session.session_id),
            session.last_used.format("%Y-%m-%d %H:%M").to_string(),
            session.working_directory.display()
        );
    }
    println!("\nUse 'toolbridge run <tool> --new-session' to discard a session.\n");
    Ok(())
}

/// 환경 점검. 모든 필수 항목이 통과하면 true.
pub fn doctor(config: &BridgeConfig) -> bool {
    let mut ok = true;
    let mut check = |passed: bool, required: bool, message: String| {
        let mark = if passed {
            "✓"
        } else if required {
            ok = false;
            "✗"
        } else {
            "!"
        };
        println!("{} {}", mark, message);
    };

    match config.resolve_agent_binary() {
        Some(path) => check(true, true, format!("Agent: {}", path.display())),
        None => check(
            false,
            true,
            format!("Agent '{}' not found on PATH", config.agent_command),
        ),
    }

    let registry = ToolRegistry::new(config.tools_path());
    match registry.load() {
        Ok(tools) if !tools.is_empty() => check(
            true,
            true,
            format!("Tools: {} defined in {}", tools.len(), registry.path().display()),
        ),
        Ok(_) => check(
            false,
            false,
            format!("Tools: none defined in {}", registry.path().display()),
        ),
        Err(e) => check(false, true, format!("Tools: {}", e)),
    }

    match SessionStore::from_config(config) {
        Ok(store) => check(
            true,
            false,
            format!(
                "Sessions: {} recorded in {}",
                store.load().len(),
                store.path().display()
            ),
        ),
        Err(e) => check(false, true, format!("Sessions: {}", e)),
    }

    let agent_sessions = config.agent_sessions_path();
    check(
        agent_sessions.is_dir(),
        false,
        format!("Agent session logs: {}", agent_sessions.display()),
    );

    let working_dir = config.working_directory();
    check(
        working_dir.is_dir(),
        true,
        format!("Working directory: {}", working_dir.display()),
    );

    println!("Timeout: {}s", config.timeout_secs);
    ok
}
