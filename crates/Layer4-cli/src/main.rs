//! ToolBridge CLI - Main entry point

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use toolbridge_foundation::BridgeConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// ToolBridge - prompt-defined MCP tools backed by a command-line agent
#[derive(Parser, Debug)]
#[command(name = "toolbridge")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file (default: ~/.toolbridge/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Tool definition file
    #[arg(long, global = true)]
    tools: Option<PathBuf>,

    /// Session store file
    #[arg(long, global = true)]
    sessions: Option<PathBuf>,

    /// Agent executable
    #[arg(long, global = true)]
    agent: Option<String>,

    /// Agent timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Working directory for new agent sessions
    #[arg(long, global = true)]
    working_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve tools over MCP on stdin/stdout (default)
    Serve,
    /// Invoke a single tool and print the result
    Run {
        /// Tool name
        tool: String,

        /// Value for the `input` argument
        #[arg(short, long)]
        input: Option<String>,

        /// Tool arguments as a JSON object
        #[arg(short, long)]
        args: Option<String>,

        /// Ignore the stored session and start fresh
        #[arg(long)]
        new_session: bool,

        /// Print the command without running it
        #[arg(long)]
        dry_run: bool,

        /// Fail if a template parameter has no value
        #[arg(long)]
        strict: bool,
    },
    /// List configured tools
    Tools,
    /// List stored tool sessions
    Sessions,
    /// Check the agent binary and file locations
    Doctor,
}

impl Args {
    /// 설정 파일 → 환경 변수 → CLI 플래그
    fn load_config(&self) -> anyhow::Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::load_from(path)?,
            None => BridgeConfig::load()?,
        };

        if let Some(tools) = &self.tools {
            config.tools_file = Some(tools.clone());
        }
        if let Some(sessions) = &self.sessions {
            config.sessions_file = Some(sessions.clone());
        }
        if let Some(agent) = &self.agent {
            config.agent_command = agent.clone();
        }
        if let Some(timeout) = self.timeout.filter(|secs| *secs > 0) {
            config.timeout_secs = timeout;
        }
        if let Some(dir) = &self.working_dir {
            config.working_dir = Some(dir.clone());
        }
        // 세션 기록에는 절대 경로가 남아야 한다
        config.working_dir = Some(config.working_directory());
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout은 MCP 프로토콜 전용이라 로그는 stderr로
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = args.load_config()?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => cli::serve(config).await,
        Command::Run {
            tool,
            input,
            args,
            new_session,
            dry_run,
            strict,
        } => {
            let request = cli::RunRequest {
                tool,
                input,
                args_json: args,
                new_session,
                dry_run,
                strict,
            };
            if !cli::run_tool(config, request).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Tools => cli::list_tools(&config),
        Command::Sessions => cli::list_sessions(&config),
        Command::Doctor => {
            if !cli::doctor(&config) {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
