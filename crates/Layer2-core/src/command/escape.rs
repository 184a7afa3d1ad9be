//! 셸 인자 이스케이프와 명령어 조립

use toolbridge_foundation::{BridgeConfig, Error, Result};

/// 이 길이(문자 수)를 넘는 프롬프트는 stdin으로 전달
pub const STDIN_THRESHOLD: usize = 2000;

/// 직접 인자로 넘기기 어려운 문자
const STDIN_TRIGGER_CHARS: [char; 6] = ['\n', '"', '\'', '`', '$', '\\'];

/// 프롬프트 전달 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// `<base> -p <prompt>`
    Argument,
    /// `printf '%s' <prompt> | <base>`
    Stdin,
}

/// 조립된 명령어
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptCommand {
    pub line: String,
    pub mode: PromptMode,
}

impl PromptCommand {
    /// 파이프를 포함하므로 셸을 거쳐야 하는지
    pub fn needs_shell(&self) -> bool {
        self.mode == PromptMode::Stdin
    }
}

impl std::fmt::Display for PromptCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.line)
    }
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+' | '=' | ':' | '@' | '%' | '/')
}

/// `'` → `'"'"'` (따옴표를 닫고, 이스케이프하고, 다시 연다)
fn escape_single_quotes(value: &str) -> String {
    value.replace('\'', r#"'"'"'"#)
}

/// 셸 인자 이스케이프
///
/// 안전한 문자만 있으면 큰따옴표로 감싸고, 그 외에는 작은따옴표로 감싼다.
pub fn escape_argument(value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_safe_char) {
        format!("\"{}\"", value)
    } else {
        format!("'{}'", escape_single_quotes(value))
    }
}

/// stdin 파이프를 써야 하는 프롬프트인지
pub fn should_use_stdin(prompt: &str) -> bool {
    prompt.chars().count() > STDIN_THRESHOLD || prompt.contains(STDIN_TRIGGER_CHARS)
}

/// 프롬프트 + 기본 호출 → 명령어
///
/// 작은따옴표 안에서는 백슬래시가 그대로 유지되고 `printf '%s'`도 인자를
/// 해석하지 않으므로, stdin 경로에서는 작은따옴표만 이스케이프한다.
pub fn build(prompt: &str, base: &str) -> PromptCommand {
    if should_use_stdin(prompt) {
        PromptCommand {
            line: format!("printf '%s' '{}' | {}", escape_single_quotes(prompt), base),
            mode: PromptMode::Stdin,
        }
    } else {
        PromptCommand {
            line: format!("{} -p {}", base, escape_argument(prompt)),
            mode: PromptMode::Argument,
        }
    }
}

fn join_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Result<String> {
    shlex::try_join(words).map_err(|e| Error::CommandConstruction(e.to_string()))
}

/// 새 세션 기본 호출
pub fn fresh_base(config: &BridgeConfig) -> Result<String> {
    let words = std::iter::once(config.agent_command.as_str())
        .chain(config.agent_args.iter().map(String::as_str));
    join_words(words)
}

/// 세션 재개 기본 호출
pub fn resume_base(config: &BridgeConfig, session_id: &str) -> Result<String> {
    if session_id.trim().is_empty() {
        return Err(Error::CommandConstruction(
            "Cannot resume a session without an id".to_string(),
        ));
    }
    let command = join_words([config.agent_command.as_str()])?;
    let args = join_words(config.agent_args.iter().map(String::as_str))?;
    let mut line = format!("{} --resume {}", command, escape_argument(session_id));
    if !args.is_empty() {
        line.push(' ');
        line.push_str(&args);
    }
    Ok(line)
}

// ============================================================================
// 테스트
// ============================================================================
