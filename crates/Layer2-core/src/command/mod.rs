//! Command Builder - 프롬프트 → 안전한 셸 명령어
//!
//! 실행은 하지 않는다. 순수 문자열 변환만 담당한다.
//!
//! - `escape`: 인자 이스케이프, stdin 파이프 선택, 명령어 조립
//! - `template`: `{{name}}` 플레이스홀더 치환

mod escape;
mod template;

pub use escape::{
    build, escape_argument, fresh_base, resume_base, should_use_stdin, PromptCommand, PromptMode,
    STDIN_THRESHOLD,
};
pub use template::{substitute, Substitution};
