//! 프롬프트 템플릿 치환
//!
//! `{{name}}` → 같은 이름의 인자. 인자가 없으면 플레이스홀더를 그대로 두고
//! 경고만 남긴다 (부분 프롬프트도 에이전트가 처리할 수 있음).

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::warn;

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_\-]*)\s*\}\}").expect("placeholder regex")
    })
}

/// 치환 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    /// 값이 없어서 남겨진 플레이스홀더 이름
    pub missing: Vec<String>,
}

impl Substitution {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// 템플릿 치환
///
/// 문자열 인자는 그대로, 그 외 JSON 값은 직렬화해서 넣는다. `null`은 없는
/// 것으로 본다.
pub fn substitute(template: &str, args: &Map<String, Value>) -> Substitution {
    let mut missing: Vec<String> = Vec::new();

    let text = placeholder()
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            match args.get(name) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => {
                    if !missing.iter().any(|m| m == name) {
                        missing.push(name.to_string());
                    }
                    caps[0].to_string()
                }
                Some(other) => other.to_string(),
            }
        })
        .into_owned();

    for name in &missing {
        warn!("Template parameter '{}' missing; placeholder left in place", name);
    }

    Substitution { text, missing }
}
