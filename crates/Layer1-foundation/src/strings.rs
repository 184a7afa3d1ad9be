//! String Utilities
//!
//! 로그 표시용 문자열 가공 (UTF-8 경계 안전)
//!
//! # Usage
//!
//! ```ignore
//! use toolbridge_foundation::strings::{truncate_chars, short_id};
//!
//! let preview = truncate_chars("a very long answer ...", 10);
//! let id = short_id("4f1c2a9e-77b0-4c1e-9a33-0e2d1c1b5f00");
//! ```

use std::borrow::Cow;

/// Copy-on-write string type
pub type CowStr<'a> = Cow<'a, str>;

/// 잘림 표시
pub const ELLIPSIS: &str = "…";

/// 세션 ID 표시 길이
pub const SHORT_ID_LEN: usize = 8;

/// 최대 `max_chars` 문자로 자르기 (잘리면 `…` 추가)
pub fn truncate_chars(s: &str, max_chars: usize) -> CowStr<'_> {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => Cow::Owned(format!("{}{}", &s[..byte_idx], ELLIPSIS)),
        None => Cow::Borrowed(s),
    }
}

/// 세션 ID 축약
pub fn short_id(id: &str) -> CowStr<'_> {
    truncate_chars(id, SHORT_ID_LEN)
}

/// 줄바꿈을 공백으로 접어 한 줄로
pub fn single_line(s: &str) -> CowStr<'_> {
    if s.contains(['\n', '\r']) {
        Cow::Owned(s.split_whitespace().collect::<Vec<_>>().join(" "))
    } else {
        Cow::Borrowed(s)
    }
}

/// 로그 한 줄 미리보기 (한 줄로 접은 뒤 자르기)
pub fn preview(s: &str, max_chars: usize) -> String {
    truncate_chars(single_line(s.trim()).as_ref(), max_chars).into_owned()
}

// ============================================================================
// 테스트
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short() {
        assert!(matches!(truncate_chars("abc", 5), Cow::Borrowed("abc")));
        assert_eq!(truncate_chars("abcde", 5), "abcde");
    }

    #[test]
    fn test_truncate_long() {
        assert_eq!(truncate_chars("abcdef", 3), "abc…");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("세션아이디", 2), "세션…");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("4f1c2a9e-77b0-4c1e"), "4f1c2a9e…");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("  line one\nline two  ", 100), "line one line two");
        assert_eq!(preview("hello world", 5), "hello…");
    }
}
