//! Stream - 에이전트 stream-json 이벤트 해석
//!
//! 한 줄 = JSON 이벤트 하나. JSON이 아닌 줄이나 알 수 없는 이벤트는 조용히
//! 무시한다 (스트림을 중단시키지 않음).

mod classifier;
mod event;

pub use classifier::{classify, decode};
pub use event::{StreamEvent, LOG_PREVIEW_CHARS};
