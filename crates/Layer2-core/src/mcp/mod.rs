//! MCP - Model Context Protocol stdio 서버
//!
//! 도구 정의 파일의 도구들을 MCP 클라이언트에 노출하고, `tools/call`을
//! `ToolBridge`로 넘긴다.
//!
//! ## 참고
//! - https://modelcontextprotocol.io/

mod server;
mod types;

pub use server::{StdioServer, PROTOCOL_VERSION, SERVER_NAME};
pub use types::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpContent, McpTool, McpToolCall,
    McpToolResult, JSONRPC_VERSION,
};
