//! MCP stdio server
//!
//! 줄 단위 JSON-RPC 2.0. stdout은 프로토콜 전용이므로 로그는 모두 stderr로
//! 간다. 요청은 한 번에 하나씩 처리한다.

use super::types::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpTool, McpToolCall, McpToolResult,
};
use crate::bridge::{ToolBridge, ToolOutcome};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use toolbridge_foundation::{Error, Result, ToolRegistry};
use tracing::{debug, info, warn};

/// 지원하는 MCP 프로토콜 버전
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// `serverInfo.name`
pub const SERVER_NAME: &str = "toolbridge";

type RpcResult = std::result::Result<Value, JsonRpcError>;

/// MCP stdio 서버
pub struct StdioServer {
    bridge: Arc<ToolBridge>,
    registry: ToolRegistry,
}

impl StdioServer {
    pub fn new(bridge: Arc<ToolBridge>, registry: ToolRegistry) -> Self {
        Self { bridge, registry }
    }

    /// 프로세스 stdin/stdout으로 서비스
    pub async fn run(&self) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        self.serve(tokio::io::stdin(), &mut stdout).await
    }

    /// 입력이 끝날 때까지 요청 처리
    pub async fn serve<R, W>(&self, reader: R, writer: &mut W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(
            "MCP server listening on stdio (tools file: {})",
            self.registry.path().display()
        );

        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                let mut bytes = serde_json::to_vec(&response)?;
                bytes.push(b'\n');
                writer.write_all(&bytes).await?;
                writer.flush().await?;
            }
        }

        info!("MCP client closed the connection");
        Ok(())
    }

    /// 한 줄 처리 (알림이면 응답 없음)
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line.trim()) {
            Ok(value) => value,
            Err(e) => {
                warn!("Unparseable request: {}", e);
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    JsonRpcError::parse_error(e),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    id,
                    JsonRpcError::invalid_request(e.to_string()),
                ));
            }
        };

        if request.is_notification() {
            debug!("Notification: {}", request.method);
            return None;
        }

        debug!("Request: {}", request.method);
        let id = request.id.clone().unwrap_or(Value::Null);
        let response = match self.dispatch(&request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        };
        Some(response)
    }

    async fn dispatch(&self, request: &JsonRpcRequest) -> RpcResult {
        match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params.clone()).await,
            // id가 붙어 온 알림은 빈 결과로 확인만 한다
            method if method.starts_with("notifications/") => Ok(json!({})),
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }

    // ========================================================================
    // 메서드
    // ========================================================================

    fn handle_initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    /// 매번 도구 파일을 다시 읽는다
    fn handle_tools_list(&self) -> RpcResult {
        let tools = self
            .registry
            .load()
            .map_err(|e| JsonRpcError::internal_error(e.to_string()))?;

        let listed: Vec<McpTool> = tools
            .iter()
            .map(|tool| McpTool {
                name: tool.name.clone(),
                description: tool.display_description(),
                input_schema: tool.effective_schema(),
            })
            .collect();

        debug!("Listing {} tools", listed.len());
        Ok(json!({ "tools": listed }))
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> RpcResult {
        let call: McpToolCall = params
            .map(serde_json::from_value::<McpToolCall>)
            .transpose()
            .map_err(|e| JsonRpcError::invalid_params(e.to_string()))?
            .ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;

        let arguments: Map<String, Value> = match call.arguments {
            Some(Value::Object(map)) => map,
            Some(Value::Null) | None => Map::new(),
            Some(_) => {
                return Err(JsonRpcError::invalid_params(
                    "Tool arguments must be an object",
                ))
            }
        };

        let tool = self
            .registry
            .find(&call.name)
            .map_err(|e| JsonRpcError::internal_error(e.to_string()))?
            .ok_or_else(|| {
                JsonRpcError::invalid_params(Error::ToolNotFound(call.name.clone()).to_string())
            })?;

        let result = match self.bridge.invoke(&tool, &arguments).await {
            ToolOutcome::Success(text) => McpToolResult::success(text),
            failure @ ToolOutcome::Failure(_) => McpToolResult::error(failure.text()),
        };

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }
}

// ============================================================================
// 테스트
// ============================================================================
