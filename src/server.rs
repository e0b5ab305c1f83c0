//! MCP server exposing the transit tools over stdio.

use std::sync::Arc;

use color_eyre::{eyre::eyre, Result};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::cache::Backend;
use crate::error::PoaError;
use crate::tools::TransitTools;
use crate::transit::TransitClient;

/// Tool handlers wired to the real facade and the configured cache.
pub type Tools = TransitTools<TransitClient, Backend>;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRequest {
  /// Pagination cursor for fetching next page
  #[serde(default)]
  pub cursor: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RouteDetailsRequest {
  /// The ID of a specific bus route
  #[serde(rename = "routeId")]
  pub route_id: String,
}

#[derive(Clone)]
pub struct PoaBusServer {
  tools: Arc<Tools>,
  tool_router: ToolRouter<Self>,
}

impl PoaBusServer {
  pub fn new(tools: Arc<Tools>) -> Self {
    Self {
      tools,
      tool_router: Self::tool_router(),
    }
  }
}

#[tool_handler]
impl ServerHandler for PoaBusServer {
  fn get_info(&self) -> ServerInfo {
    ServerInfo {
      instructions: Some(
        "Porto Alegre public transit data. Use 'stops-fetcher' and 'routes-fetcher' to list \
         stops and routes page by page (pass back 'nextCursor' as 'cursor'), and \
         'route-details-fetcher' with a route id to get its path."
          .into(),
      ),
      capabilities: ServerCapabilities::builder().enable_tools().build(),
      server_info: Implementation::from_build_env(),
      ..Default::default()
    }
  }
}

#[tool_router]
impl PoaBusServer {
  #[tool(
    name = "stops-fetcher",
    description = "Lists every available bus stop in Porto Alegre with pagination"
  )]
  async fn stops_fetcher(
    &self,
    Parameters(request): Parameters<ListRequest>,
  ) -> Result<CallToolResult, McpError> {
    let page = self
      .tools
      .stops(request.cursor.as_deref())
      .await
      .map_err(to_mcp_error)?;
    payload_result(&page)
  }

  #[tool(
    name = "routes-fetcher",
    description = "Lists every available bus route in Porto Alegre with pagination"
  )]
  async fn routes_fetcher(
    &self,
    Parameters(request): Parameters<ListRequest>,
  ) -> Result<CallToolResult, McpError> {
    let page = self
      .tools
      .routes(request.cursor.as_deref())
      .await
      .map_err(to_mcp_error)?;
    payload_result(&page)
  }

  #[tool(
    name = "route-details-fetcher",
    description = "Lists the details of a given bus route in Porto Alegre"
  )]
  async fn route_details_fetcher(
    &self,
    Parameters(request): Parameters<RouteDetailsRequest>,
  ) -> Result<CallToolResult, McpError> {
    let details = self
      .tools
      .route_details(&request.route_id)
      .await
      .map_err(to_mcp_error)?;
    payload_result(&details)
  }
}

/// Bad input becomes "invalid params"; anything else is an internal error.
fn to_mcp_error(err: PoaError) -> McpError {
  if err.is_invalid_input() {
    McpError::invalid_params(format!("Invalid params: {}", err), None)
  } else {
    error!(error = %err, "Tool call failed");
    McpError::internal_error(err.to_string(), None)
  }
}

/// Structured payload plus a pretty-printed text echo of it.
fn payload_result<T: Serialize>(payload: &T) -> Result<CallToolResult, McpError> {
  let structured = serde_json::to_value(payload)
    .map_err(|e| McpError::internal_error(format!("Failed to serialize result: {}", e), None))?;
  let text = serde_json::to_string_pretty(&structured)
    .map_err(|e| McpError::internal_error(format!("Failed to serialize result: {}", e), None))?;

  let mut result = CallToolResult::success(vec![Content::text(text)]);
  result.structured_content = Some(structured);
  Ok(result)
}

/// Serve on stdin/stdout until the client disconnects or Ctrl-C.
pub async fn serve_stdio(server: PoaBusServer) -> Result<()> {
  let service = server
    .serve(rmcp::transport::stdio())
    .await
    .map_err(|e| eyre!("Failed to start MCP server: {}", e))?;
  info!("MCP server listening on stdio");

  tokio::select! {
    result = service.waiting() => {
      result.map_err(|e| eyre!("MCP server task failed: {}", e))?;
      info!("MCP client disconnected");
    }
    _ = tokio::signal::ctrl_c() => {
      info!("Shutting down gracefully...");
    }
  }

  Ok(())
}
