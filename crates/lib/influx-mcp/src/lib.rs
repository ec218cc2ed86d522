//! MCP server implementation for influx-mcp.
//!
//! This crate wires the query adapter into rmcp tool handlers, resources and
//! prompts. Every tool reports backend failures as text in a successful
//! result, so callers never see a transport-level error for a failed query.

mod helpers;
pub mod prompts;
pub mod resources;
pub mod server;
mod tools;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use influx_core::control::QueryAdapter;
use influx_core::store::QueryBackend;
use rmcp::{
    ErrorData,
    RoleServer,
    ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    schemars,
    service::RequestContext,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{
    CallToolResult,
    GetPromptRequestParams,
    GetPromptResult,
    Implementation,
    ListPromptsResult,
    ListResourceTemplatesResult,
    ListResourcesResult,
    PaginatedRequestParams,
    ReadResourceRequestParams,
    ReadResourceResult,
    ServerCapabilities,
    ServerInfo,
};
use serde::{Deserialize, Serialize};

pub use tools::query::{LatestValueParams, RangeQueryParams, RawQueryParams};

const SERVER_INSTRUCTIONS: &str = r#"influx-mcp answers questions about home sensor data stored in InfluxDB.

Workflow:
1. Call `measurements-recent` (or read `measurements:/recent`) to see which measurements have
   reported in the last 2 days and the latest value of each field.
2. Call `read-sensors-map` to learn where each sensor is located.
3. Query a single field:
   - `influxdb-latest` with `measurement`, `field` and an optional `timeRange` (default `-1h`).
   - `influxdb-range` with `measurement`, `field`, `start` and an optional `stop` (default `now()`).
4. For anything else, `influxdb-query` runs raw Flux against the configured bucket.

Notes:
- Time bounds accept relative durations (`-6h`, `-2d`), RFC 3339 timestamps, or `now()`.
- Failed queries return a text payload starting with `Error`; summaries return `{ "error": ... }`.
- `health` returns `ok`."#;

/// Fallback path of the sensor location map, relative to the working directory.
pub const DEFAULT_SENSOR_MAP: &str = "sensorLocations.txt";

/// MCP server wrapper around the query adapter and tool routers.
pub struct InfluxMcp<B: QueryBackend> {
    tool_router: ToolRouter<Self>,
    adapter: QueryAdapter<B>,
    sensor_map: Arc<PathBuf>,
}

impl<B: QueryBackend> Clone for InfluxMcp<B> {
    fn clone(&self) -> Self {
        Self {
            tool_router: self.tool_router.clone(),
            adapter: self.adapter.clone(),
            sensor_map: self.sensor_map.clone(),
        }
    }
}

impl<B: QueryBackend> InfluxMcp<B> {
    /// Creates a new server over a query adapter and the sensor map location.
    #[must_use]
    pub fn new(adapter: QueryAdapter<B>, sensor_map: impl Into<PathBuf>) -> Self {
        let tool_router = Self::tool_router_core()
            + Self::tool_router_query()
            + Self::tool_router_measurements()
            + Self::tool_router_sensors();
        Self {
            tool_router,
            adapter,
            sensor_map: Arc::new(sensor_map.into()),
        }
    }

    #[must_use]
    pub const fn adapter(&self) -> &QueryAdapter<B> {
        &self.adapter
    }

    #[must_use]
    pub fn sensor_map(&self) -> &Path {
        self.sensor_map.as_path()
    }
}

/// Parameters for the echo tool.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EchoParams {
    pub message: String,
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl<B: QueryBackend> InfluxMcp<B> {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(helpers::text_result("ok"))
    }

    #[tool(description = "Echo a message back. Useful to check the connection.")]
    async fn echo(
        &self,
        Parameters(params): Parameters<EchoParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(helpers::text_result(format!("Tool echo: {}", params.message)))
    }
}

#[tool_handler]
impl<B: QueryBackend> ServerHandler for InfluxMcp<B> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "influx-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult {
            resources: resources::list_resources(),
            next_cursor: None,
            ..Default::default()
        })
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, ErrorData> {
        Ok(ListResourceTemplatesResult {
            resource_templates: resources::list_resource_templates(),
            next_cursor: None,
            ..Default::default()
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        resources::read_resource(&request.uri, &self.adapter).await
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        Ok(ListPromptsResult {
            prompts: prompts::list_prompts(),
            next_cursor: None,
            ..Default::default()
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        let args = request.arguments.unwrap_or_default();
        prompts::get_prompt(&request.name, &args)
    }
}
