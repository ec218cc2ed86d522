use influx_core::store::QueryBackend;
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::{InfluxMcp, helpers};

/// Parameters for running Flux text as-is.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RawQueryParams {
    /// Flux query text, e.g. `from(bucket: "home") |> range(start: -1h)`.
    pub query: String,
}

/// Parameters for fetching the latest sample of a field.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct LatestValueParams {
    pub measurement: String,
    pub field: String,
    /// Lookback window such as `-1h` or `-30m`. Defaults to `-1h`.
    #[serde(rename = "timeRange")]
    pub time_range: Option<String>,
}

/// Parameters for fetching every sample of a field in a window.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RangeQueryParams {
    pub measurement: String,
    pub field: String,
    /// Relative duration (`-6h`) or RFC 3339 timestamp.
    pub start: String,
    /// Relative duration, RFC 3339 timestamp, or `now()` (the default).
    pub stop: Option<String>,
}

pub(crate) const RAW_QUERY_ERROR: &str = "Error executing query";
pub(crate) const LATEST_ERROR: &str = "Error getting latest data";
pub(crate) const RANGE_ERROR: &str = "Error getting data in range";

#[tool_router(router = tool_router_query, vis = "pub")]
impl<B: QueryBackend> InfluxMcp<B> {
    #[tool(
        name = "influxdb-query",
        description = "Run a raw Flux query against InfluxDB and return the rows as JSON."
    )]
    async fn influxdb_query(
        &self,
        Parameters(params): Parameters<RawQueryParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self.adapter.raw_query(&params.query).await;
        Ok(helpers::text_result(helpers::json_or_error(result, RAW_QUERY_ERROR)))
    }

    #[tool(
        name = "influxdb-latest",
        description = "Get the most recent value of a measurement field within a lookback window (default -1h)."
    )]
    async fn influxdb_latest(
        &self,
        Parameters(params): Parameters<LatestValueParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .adapter
            .latest_value(&params.measurement, &params.field, params.time_range.as_deref())
            .await;
        Ok(helpers::text_result(helpers::json_or_error(result, LATEST_ERROR)))
    }

    #[tool(
        name = "influxdb-range",
        description = "Get every value of a measurement field between start and stop (default now())."
    )]
    async fn influxdb_range(
        &self,
        Parameters(params): Parameters<RangeQueryParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .adapter
            .range_query(
                &params.measurement,
                &params.field,
                &params.start,
                params.stop.as_deref(),
            )
            .await;
        Ok(helpers::text_result(helpers::json_or_error(result, RANGE_ERROR)))
    }
}
