use influx_core::store::QueryBackend;
use rmcp::{ErrorData, model::CallToolResult, tool, tool_router};

use crate::{InfluxMcp, helpers};

#[tool_router(router = tool_router_measurements, vis = "pub")]
impl<B: QueryBackend> InfluxMcp<B> {
    #[tool(
        name = "measurements-recent",
        description = "List measurements with data in the last 2 days and the latest value of each of their fields."
    )]
    async fn measurements_recent(&self) -> Result<CallToolResult, ErrorData> {
        let result = self.adapter.recent_measurements().await;
        Ok(helpers::text_result(helpers::summary_payload(result)))
    }
}
