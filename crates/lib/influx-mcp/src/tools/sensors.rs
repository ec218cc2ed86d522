use influx_core::store::QueryBackend;
use rmcp::{ErrorData, model::CallToolResult, tool, tool_router};
use tracing::warn;

use crate::{InfluxMcp, helpers};

#[tool_router(router = tool_router_sensors, vis = "pub")]
impl<B: QueryBackend> InfluxMcp<B> {
    #[tool(
        name = "read-sensors-map",
        description = "Return the sensor location map describing where each measurement is recorded."
    )]
    async fn read_sensors_map(&self) -> Result<CallToolResult, ErrorData> {
        let text = match tokio::fs::read_to_string(self.sensor_map.as_path()).await {
            Ok(contents) => contents,
            Err(err) => {
                warn!(path = %self.sensor_map.display(), error = %err, "sensor map unreadable");
                format!("Error reading sensor map: {err}")
            }
        };
        Ok(helpers::text_result(text))
    }
}
