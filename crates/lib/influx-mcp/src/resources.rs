//! MCP resources: the recent-measurements summary and an echo template.

use influx_core::control::QueryAdapter;
use influx_core::store::QueryBackend;
use rmcp::ErrorData;
use rmcp::model::{
    ErrorCode,
    RawResource,
    RawResourceTemplate,
    ReadResourceResult,
    Resource,
    ResourceContents,
    ResourceTemplate,
};

use crate::helpers;

pub const RECENT_MEASUREMENTS_URI: &str = "measurements:/recent";
pub const ECHO_URI_TEMPLATE: &str = "echo://{message}";
const ECHO_SCHEME: &str = "echo://";
const JSON_MIME: &str = "application/json";

#[must_use]
pub fn list_resources() -> Vec<Resource> {
    let mut raw = RawResource::new(RECENT_MEASUREMENTS_URI, "measurements:/recent");
    raw.description = Some(
        "Measurements with data in the last 2 days and the latest value of each field".into(),
    );
    raw.mime_type = Some(JSON_MIME.into());
    vec![Resource::new(raw, None)]
}

#[must_use]
pub fn list_resource_templates() -> Vec<ResourceTemplate> {
    let raw = RawResourceTemplate {
        uri_template: ECHO_URI_TEMPLATE.into(),
        name: "echo".into(),
        title: None,
        description: Some("Echoes the message embedded in the URI".into()),
        mime_type: Some("text/plain".into()),
        icons: None,
    };
    vec![ResourceTemplate::new(raw, None)]
}

/// Resolves a resource URI. Backend failures are reported inside the
/// resource body; only unknown URIs are protocol errors.
///
/// # Errors
/// Returns `RESOURCE_NOT_FOUND` when the URI matches no resource.
pub async fn read_resource<B: QueryBackend>(
    uri: &str,
    adapter: &QueryAdapter<B>,
) -> Result<ReadResourceResult, ErrorData> {
    let text = if uri == RECENT_MEASUREMENTS_URI {
        helpers::summary_payload(adapter.recent_measurements().await)
    } else if let Some(message) = uri.strip_prefix(ECHO_SCHEME) {
        echo_text(message)
    } else {
        return Err(helpers::mcp_err(
            ErrorCode::RESOURCE_NOT_FOUND,
            format!("unknown resource: {uri}"),
        ));
    };
    Ok(ReadResourceResult {
        contents: vec![ResourceContents::text(text, uri)],
    })
}

fn echo_text(message: &str) -> String {
    format!("Resource echo: {message}")
}
