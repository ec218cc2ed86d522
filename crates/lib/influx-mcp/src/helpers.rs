use std::borrow::Cow;
use std::fmt::Display;

use influx_store::models::MeasurementSummary;
use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content, ErrorCode};
use serde::Serialize;

pub(crate) fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

pub(crate) fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Pretty JSON on success, `"{context}: {error}"` on failure.
pub(crate) fn json_or_error<T, E>(result: Result<T, E>, context: &str) -> String
where
    T: Serialize,
    E: Display,
{
    result
        .map_err(|err| err.to_string())
        .and_then(|value| serde_json::to_string_pretty(&value).map_err(|err| err.to_string()))
        .unwrap_or_else(|message| format!("{context}: {message}"))
}

pub(crate) const SUMMARY_ERROR_CONTEXT: &str = "Error getting recent measurements";

/// Summary payloads report failures as a JSON object with an `error` key so
/// callers expecting JSON can still parse them.
pub(crate) fn summary_payload<E: Display>(result: Result<Vec<MeasurementSummary>, E>) -> String {
    let outcome = result
        .map_err(|err| format!("{SUMMARY_ERROR_CONTEXT}: {err}"))
        .and_then(|summaries| {
            serde_json::to_string_pretty(&summaries)
                .map_err(|err| format!("{SUMMARY_ERROR_CONTEXT}: {err}"))
        });
    match outcome {
        Ok(json) => json,
        Err(message) => {
            serde_json::to_string_pretty(&serde_json::json!({ "error": message }))
                .unwrap_or_default()
        }
    }
}
