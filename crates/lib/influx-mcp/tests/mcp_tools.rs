use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::DateTime;
use influx_core::control::QueryAdapter;
use influx_core::store::{BackendError, BackendResult, QueryBackend};
use influx_mcp::InfluxMcp;
use influx_store::models::Record;
use influx_store::schema::{COL_FIELD, COL_MEASUREMENT, COL_TIME, COL_VALUE};
use rmcp::model::{
    CallToolRequestParams,
    CallToolResult,
    GetPromptRequestParams,
    PromptMessageContent,
    ReadResourceRequestParams,
    ReadResourceResult,
    ResourceContents,
};
use rmcp::service::RunningService;
use rmcp::{RoleClient, ServiceExt};
use serde_json::{Value, json};

/// In-memory stand-in for `InfluxDB` with one bucket of home sensor data.
///
/// Any query mentioning the `broken` measurement fails, as does every query
/// once `fail_all` is set.
#[derive(Default)]
struct FakeInflux {
    queries: Mutex<Vec<String>>,
    fail_all: bool,
}

impl FakeInflux {
    fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    fn query_count(&self) -> usize {
        self.queries.lock().expect("queries lock poisoned").len()
    }
}

fn sample(measurement: &str, field: &str, value: f64, time: &str) -> Record {
    Record::new()
        .with("result", "_result")
        .with("table", 0_i64)
        .with(COL_MEASUREMENT, measurement)
        .with(COL_FIELD, field)
        .with(COL_VALUE, value)
        .with(
            COL_TIME,
            DateTime::parse_from_rfc3339(time).expect("valid timestamp"),
        )
}

impl QueryBackend for FakeInflux {
    async fn query_rows(&self, flux: &str) -> BackendResult<Vec<Record>> {
        self.queries
            .lock()
            .expect("queries lock poisoned")
            .push(flux.to_string());
        if self.fail_all || flux.contains("\"broken\"") {
            return Err(BackendError::Api {
                status: 404,
                message: "bucket \"home\" not found".to_string(),
            });
        }
        if flux.contains("distinct") {
            return Ok(vec![
                Record::new().with(COL_VALUE, "temperature"),
                Record::new().with(COL_VALUE, "doors"),
            ]);
        }
        if flux.contains("\"temperature\"") && flux.contains("\"celsius\"") {
            if flux.contains("last()") {
                return Ok(vec![sample("temperature", "celsius", 21.5, "2024-05-01T11:59:00Z")]);
            }
            return Ok(vec![
                sample("temperature", "celsius", 20.5, "2024-05-01T11:00:00Z"),
                sample("temperature", "celsius", 21.5, "2024-05-01T11:59:00Z"),
            ]);
        }
        if flux.contains("\"temperature\"") {
            return Ok(vec![sample("temperature", "celsius", 21.5, "2024-05-01T11:59:00Z")]);
        }
        Ok(Vec::new())
    }
}

struct Harness {
    client: RunningService<RoleClient, ()>,
    backend: Arc<FakeInflux>,
}

async fn connect(backend: FakeInflux, sensor_map: PathBuf) -> Harness {
    let backend = Arc::new(backend);
    let adapter = QueryAdapter::from_arc(backend.clone(), "home");
    let server = InfluxMcp::new(adapter, sensor_map);

    let (server_io, client_io) = tokio::io::duplex(64 * 1024);
    tokio::spawn(async move {
        let running = server.serve(server_io).await.expect("server should start");
        let _ = running.waiting().await;
    });
    let client = ().serve(client_io).await.expect("client should connect");
    Harness { client, backend }
}

fn missing_sensor_map() -> PathBuf {
    std::env::temp_dir().join("influx-mcp-tests-no-such-sensor-map.txt")
}

fn call(name: &str, arguments: Value) -> CallToolRequestParams {
    CallToolRequestParams {
        meta: None,
        name: name.to_string().into(),
        arguments: arguments.as_object().cloned(),
        task: None,
    }
}

fn first_text(result: &CallToolResult) -> &str {
    result.content[0]
        .as_text()
        .expect("expected text content")
        .text
        .as_str()
}

fn resource_text(result: &ReadResourceResult) -> String {
    result
        .contents
        .iter()
        .filter_map(|content| match content {
            ResourceContents::TextResourceContents { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn lists_every_tool() {
    let harness = connect(FakeInflux::default(), missing_sensor_map()).await;

    let tools = harness.client.list_all_tools().await.expect("tools should list");
    let mut names: Vec<&str> = tools.iter().map(|tool| &*tool.name).collect();
    names.sort_unstable();

    assert_eq!(
        names,
        vec![
            "echo",
            "health",
            "influxdb-latest",
            "influxdb-query",
            "influxdb-range",
            "measurements-recent",
            "read-sensors-map",
        ]
    );
}

#[tokio::test]
async fn server_info_carries_the_full_instructions() {
    let harness = connect(FakeInflux::default(), missing_sensor_map()).await;

    let info = harness.client.peer_info().expect("server info after handshake");
    let instructions = info.instructions.as_deref().expect("instructions are set");

    assert_eq!(info.server_info.name, "influx-mcp");
    assert!(instructions.starts_with("influx-mcp answers questions"));
    assert!(instructions.contains("summaries return `{ \"error\": ... }`"));
    assert!(instructions.ends_with("`health` returns `ok`."));
}

#[tokio::test]
async fn latest_tool_returns_the_latest_sample_as_json() {
    let harness = connect(FakeInflux::default(), missing_sensor_map()).await;

    let result = harness
        .client
        .call_tool(call(
            "influxdb-latest",
            json!({ "measurement": "temperature", "field": "celsius", "timeRange": "-1h" }),
        ))
        .await
        .expect("tool call should succeed");

    assert_ne!(result.is_error, Some(true));
    let rows: Value = serde_json::from_str(first_text(&result)).expect("payload should be JSON");
    let rows = rows.as_array().expect("payload should be an array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["_measurement"], "temperature");
    assert_eq!(rows[0]["_field"], "celsius");
    assert_eq!(rows[0]["_value"], 21.5);
}

#[tokio::test]
async fn range_and_raw_tools_return_rows_in_order() {
    let harness = connect(FakeInflux::default(), missing_sensor_map()).await;

    let range = harness
        .client
        .call_tool(call(
            "influxdb-range",
            json!({ "measurement": "temperature", "field": "celsius", "start": "-2h" }),
        ))
        .await
        .expect("range call should succeed");
    let rows: Value = serde_json::from_str(first_text(&range)).expect("payload should be JSON");
    assert_eq!(rows[0]["_value"], 20.5);
    assert_eq!(rows[1]["_value"], 21.5);

    let raw = harness
        .client
        .call_tool(call(
            "influxdb-query",
            json!({ "query": influx_core::flux::range("home", "temperature", "celsius", "-2h", "now()") }),
        ))
        .await
        .expect("raw call should succeed");
    assert_eq!(first_text(&raw), first_text(&range));
}

#[tokio::test]
async fn backend_failures_come_back_as_text_payloads() {
    let harness = connect(FakeInflux::failing(), missing_sensor_map()).await;

    let cases = [
        ("influxdb-query", json!({ "query": "buckets()" }), "Error executing query: "),
        (
            "influxdb-latest",
            json!({ "measurement": "temperature", "field": "celsius" }),
            "Error getting latest data: ",
        ),
        (
            "influxdb-range",
            json!({ "measurement": "temperature", "field": "celsius", "start": "-1d" }),
            "Error getting data in range: ",
        ),
    ];

    for (tool, arguments, prefix) in cases {
        let result = harness
            .client
            .call_tool(call(tool, arguments))
            .await
            .unwrap_or_else(|err| panic!("{tool} should not fail at the protocol level: {err}"));
        let text = first_text(&result);
        assert!(text.starts_with(prefix), "{tool} payload: {text}");
        assert!(text.contains("not found"), "{tool} payload: {text}");
    }
}

#[tokio::test]
async fn malformed_arguments_never_reach_the_backend() {
    let harness = connect(FakeInflux::default(), missing_sensor_map()).await;

    let missing_field = harness
        .client
        .call_tool(call("influxdb-latest", json!({ "measurement": "temperature" })))
        .await;
    assert!(missing_field.is_err(), "missing field should be rejected");

    let wrong_type = harness
        .client
        .call_tool(call("influxdb-query", json!({ "query": 42 })))
        .await;
    assert!(wrong_type.is_err(), "non-string query should be rejected");

    assert_eq!(harness.backend.query_count(), 0);
}

#[tokio::test]
async fn recent_measurements_tool_and_resource_agree() {
    let harness = connect(FakeInflux::default(), missing_sensor_map()).await;

    let result = harness
        .client
        .call_tool(call("measurements-recent", json!({})))
        .await
        .expect("summary call should succeed");
    let summaries: Value =
        serde_json::from_str(first_text(&result)).expect("summary should be JSON");
    let summaries = summaries.as_array().expect("summary should be an array");
    assert_eq!(summaries.len(), 1, "doors has no recent rows: {summaries:?}");
    assert_eq!(summaries[0]["measurement"], "temperature");
    assert_eq!(summaries[0]["fields"][0]["field"], "celsius");
    assert_eq!(summaries[0]["fields"][0]["value"], 21.5);

    let resource = harness
        .client
        .read_resource(ReadResourceRequestParams {
            meta: None,
            uri: "measurements:/recent".into(),
        })
        .await
        .expect("resource read should succeed");
    assert_eq!(resource_text(&resource), first_text(&result));
}

#[tokio::test]
async fn recent_measurements_failure_is_a_json_error() {
    let harness = connect(FakeInflux::failing(), missing_sensor_map()).await;

    let result = harness
        .client
        .call_tool(call("measurements-recent", json!({})))
        .await
        .expect("summary call should not fail at the protocol level");
    let payload: Value =
        serde_json::from_str(first_text(&result)).expect("error payload should be JSON");
    let message = payload["error"].as_str().expect("error key should be a string");
    assert!(message.starts_with("Error getting recent measurements: "));

    let resource = harness
        .client
        .read_resource(ReadResourceRequestParams {
            meta: None,
            uri: "measurements:/recent".into(),
        })
        .await
        .expect("resource read should not fail at the protocol level");
    assert!(resource_text(&resource).contains("\"error\""));
}

#[tokio::test]
async fn sensor_map_is_returned_verbatim() {
    let path = std::env::temp_dir().join(format!(
        "influx-mcp-tests-sensors-{}.txt",
        std::process::id()
    ));
    std::fs::write(&path, "temperature: kitchen\npower: garage\n")
        .expect("sensor map fixture should be written");
    let harness = connect(FakeInflux::default(), path.clone()).await;

    let result = harness
        .client
        .call_tool(call("read-sensors-map", json!({})))
        .await
        .expect("sensor map call should succeed");

    assert_eq!(first_text(&result), "temperature: kitchen\npower: garage\n");
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn missing_sensor_map_is_an_error_payload() {
    let harness = connect(FakeInflux::default(), missing_sensor_map()).await;

    let result = harness
        .client
        .call_tool(call("read-sensors-map", json!({})))
        .await
        .expect("sensor map call should not fail at the protocol level");

    assert!(first_text(&result).starts_with("Error reading sensor map"));
}

#[tokio::test]
async fn echo_tool_and_resource() {
    let harness = connect(FakeInflux::default(), missing_sensor_map()).await;

    let result = harness
        .client
        .call_tool(call("echo", json!({ "message": "hello" })))
        .await
        .expect("echo should succeed");
    assert_eq!(first_text(&result), "Tool echo: hello");

    let resource = harness
        .client
        .read_resource(ReadResourceRequestParams {
            meta: None,
            uri: "echo://hello".into(),
        })
        .await
        .expect("echo resource should resolve");
    assert_eq!(resource_text(&resource), "Resource echo: hello");

    let unknown = harness
        .client
        .read_resource(ReadResourceRequestParams {
            meta: None,
            uri: "measurements:/unknown".into(),
        })
        .await;
    assert!(unknown.is_err());
    assert_eq!(harness.backend.query_count(), 0);
}

#[tokio::test]
async fn resources_and_templates_are_listed() {
    let harness = connect(FakeInflux::default(), missing_sensor_map()).await;

    let resources = harness
        .client
        .list_all_resources()
        .await
        .expect("resources should list");
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0].uri, "measurements:/recent");
    assert_eq!(resources[0].mime_type.as_deref(), Some("application/json"));

    let templates = harness
        .client
        .list_all_resource_templates()
        .await
        .expect("templates should list");
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].uri_template, "echo://{message}");
}

#[tokio::test]
async fn review_code_prompt_renders() {
    let harness = connect(FakeInflux::default(), missing_sensor_map()).await;

    let prompts = harness.client.list_all_prompts().await.expect("prompts should list");
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].name, "review-code");

    let result = harness
        .client
        .get_prompt(GetPromptRequestParams {
            meta: None,
            name: "review-code".into(),
            arguments: json!({ "code": "let x = 1;" }).as_object().cloned(),
        })
        .await
        .expect("prompt should render");
    match &result.messages[0].content {
        PromptMessageContent::Text { text } => {
            assert_eq!(text, "Please review this code:\n\nlet x = 1;");
        }
        other => panic!("unexpected prompt content: {other:?}"),
    }
}

#[tokio::test]
async fn failing_latest_query_issues_a_single_backend_call() {
    let harness = connect(FakeInflux::default(), missing_sensor_map()).await;

    let result = harness
        .client
        .call_tool(call(
            "influxdb-latest",
            json!({ "measurement": "broken", "field": "x" }),
        ))
        .await
        .expect("tool call should not fail at the protocol level");

    assert!(first_text(&result).starts_with("Error getting latest data: "));
    assert_eq!(harness.backend.query_count(), 1);
}
