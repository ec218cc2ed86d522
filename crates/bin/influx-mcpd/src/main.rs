//! Daemon entry point for the influx MCP server.
//!
//! Loads configuration from flags and the environment, connects the query
//! adapter to `InfluxDB` over HTTP, and serves MCP over stdio or streamable HTTP.

mod config;

use influx_core::control::QueryAdapter;
use influx_core::store::{BackendResult, InfluxConnection, InfluxHttpBackend};
use influx_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{InfluxConfig, Transport};

const DEFAULT_LOG_FILTER: &str = "influx_mcpd=info,influx_mcp=info,influx_core=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // stdout carries the MCP stream in stdio mode.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = InfluxConfig::from_args()?;
    info!(
        url = %config.influx_url,
        org = %config.influx_org,
        bucket = %config.influx_bucket,
        token = %config.masked_token(),
        transport = %config.transport,
        "starting influx MCP server"
    );
    for name in config.empty_settings() {
        warn!(setting = name, "connection setting is empty; queries will likely fail");
    }

    let adapter = build_adapter(&config)?;
    match config.transport {
        Transport::Stdio => serve_stdio(adapter, config.sensor_map).await?,
        Transport::Http => {
            let http = http_config(&config);
            serve_streamable_http(adapter, config.sensor_map, http).await?;
        }
    }
    Ok(())
}

fn build_adapter(config: &InfluxConfig) -> BackendResult<QueryAdapter<InfluxHttpBackend>> {
    let connection = InfluxConnection::new(config.influx_url.clone())
        .with_token(config.influx_token.clone())
        .with_org(config.influx_org.clone())
        .with_bucket(config.influx_bucket.clone())
        .with_timeout(config.influx_timeout);
    let backend = InfluxHttpBackend::new(connection)?;
    Ok(QueryAdapter::new(backend, config.influx_bucket.clone()))
}

const fn http_config(config: &InfluxConfig) -> McpHttpServerConfig {
    McpHttpServerConfig::new(config.http_addr)
        .with_stateful_mode(config.http_stateful)
        .with_sse_keep_alive(config.sse_keep_alive)
}
