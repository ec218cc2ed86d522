use clap::{Parser, ValueEnum, builder::BoolishValueParser};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use influx_mcp::DEFAULT_SENSOR_MAP;
use influx_mcp::server::DEFAULT_MCP_HTTP_ADDR;

const DEFAULT_INFLUX_URL: &str = "http://localhost:8086";
const DEFAULT_SSE_KEEP_ALIVE_SECS: u64 = 15;

/// How the daemon talks to its MCP client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    Stdio,
    Http,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => f.write_str("stdio"),
            Self::Http => f.write_str("http"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "influx-mcpd", version, about = "InfluxDB MCP daemon.")]
struct CliArgs {
    #[arg(long, env = "INFLUXDB_URL", default_value = DEFAULT_INFLUX_URL)]
    influx_url: String,

    #[arg(long, env = "INFLUXDB_TOKEN", default_value = "", hide_env_values = true)]
    influx_token: String,

    #[arg(long, env = "INFLUXDB_ORG", default_value = "")]
    influx_org: String,

    #[arg(long, env = "INFLUXDB_BUCKET", default_value = "")]
    influx_bucket: String,

    #[arg(long, env = "INFLUXDB_TIMEOUT_SECS")]
    influx_timeout_secs: Option<u64>,

    #[arg(long, env = "INFLUX_MCP_SENSOR_MAP", default_value = DEFAULT_SENSOR_MAP)]
    sensor_map: PathBuf,

    #[arg(long, env = "INFLUX_MCP_TRANSPORT", value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    #[arg(long, env = "INFLUX_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    http_addr: SocketAddr,

    #[arg(
        long,
        env = "INFLUX_MCP_HTTP_STATELESS",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    http_stateless: bool,

    #[arg(
        long,
        env = "INFLUX_MCP_SSE_KEEP_ALIVE_SECS",
        default_value_t = DEFAULT_SSE_KEEP_ALIVE_SECS
    )]
    sse_keep_alive_secs: u64,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone)]
pub struct InfluxConfig {
    pub influx_url: String,
    pub influx_token: String,
    pub influx_org: String,
    pub influx_bucket: String,
    pub influx_timeout: Option<Duration>,
    pub sensor_map: PathBuf,
    pub transport: Transport,
    pub http_addr: SocketAddr,
    pub http_stateful: bool,
    pub sse_keep_alive: Option<Duration>,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl InfluxConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }

    /// Token rendered for logs: first and last five characters only.
    pub fn masked_token(&self) -> String {
        mask_token(&self.influx_token)
    }

    /// Names of connection settings left empty, which `InfluxDB` will likely reject.
    pub fn empty_settings(&self) -> Vec<&'static str> {
        [
            ("INFLUXDB_TOKEN", &self.influx_token),
            ("INFLUXDB_ORG", &self.influx_org),
            ("INFLUXDB_BUCKET", &self.influx_bucket),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.is_empty() {
        return "not set".to_string();
    }
    if chars.len() <= 10 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{head}...{tail}")
}

impl TryFrom<CliArgs> for InfluxConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let influx_url = args.influx_url.trim().to_string();
        if influx_url.is_empty() {
            return Err(ConfigError::MissingSetting("INFLUXDB_URL"));
        }
        if !influx_url.starts_with("http://") && !influx_url.starts_with("https://") {
            return Err(ConfigError::InvalidSetting {
                name: "INFLUXDB_URL",
                value: influx_url,
            });
        }

        let influx_timeout = match args.influx_timeout_secs {
            None | Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
        };

        let sse_keep_alive = if args.sse_keep_alive_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(args.sse_keep_alive_secs))
        };

        Ok(Self {
            influx_url,
            influx_token: args.influx_token,
            influx_org: args.influx_org,
            influx_bucket: args.influx_bucket,
            influx_timeout,
            sensor_map: args.sensor_map,
            transport: args.transport,
            http_addr: args.http_addr,
            http_stateful: !args.http_stateless,
            sse_keep_alive,
        })
    }
}
