use std::sync::Arc;
use std::time::Duration;

use influx_store::models::Record;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use super::{BackendError, BackendResult, QueryBackend, decode_annotated_csv};

const QUERY_PATH: &str = "/api/v2/query";
const CSV_CONTENT_TYPE: &str = "application/csv";
const ANNOTATIONS: [&str; 3] = ["datatype", "group", "default"];

/// Connection settings for a single `InfluxDB` 2.x organization and bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfluxConnection {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
    pub timeout: Option<Duration>,
}

impl InfluxConnection {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: String::new(),
            org: String::new(),
            bucket: String::new(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    #[must_use]
    pub fn with_org(mut self, org: impl Into<String>) -> Self {
        self.org = org.into();
        self
    }

    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn query_endpoint(&self) -> String {
        format!("{}{QUERY_PATH}", self.url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    dialect: Dialect,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Dialect {
    header: bool,
    delimiter: &'static str,
    annotations: [&'static str; 3],
    comment_prefix: &'static str,
    date_time_format: &'static str,
}

impl<'a> QueryRequest<'a> {
    const fn flux(query: &'a str) -> Self {
        Self {
            query,
            kind: "flux",
            dialect: Dialect {
                header: true,
                delimiter: ",",
                annotations: ANNOTATIONS,
                comment_prefix: "#",
                date_time_format: "RFC3339",
            },
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Query backend that talks to the `InfluxDB` v2 HTTP API.
#[derive(Clone)]
pub struct InfluxHttpBackend {
    client: reqwest::Client,
    connection: Arc<InfluxConnection>,
}

impl InfluxHttpBackend {
    /// Builds the HTTP client for a connection.
    ///
    /// # Errors
    /// Returns `BackendError::Transport` if the TLS backend cannot be initialized.
    pub fn new(connection: InfluxConnection) -> BackendResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = connection.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            connection: Arc::new(connection),
        })
    }

    #[must_use]
    pub fn connection(&self) -> &InfluxConnection {
        &self.connection
    }
}

impl QueryBackend for InfluxHttpBackend {
    async fn query_rows(&self, flux: &str) -> BackendResult<Vec<Record>> {
        let mut request = self
            .client
            .post(self.connection.query_endpoint())
            .query(&[("org", self.connection.org.as_str())])
            .header(ACCEPT, CSV_CONTENT_TYPE)
            .json(&QueryRequest::flux(flux));
        if !self.connection.token.is_empty() {
            request = request.header(AUTHORIZATION, format!("Token {}", self.connection.token));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        decode_annotated_csv(&body)
    }
}

fn api_error(status: u16, body: &str) -> BackendError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| body.trim().to_string());
    BackendError::Api { status, message }
}
