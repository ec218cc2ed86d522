//! Backend interfaces and the `InfluxDB` HTTP implementation.
//!
//! The store layer submits Flux text and hands back fully materialized rows;
//! it knows nothing about measurements, fields, or summaries.

pub mod annotated;
pub mod http;

use std::{error::Error, fmt, future::Future};

use influx_store::models::Record;

pub use annotated::decode_annotated_csv;
pub use http::{InfluxConnection, InfluxHttpBackend};

#[derive(Debug)]
pub enum BackendError {
    Transport(String),
    Api { status: u16, message: String },
    Flux { message: String, reference: Option<String> },
    Decode(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "InfluxDB unreachable: {message}"),
            Self::Api { status, message } => {
                write!(f, "InfluxDB error (HTTP {status}): {message}")
            }
            Self::Flux {
                message,
                reference: Some(reference),
            } => write!(f, "Flux error: {message} (reference {reference})"),
            Self::Flux {
                message,
                reference: None,
            } => write!(f, "Flux error: {message}"),
            Self::Decode(message) => write!(f, "Invalid query response: {message}"),
        }
    }
}

impl Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<csv::Error> for BackendError {
    fn from(err: csv::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// A source of Flux query results.
///
/// Implementations return every row in delivery order once the backend has
/// finished streaming, or the first error it reported. Partial results are
/// never returned.
pub trait QueryBackend: Send + Sync + 'static {
    fn query_rows(&self, flux: &str) -> impl Future<Output = BackendResult<Vec<Record>>> + Send;
}
