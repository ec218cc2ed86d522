use std::{error::Error, fmt, sync::Arc};

use influx_store::models::Record;
use tracing::debug;

use crate::store::{BackendError, BackendResult, QueryBackend};

pub mod query;
pub mod summary;

#[derive(Debug)]
pub enum ControlError {
    Backend(BackendError),
    Summary {
        measurement: String,
        source: BackendError,
    },
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(err) => write!(f, "{err}"),
            Self::Summary {
                measurement,
                source,
            } => write!(f, "measurement {measurement}: {source}"),
        }
    }
}

impl Error for ControlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(err) | Self::Summary { source: err, .. } => Some(err),
        }
    }
}

impl From<BackendError> for ControlError {
    fn from(err: BackendError) -> Self {
        Self::Backend(err)
    }
}

/// Translates query intents into Flux and normalizes the rows that come back.
///
/// The backend handle is shared read-only between every call; the adapter
/// itself carries no mutable state.
pub struct QueryAdapter<B: QueryBackend> {
    backend: Arc<B>,
    bucket: Arc<str>,
}

impl<B: QueryBackend> Clone for QueryAdapter<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            bucket: self.bucket.clone(),
        }
    }
}

impl<B: QueryBackend> QueryAdapter<B> {
    pub fn new(backend: B, bucket: impl Into<String>) -> Self {
        Self::from_arc(Arc::new(backend), bucket)
    }

    pub fn from_arc(backend: Arc<B>, bucket: impl Into<String>) -> Self {
        Self {
            backend,
            bucket: Arc::from(bucket.into()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    // Every query the adapter issues goes through here so each one is logged.
    pub(crate) async fn submit(&self, flux: &str) -> BackendResult<Vec<Record>> {
        debug!(%flux, "submitting flux query");
        let records = self.backend.query_rows(flux).await?;
        debug!(rows = records.len(), "flux query completed");
        Ok(records)
    }
}
