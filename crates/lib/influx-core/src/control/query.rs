use influx_store::models::Record;
use influx_store::schema::{DEFAULT_LATEST_RANGE, DEFAULT_RANGE_STOP};

use super::{ControlError, QueryAdapter};
use crate::flux;
use crate::store::QueryBackend;

impl<B: QueryBackend> QueryAdapter<B> {
    /// Runs Flux text as-is and returns every row in delivery order.
    ///
    /// # Errors
    /// Returns `ControlError` if the backend reports an error at any point;
    /// rows collected before the error are discarded.
    pub async fn raw_query(&self, flux: &str) -> Result<Vec<Record>, ControlError> {
        self.submit(flux).await.map_err(ControlError::from)
    }

    /// Fetches the most recent sample of a field, looking back `time_range`
    /// (default `-1h`).
    ///
    /// At most one record is returned. `last()` reduces per table, so series
    /// split by tags can produce several rows; the newest one wins.
    ///
    /// # Errors
    /// Returns `ControlError` if the backend query fails.
    pub async fn latest_value(
        &self,
        measurement: &str,
        field: &str,
        time_range: Option<&str>,
    ) -> Result<Vec<Record>, ControlError> {
        let time_range = time_range.unwrap_or(DEFAULT_LATEST_RANGE);
        let query = flux::latest_value(&self.bucket, measurement, field, time_range);
        let records = self.raw_query(&query).await?;
        Ok(most_recent(records).into_iter().collect())
    }

    /// Fetches every sample of a field in `[start, stop)` (stop defaults to
    /// `now()`), in the order the backend delivers them.
    ///
    /// # Errors
    /// Returns `ControlError` if the backend query fails.
    pub async fn range_query(
        &self,
        measurement: &str,
        field: &str,
        start: &str,
        stop: Option<&str>,
    ) -> Result<Vec<Record>, ControlError> {
        let stop = stop.unwrap_or(DEFAULT_RANGE_STOP);
        let query = flux::range(&self.bucket, measurement, field, start, stop);
        self.raw_query(&query).await
    }
}

// Ties go to the row delivered last.
fn most_recent(records: Vec<Record>) -> Option<Record> {
    records
        .into_iter()
        .max_by(|left, right| left.time().cmp(&right.time()))
}
