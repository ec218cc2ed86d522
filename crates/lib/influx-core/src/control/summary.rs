use influx_store::models::{FieldSnapshot, FluxValue, MeasurementSummary, Record};
use influx_store::schema::COL_VALUE;
use tracing::debug;

use super::{ControlError, QueryAdapter};
use crate::flux;
use crate::store::QueryBackend;

impl<B: QueryBackend> QueryAdapter<B> {
    /// Summarizes every measurement with data in the last two days: one entry
    /// per measurement holding the latest value of each of its fields.
    ///
    /// Measurements are visited one at a time in discovery order. Those whose
    /// follow-up query returns no rows are left out.
    ///
    /// # Errors
    /// Returns `ControlError` if the discovery query fails, or
    /// `ControlError::Summary` naming the first measurement whose follow-up
    /// query fails. Summaries already built are discarded in both cases.
    pub async fn recent_measurements(&self) -> Result<Vec<MeasurementSummary>, ControlError> {
        let discovered = self
            .raw_query(&flux::recent_measurement_names(&self.bucket))
            .await?;
        let names = measurement_names(&discovered);
        debug!(measurements = names.len(), "discovered recent measurements");

        let mut summaries = Vec::with_capacity(names.len());
        for measurement in names {
            let records = self
                .submit(&flux::recent_fields(&self.bucket, &measurement))
                .await
                .map_err(|source| ControlError::Summary {
                    measurement: measurement.clone(),
                    source,
                })?;
            if records.is_empty() {
                debug!(%measurement, "no recent rows, skipping");
                continue;
            }
            summaries.push(MeasurementSummary {
                fields: records.iter().map(FieldSnapshot::from_record).collect(),
                measurement,
            });
        }
        Ok(summaries)
    }
}

// `distinct` runs per table, so the same name can come back more than once.
fn measurement_names(records: &[Record]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for record in records {
        let Some(FluxValue::String(name)) = record.get(COL_VALUE) else {
            continue;
        };
        if !names.iter().any(|seen| seen == name) {
            names.push(name.clone());
        }
    }
    names
}
