//! Flux query text builders.
//!
//! Names and time expressions are interpolated verbatim: time bounds may be
//! relative durations (`-1h`), RFC 3339 timestamps, or calls such as `now()`.

use influx_store::schema::{COL_FIELD, COL_MEASUREMENT, RECENT_LOOKBACK};

fn source(bucket: &str) -> String {
    format!("from(bucket: \"{bucket}\")")
}

fn measurement_filter(measurement: &str) -> String {
    format!("\n  |> filter(fn: (r) => r.{COL_MEASUREMENT} == \"{measurement}\")")
}

fn field_filter(field: &str) -> String {
    format!("\n  |> filter(fn: (r) => r.{COL_FIELD} == \"{field}\")")
}

/// Most recent sample of one field within `time_range`.
#[must_use]
pub fn latest_value(bucket: &str, measurement: &str, field: &str, time_range: &str) -> String {
    format!(
        "{}\n  |> range(start: {time_range}){}{}\n  |> last()",
        source(bucket),
        measurement_filter(measurement),
        field_filter(field),
    )
}

/// Every sample of one field within `[start, stop)`.
#[must_use]
pub fn range(bucket: &str, measurement: &str, field: &str, start: &str, stop: &str) -> String {
    format!(
        "{}\n  |> range(start: {start}, stop: {stop}){}{}",
        source(bucket),
        measurement_filter(measurement),
        field_filter(field),
    )
}

/// Distinct measurement names with data in the recent lookback window.
#[must_use]
pub fn recent_measurement_names(bucket: &str) -> String {
    format!(
        "{}\n  |> range(start: {RECENT_LOOKBACK})\n  |> distinct(column: \"{COL_MEASUREMENT}\")",
        source(bucket),
    )
}

/// Latest sample of every field of `measurement` in the recent lookback window.
#[must_use]
pub fn recent_fields(bucket: &str, measurement: &str) -> String {
    format!(
        "{}\n  |> range(start: {RECENT_LOOKBACK}){}\n  |> group(columns: [\"{COL_FIELD}\"])\n  |> last()",
        source(bucket),
        measurement_filter(measurement),
    )
}
