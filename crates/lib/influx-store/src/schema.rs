pub const COL_RESULT: &str = "result";
pub const COL_TABLE: &str = "table";
pub const COL_START: &str = "_start";
pub const COL_STOP: &str = "_stop";
pub const COL_TIME: &str = "_time";
pub const COL_VALUE: &str = "_value";
pub const COL_FIELD: &str = "_field";
pub const COL_MEASUREMENT: &str = "_measurement";

/// Lookback used by latest-value queries when the caller gives none.
pub const DEFAULT_LATEST_RANGE: &str = "-1h";
/// Upper bound used by range queries when the caller gives none.
pub const DEFAULT_RANGE_STOP: &str = "now()";
/// Fixed lookback for the recent-measurements summary.
pub const RECENT_LOOKBACK: &str = "-2d";

pub const DATATYPE_STRING: &str = "string";
pub const DATATYPE_LONG: &str = "long";
pub const DATATYPE_UNSIGNED_LONG: &str = "unsignedLong";
pub const DATATYPE_DOUBLE: &str = "double";
pub const DATATYPE_BOOLEAN: &str = "boolean";
pub const DATATYPE_DATETIME_RFC3339: &str = "dateTime:RFC3339";
pub const DATATYPE_DATETIME_RFC3339_NANO: &str = "dateTime:RFC3339Nano";
