//! Decoder for the annotated CSV dialect returned by `/api/v2/query`.
//!
//! A response is a sequence of tables. Each table starts with optional
//! `#datatype`, `#group` and `#default` annotation rows followed by a header
//! row; the first column of every row is reserved for annotations and is
//! dropped. Query failures that happen after the HTTP status was sent arrive
//! in-band as a table with the columns `error,reference`.

use chrono::DateTime;
use csv::{ReaderBuilder, StringRecord};
use influx_store::models::{FluxValue, Record};
use influx_store::schema::{
    DATATYPE_BOOLEAN,
    DATATYPE_DATETIME_RFC3339,
    DATATYPE_DATETIME_RFC3339_NANO,
    DATATYPE_DOUBLE,
    DATATYPE_LONG,
    DATATYPE_STRING,
    DATATYPE_UNSIGNED_LONG,
};

use super::{BackendError, BackendResult};

const ANNOTATION_DATATYPE: &str = "#datatype";
const ANNOTATION_DEFAULT: &str = "#default";
const ERROR_COLUMN: &str = "error";
const REFERENCE_COLUMN: &str = "reference";

#[derive(Debug, Default)]
struct TableMeta {
    datatypes: Vec<String>,
    defaults: Vec<String>,
    columns: Vec<String>,
}

impl TableMeta {
    fn is_error_table(&self) -> bool {
        self.columns.iter().any(|column| column == ERROR_COLUMN)
            && self.columns.iter().all(|column| column == ERROR_COLUMN || column == REFERENCE_COLUMN)
    }

    fn cell<'a>(&'a self, values: &'a [String], index: usize) -> &'a str {
        let raw = values.get(index).map_or("", String::as_str);
        if raw.is_empty() {
            self.defaults.get(index).map_or("", String::as_str)
        } else {
            raw
        }
    }

    fn datatype(&self, index: usize) -> &str {
        self.datatypes.get(index).map_or(DATATYPE_STRING, String::as_str)
    }

    fn to_error(&self, values: &[String]) -> BackendError {
        let lookup = |name: &str| {
            self.columns
                .iter()
                .position(|column| column == name)
                .map(|index| self.cell(values, index).to_string())
                .filter(|value| !value.is_empty())
        };
        BackendError::Flux {
            message: lookup(ERROR_COLUMN).unwrap_or_else(|| "unknown query error".to_string()),
            reference: lookup(REFERENCE_COLUMN),
        }
    }

    fn to_record(&self, values: &[String]) -> BackendResult<Record> {
        let mut record = Record::new();
        for (index, column) in self.columns.iter().enumerate() {
            let value = decode_cell(self.datatype(index), self.cell(values, index))?;
            record.insert(column.clone(), value);
        }
        Ok(record)
    }
}

/// Decodes an annotated CSV body into records, preserving delivery order.
///
/// # Errors
/// Returns `BackendError::Flux` when the body carries an in-band error table
/// (rows decoded before it are discarded) and `BackendError::Decode` when the
/// CSV is malformed or a typed cell cannot be parsed.
pub fn decode_annotated_csv(body: &str) -> BackendResult<Vec<Record>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut meta = TableMeta::default();
    let mut header_seen = false;
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            meta = TableMeta::default();
            header_seen = false;
            continue;
        }

        let marker = row.get(0).unwrap_or_default();
        if marker.starts_with('#') {
            if header_seen {
                meta = TableMeta::default();
                header_seen = false;
            }
            match marker {
                ANNOTATION_DATATYPE => meta.datatypes = data_cells(&row),
                ANNOTATION_DEFAULT => meta.defaults = data_cells(&row),
                _ => {}
            }
            continue;
        }

        let values = data_cells(&row);
        if !header_seen {
            meta.columns = values;
            header_seen = true;
            continue;
        }
        // Unannotated responses repeat the header row for every table.
        if values == meta.columns {
            continue;
        }
        if meta.is_error_table() {
            return Err(meta.to_error(&values));
        }
        records.push(meta.to_record(&values)?);
    }

    Ok(records)
}

fn data_cells(row: &StringRecord) -> Vec<String> {
    row.iter().skip(1).map(str::to_string).collect()
}

fn decode_cell(datatype: &str, raw: &str) -> BackendResult<FluxValue> {
    if raw.is_empty() && datatype != DATATYPE_STRING {
        return Ok(FluxValue::Null);
    }
    match datatype {
        DATATYPE_LONG => raw
            .parse::<i64>()
            .map(FluxValue::Long)
            .map_err(|err| invalid_cell(datatype, raw, &err)),
        DATATYPE_UNSIGNED_LONG => raw
            .parse::<u64>()
            .map(FluxValue::UnsignedLong)
            .map_err(|err| invalid_cell(datatype, raw, &err)),
        DATATYPE_DOUBLE => raw
            .parse::<f64>()
            .map(FluxValue::Double)
            .map_err(|err| invalid_cell(datatype, raw, &err)),
        DATATYPE_BOOLEAN => match raw {
            "true" => Ok(FluxValue::Bool(true)),
            "false" => Ok(FluxValue::Bool(false)),
            _ => Err(invalid_cell(datatype, raw, &"expected true or false")),
        },
        DATATYPE_DATETIME_RFC3339 | DATATYPE_DATETIME_RFC3339_NANO => {
            DateTime::parse_from_rfc3339(raw)
                .map(FluxValue::Time)
                .map_err(|err| invalid_cell(datatype, raw, &err))
        }
        // duration, base64Binary and unannotated columns stay textual.
        _ => Ok(FluxValue::String(raw.to_string())),
    }
}

fn invalid_cell(datatype: &str, raw: &str, err: &dyn std::fmt::Display) -> BackendError {
    BackendError::Decode(format!("cannot read {raw:?} as {datatype}: {err}"))
}
