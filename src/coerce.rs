//! Lenient extraction of timestamps and bytes from record fields.
//!
//! Every helper comes in two flavours: `try_*` reports why a value could not be
//! read, `get_*` coalesces any failure to a caller supplied default (or `None`).

use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, ParseError, Utc};
use thiserror::Error;

use crate::{
    logging::nestrow_log,
    record::{DataType, Field, LogicalType, Record, Value},
};

/// Days from 0001-01-01 (day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Debug, Error)]
pub enum CoerceError {
    #[error("no such field: {0}")]
    NoSuchField(String),
    #[error("field {0} is null")]
    NullValue(String),
    #[error("field {field} of type {data_type} can not be read as {target}")]
    Unsupported {
        field: String,
        data_type: String,
        target: &'static str,
    },
    #[error("field {field} is declared {declared} but holds {actual}")]
    UnexpectedValue {
        field: String,
        declared: String,
        actual: &'static str,
    },
    #[error("invalid timestamp {value:?} in field {field}: {source}")]
    Parse {
        field: String,
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("value {value} of field {field} is out of range for a timestamp")]
    OutOfRange { field: String, value: i64 },
    #[error("invalid base64 in field {field}: {source}")]
    Base64 {
        field: String,
        #[source]
        source: base64::DecodeError,
    },
}

/// Reads the named field as an instant.
///
/// `DATETIME` and date/timestamp logical values are returned as they are (a date at
/// UTC midnight), `STRING` is parsed as ISO-8601, `INT32` counts days since
/// 1970-01-01 and `INT64` counts milliseconds since the Unix epoch. Any other type
/// is [`CoerceError::Unsupported`].
pub fn try_timestamp(record: &Record, name: &str) -> Result<DateTime<Utc>, CoerceError> {
    let (field, value) = lookup(record, name)?;
    match field.data_type() {
        DataType::DateTime => match value {
            Value::DateTime(ts) => Ok(*ts),
            _ => Err(unexpected(field, value)),
        },
        DataType::Logical(logical) if logical.is_date() || logical.is_timestamp() => match value {
            Value::DateTime(ts) => Ok(*ts),
            Value::Date(date) => Ok(midnight(*date)),
            Value::Int32(days) => from_epoch_day(field, *days),
            _ => Err(unexpected(field, value)),
        },
        DataType::String => match value {
            Value::String(s) => parse_instant(s).map_err(|source| CoerceError::Parse {
                field: field.name().to_string(),
                value: s.clone(),
                source,
            }),
            _ => Err(unexpected(field, value)),
        },
        DataType::Int32 => match value {
            Value::Int32(days) => from_epoch_day(field, *days),
            _ => Err(unexpected(field, value)),
        },
        DataType::Int64 => match value {
            Value::Int64(millis) => {
                DateTime::from_timestamp_millis(*millis).ok_or_else(|| CoerceError::OutOfRange {
                    field: field.name().to_string(),
                    value: *millis,
                })
            }
            _ => Err(unexpected(field, value)),
        },
        other => Err(CoerceError::Unsupported {
            field: field.name().to_string(),
            data_type: other.to_string(),
            target: "timestamp",
        }),
    }
}

/// [`try_timestamp`], falling back to `default` when the field is absent, null, of
/// an unsupported type or not parseable.
pub fn get_timestamp(record: &Record, name: &str, default: DateTime<Utc>) -> DateTime<Utc> {
    try_timestamp(record, name).unwrap_or_else(|err| {
        nestrow_log!(
            log::Level::Debug,
            "coerce_fallback",
            "field={} target=timestamp reason={}",
            name,
            err
        );
        default
    })
}

/// Reads the named field as bytes: `STRING` values are base64 decoded, `BYTES`
/// values are copied.
pub fn try_bytes(record: &Record, name: &str) -> Result<Vec<u8>, CoerceError> {
    let (field, value) = lookup(record, name)?;
    match (field.data_type(), value) {
        (DataType::String, Value::String(s)) => base64::engine::general_purpose::STANDARD
            .decode(s)
            .map_err(|source| CoerceError::Base64 {
                field: field.name().to_string(),
                source,
            }),
        (DataType::Bytes, Value::Bytes(bytes)) => Ok(bytes.clone()),
        (DataType::String | DataType::Bytes, _) => Err(unexpected(field, value)),
        (other, _) => Err(CoerceError::Unsupported {
            field: field.name().to_string(),
            data_type: other.to_string(),
            target: "bytes",
        }),
    }
}

/// [`try_bytes`] on an optional record, `None` on any failure.
pub fn get_bytes<'a>(record: impl Into<Option<&'a Record>>, name: &str) -> Option<Vec<u8>> {
    let record = record.into()?;
    match try_bytes(record, name) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            nestrow_log!(
                log::Level::Debug,
                "coerce_fallback",
                "field={} target=bytes reason={}",
                name,
                err
            );
            None
        }
    }
}

/// Display string of the named field, `None` when absent or null.
pub fn get_as_string(record: &Record, name: &str) -> Option<String> {
    record
        .get(name)
        .filter(|value| !value.is_null())
        .map(Value::to_string)
}

pub fn is_logical_type_date(data_type: &DataType) -> bool {
    data_type.logical_type().is_some_and(LogicalType::is_date)
}

pub fn is_logical_type_time(data_type: &DataType) -> bool {
    data_type.logical_type().is_some_and(LogicalType::is_time)
}

pub fn is_logical_type_timestamp(data_type: &DataType) -> bool {
    data_type
        .logical_type()
        .is_some_and(LogicalType::is_timestamp)
}

/// Formats a date-like logical value as `yyyy-MM-dd`.
///
/// Applies to date logical types and to logical types over `DATETIME` taking a
/// `STRING` argument; every other combination yields `None`.
pub fn format_logical_value(data_type: &DataType, value: &Value) -> Option<String> {
    let logical = data_type.logical_type()?;
    let string_argument = matches!(
        (logical.base_type(), logical.argument_type()),
        (DataType::DateTime, Some(DataType::String))
    );
    if !string_argument && !logical.is_date() {
        return None;
    }
    match value {
        Value::DateTime(ts) => Some(ts.format("%Y-%m-%d").to_string()),
        Value::Date(date) if logical.is_date() => Some(date.format("%Y-%m-%d").to_string()),
        _ => None,
    }
}

fn lookup<'r>(record: &'r Record, name: &str) -> Result<(&'r Field, &'r Value), CoerceError> {
    let field = record
        .schema()
        .field(name)
        .ok_or_else(|| CoerceError::NoSuchField(name.to_string()))?;
    match record.get(name) {
        Some(value) if !value.is_null() => Ok((field, value)),
        _ => Err(CoerceError::NullValue(name.to_string())),
    }
}

fn unexpected(field: &Field, value: &Value) -> CoerceError {
    CoerceError::UnexpectedValue {
        field: field.name().to_string(),
        declared: field.data_type().to_string(),
        actual: value.type_name(),
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn from_epoch_day(field: &Field, days: i32) -> Result<DateTime<Utc>, CoerceError> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(midnight)
        .ok_or_else(|| CoerceError::OutOfRange {
            field: field.name().to_string(),
            value: days.into(),
        })
}

/// Parses an ISO-8601 instant. Zone-less date-times are read as UTC and plain
/// dates as UTC midnight.
fn parse_instant(s: &str) -> Result<DateTime<Utc>, ParseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .or_else(|err| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|ts| ts.and_utc())
                .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d").map(midnight))
                .map_err(|_| err)
        })
}
