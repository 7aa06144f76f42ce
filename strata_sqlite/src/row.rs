//! Parameter binding and row normalization.

use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use strata_core::{AdapterError, AdapterErrorKind, Dialect, Row, Value};

use crate::error::classify;

/// Binds positional parameters in order.
pub(crate) fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [Value],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<String>),
            Value::Integer(v) => query.bind(*v),
            Value::Real(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
            Value::Bool(v) => query.bind(*v),
            Value::Timestamp(v) => query.bind(*v),
            Value::Bytes(v) => query.bind(v.as_slice()),
        };
    }
    query
}

/// Converts a driver row into a [`Row`].
///
/// SQLite is dynamically typed, so each value is decoded by its runtime
/// storage class rather than the declared column type. Booleans therefore
/// come back as integers and timestamps as text.
pub(crate) fn decode_row(row: &SqliteRow) -> Result<Row, AdapterError> {
    let mut out = Row::new();

    for (i, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(i).map_err(classify)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let type_name = raw.type_info().name().to_ascii_uppercase();
            match type_name.as_str() {
                "INTEGER" | "BOOLEAN" => Value::Integer(row.try_get(i).map_err(classify)?),
                "REAL" => Value::Real(row.try_get(i).map_err(classify)?),
                "TEXT" | "DATETIME" | "DATE" | "TIME" => {
                    Value::Text(row.try_get(i).map_err(classify)?)
                }
                "BLOB" => Value::Bytes(row.try_get(i).map_err(classify)?),
                other => {
                    return Err(AdapterError::new(
                        Dialect::Sqlite,
                        AdapterErrorKind::Decode,
                        format!("column '{}' has unsupported storage class {other}", column.name()),
                    ));
                }
            }
        };
        out.push(column.name(), value);
    }

    Ok(out)
}
