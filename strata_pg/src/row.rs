//! Parameter binding and row normalization.

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::encode::{Encode, IsNull};
use sqlx::error::BoxDynError;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgArgumentBuffer, PgArguments, PgRow, PgTypeInfo, Postgres};
use sqlx::query::Query;
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use strata_core::{AdapterError, AdapterErrorKind, Dialect, Row, Value};

use crate::error::classify;

/// A NULL parameter with no declared type.
///
/// Sent with OID 0 so the server infers the type from the statement, the
/// same way an untyped literal `NULL` would be resolved.
struct UntypedNull;

impl sqlx::Type<Postgres> for UntypedNull {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_oid(Oid(0))
    }
}

impl Encode<'_, Postgres> for UntypedNull {
    fn encode_by_ref(&self, _buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        Ok(IsNull::Yes)
    }
}

/// Binds positional parameters in order.
pub(crate) fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [Value],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            Value::Null => query.bind(UntypedNull),
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

/// Whole numbers that fit in an `i64` become integers, matching what the
/// embedded dialect returns for `SUM` and `COUNT` style aggregates.
fn numeric_value(decimal: BigDecimal) -> Value {
    if decimal.is_integer() {
        if let Some(v) = decimal.to_i64() {
            return Value::Integer(v);
        }
    }
    match decimal.to_f64() {
        Some(v) if v.is_finite() => Value::Real(v),
        _ => Value::Text(decimal.to_string()),
    }
}

/// Converts a driver row into a [`Row`], decoding by the column's type.
///
/// Calendar dates and times of day come back as text, as they do from the
/// embedded dialect.
pub(crate) fn decode_row(row: &PgRow) -> Result<Row, AdapterError> {
    let mut out = Row::new();

    for (i, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(i).map_err(classify)?;
        if raw.is_null() {
            out.push(column.name(), Value::Null);
            continue;
        }

        let value = match column.type_info().name() {
            "INT2" => Value::Integer(i64::from(row.try_get::<i16, _>(i).map_err(classify)?)),
            "INT4" => Value::Integer(i64::from(row.try_get::<i32, _>(i).map_err(classify)?)),
            "INT8" => Value::Integer(row.try_get(i).map_err(classify)?),
            "OID" => Value::Integer(i64::from(row.try_get::<Oid, _>(i).map_err(classify)?.0)),
            "FLOAT4" => Value::Real(f64::from(row.try_get::<f32, _>(i).map_err(classify)?)),
            "FLOAT8" => Value::Real(row.try_get(i).map_err(classify)?),
            "NUMERIC" => numeric_value(row.try_get::<BigDecimal, _>(i).map_err(classify)?),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => Value::Text(row.try_get(i).map_err(classify)?),
            "BOOL" => Value::Bool(row.try_get(i).map_err(classify)?),
            "BYTEA" => Value::Bytes(row.try_get(i).map_err(classify)?),
            "DATE" => Value::Text(
                row.try_get::<NaiveDate, _>(i)
                    .map_err(classify)?
                    .format("%Y-%m-%d")
                    .to_string(),
            ),
            "TIME" => Value::Text(row.try_get::<NaiveTime, _>(i).map_err(classify)?.to_string()),
            "TIMESTAMPTZ" => {
                Value::Timestamp(row.try_get::<DateTime<Utc>, _>(i).map_err(classify)?)
            }
            "TIMESTAMP" => Value::Timestamp(
                row.try_get::<NaiveDateTime, _>(i)
                    .map_err(classify)?
                    .and_utc(),
            ),
            other => {
                return Err(AdapterError::new(
                    Dialect::Postgres,
                    AdapterErrorKind::Decode,
                    format!("column '{}' has unsupported type {other}", column.name()),
                ));
            }
        };
        out.push(column.name(), value);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn whole_numerics_become_integers() {
        let sum = BigDecimal::from_str("42").unwrap();
        assert_eq!(numeric_value(sum), Value::Integer(42));
    }

    #[test]
    fn fractional_numerics_become_reals() {
        let avg = BigDecimal::from_str("2.5").unwrap();
        assert_eq!(numeric_value(avg), Value::Real(2.5));
    }

    #[test]
    fn oversized_numerics_become_reals() {
        let big = BigDecimal::from_str("100000000000000000000").unwrap();
        assert_eq!(numeric_value(big), Value::Real(1e20));
    }
}
