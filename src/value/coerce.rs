//! Coercion matrix: raw result value x declared field kind.
//!
//! `Ok(None)` means there is no conversion path and the field is left as it is.

use super::{FieldKind, Value};
use crate::error::Error;
use std::str::FromStr;

/// Convert a raw result value into the canonical value for a field kind
///
/// The returned value is one of `Text`, `Bytes`, `I64`, `U64`, `F64` or
/// `Timestamp`, ready for [`FieldValue::from_value`](super::FieldValue::from_value).
pub(crate) fn coerce(
    kind: FieldKind,
    column: &str,
    type_name: &'static str,
    raw: Value,
) -> Result<Option<Value>, Error> {
    if raw.is_null() {
        return Ok(None);
    }

    match kind {
        FieldKind::Text => match raw {
            Value::Text(s) => Ok(Some(Value::Text(s))),
            Value::Bytes(b) => String::from_utf8(b)
                .map(|s| Some(Value::Text(s)))
                .map_err(|e| conversion(column, type_name, e)),
            other => Err(mismatch(column, type_name, &other)),
        },
        FieldKind::Bytes => match raw {
            Value::Bytes(b) => Ok(Some(Value::Bytes(b))),
            Value::Text(s) => Ok(Some(Value::Bytes(s.into_bytes()))),
            other => Err(mismatch(column, type_name, &other)),
        },
        FieldKind::Signed => Ok(match raw {
            Value::I8(v) => Some(Value::I64(v as i64)),
            Value::I16(v) => Some(Value::I64(v as i64)),
            Value::I32(v) => Some(Value::I64(v as i64)),
            Value::I64(v) => Some(Value::I64(v)),
            Value::U8(v) => Some(Value::I64(v as i64)),
            Value::U16(v) => Some(Value::I64(v as i64)),
            Value::U32(v) => Some(Value::I64(v as i64)),
            Value::U64(v) => Some(Value::I64(v as i64)),
            Value::Text(_) | Value::Bytes(_) => {
                Some(Value::I64(parse::<i64>(column, type_name, &raw)?))
            }
            _ => None,
        }),
        FieldKind::Unsigned => Ok(match raw {
            Value::I8(v) => Some(Value::U64(v as u64)),
            Value::I16(v) => Some(Value::U64(v as u64)),
            Value::I32(v) => Some(Value::U64(v as u64)),
            Value::I64(v) => Some(Value::U64(v as u64)),
            Value::U8(v) => Some(Value::U64(v as u64)),
            Value::U16(v) => Some(Value::U64(v as u64)),
            Value::U32(v) => Some(Value::U64(v as u64)),
            Value::U64(v) => Some(Value::U64(v)),
            Value::Text(_) | Value::Bytes(_) => {
                Some(Value::U64(parse::<u64>(column, type_name, &raw)?))
            }
            _ => None,
        }),
        FieldKind::Float => Ok(match raw {
            Value::F32(v) => Some(Value::F64(v as f64)),
            Value::F64(v) => Some(Value::F64(v)),
            Value::Text(_) | Value::Bytes(_) => {
                Some(Value::F64(parse::<f64>(column, type_name, &raw)?))
            }
            _ => None,
        }),
        FieldKind::Temporal => match raw {
            Value::Timestamp(t) => Ok(Some(Value::Timestamp(t))),
            other => Err(mismatch(column, type_name, &other)),
        },
        FieldKind::Opaque => Ok(None),
    }
}

fn parse<T>(column: &str, type_name: &'static str, raw: &Value) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let text = match raw {
        Value::Text(s) => s.as_str(),
        Value::Bytes(b) => std::str::from_utf8(b).map_err(|e| conversion(column, type_name, e))?,
        other => return Err(mismatch(column, type_name, other)),
    };
    text.parse::<T>()
        .map_err(|e| conversion(column, type_name, e))
}

fn mismatch(column: &str, type_name: &'static str, raw: &Value) -> Error {
    Error::TypeMismatch {
        column: column.to_string(),
        expected: type_name,
        actual: raw.type_name(),
    }
}

fn conversion(column: &str, type_name: &'static str, reason: impl std::fmt::Display) -> Error {
    Error::Conversion {
        column: column.to_string(),
        target: type_name,
        reason: reason.to_string(),
    }
}
