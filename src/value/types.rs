//! Field value types and their kinds.
//!
//! Every annotated record field must implement [`FieldValue`]. The associated
//! [`FieldKind`] selects the row of the coercion matrix used when a result value
//! is written back into that field.

use super::Value;
use chrono::{DateTime, NaiveDateTime, Utc};

/// Declared representation of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `String`
    Text,
    /// `Vec<u8>`
    Bytes,
    /// Signed integers of any width
    Signed,
    /// Unsigned integers of any width
    Unsigned,
    /// Floating point numbers of any width
    Float,
    /// Timestamps
    Temporal,
    /// Marshaled as parameters, never written from result rows
    Opaque,
}

/// A type that can live in an annotated record field
///
/// `to_value` produces the positional parameter for marshaling. `from_value`
/// receives a value that has already gone through the coercion matrix for
/// `KIND` (`Text`, `Bytes`, `I64`, `U64`, `F64` or `Timestamp`) and narrows it
/// to the field's own width.
pub trait FieldValue: Sized {
    const KIND: FieldKind;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Option<Self>;

    /// Overwrite `self` with a coerced value; values of the wrong shape leave it unchanged
    fn assign(&mut self, value: Value) {
        if let Some(v) = Self::from_value(value) {
            *self = v;
        }
    }
}

macro_rules! impl_signed {
    ($($type:ty),*) => {
        $(
            impl FieldValue for $type {
                const KIND: FieldKind = FieldKind::Signed;

                fn to_value(&self) -> Value {
                    Value::from(*self)
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::I64(v) => Some(v as $type),
                        _ => None,
                    }
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($type:ty),*) => {
        $(
            impl FieldValue for $type {
                const KIND: FieldKind = FieldKind::Unsigned;

                fn to_value(&self) -> Value {
                    Value::from(*self)
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::U64(v) => Some(v as $type),
                        _ => None,
                    }
                }
            }
        )*
    };
}

macro_rules! impl_float {
    ($($type:ty),*) => {
        $(
            impl FieldValue for $type {
                const KIND: FieldKind = FieldKind::Float;

                fn to_value(&self) -> Value {
                    Value::from(*self)
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::F64(v) => Some(v as $type),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);
impl_float!(f32, f64);

impl FieldValue for String {
    const KIND: FieldKind = FieldKind::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl FieldValue for Vec<u8> {
    const KIND: FieldKind = FieldKind::Bytes;

    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl FieldValue for NaiveDateTime {
    const KIND: FieldKind = FieldKind::Temporal;

    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Timestamp(t) => Some(t),
            _ => None,
        }
    }
}

impl FieldValue for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::Temporal;

    fn to_value(&self) -> Value {
        Value::Timestamp(self.naive_utc())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Timestamp(t) => Some(t.and_utc()),
            _ => None,
        }
    }
}

// No coercion path leads into bool; result columns mapped to bool fields are skipped.
impl FieldValue for bool {
    const KIND: FieldKind = FieldKind::Opaque;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, FieldValue::to_value)
    }

    fn from_value(value: Value) -> Option<Self> {
        T::from_value(value).map(Some)
    }
}
