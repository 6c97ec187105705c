//! Record types and the per-type field table.
//!
//! `#[derive(Record)]` generates the [`Record`] impl of a struct: a static table
//! of its annotated fields, each with its column names per annotation key and a
//! getter/setter pair. Everything else in the mapping layer is built from that
//! table through a [`Descriptor`].

mod descriptor;
mod marshal;
mod source;
mod unmarshal;

pub use descriptor::{columns_except, Descriptor};
pub use marshal::marshal;
pub use source::{IntoRecords, RecordSource};
pub use unmarshal::{unmarshal, ResultTarget};

use crate::value::{FieldKind, Value};

/// One annotated field of a record type
pub struct Field<R> {
    name: &'static str,
    type_name: &'static str,
    kind: FieldKind,
    tags: &'static [(&'static str, &'static str)],
    get: fn(&R) -> Value,
    set: fn(&mut R, Value),
}

impl<R> Field<R> {
    #[doc(hidden)]
    pub fn new(
        name: &'static str,
        type_name: &'static str,
        kind: FieldKind,
        tags: &'static [(&'static str, &'static str)],
        get: fn(&R) -> Value,
        set: fn(&mut R, Value),
    ) -> Self {
        Field {
            name,
            type_name,
            kind,
            tags,
            get,
            set,
        }
    }

    /// Rust name of the field
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type as written in the struct
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Column name declared under `key`, if any
    pub fn column(&self, key: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, column)| *column)
    }

    /// Read the field as a positional parameter
    pub fn get(&self, record: &R) -> Value {
        (self.get)(record)
    }

    /// Write an already-coerced value into the field
    pub fn set(&self, record: &mut R, value: Value) {
        (self.set)(record, value)
    }
}

/// A struct whose fields map to result columns
///
/// Implemented by `#[derive(Record)]`; the field table is built once per type.
pub trait Record: Default + Sized + 'static {
    fn fields() -> &'static [Field<Self>];
}

/// A record held by value or boxed: the element shapes accepted by record
/// sources and result collections
pub trait Element: Sized {
    type Record: Record;

    fn from_record(record: Self::Record) -> Self;

    fn as_record(&self) -> &Self::Record;
}
