use super::{Descriptor, Element, Record};
use crate::error::Error;
use crate::value::{coerce, Value};

/// Where decoded rows go
///
/// A bare record (or `Option` of a record) is replaced by every row, so it ends
/// up holding the last one. A `Vec` collects every row in result order, holding
/// records by value or boxed.
///
/// ```no_run
/// use tagsql::{params, Context, Record};
///
/// #[derive(Default, Record)]
/// struct Total {
///     #[column("total")]
///     total: i64,
/// }
///
/// fn count(ctx: &Context<'_>) -> Result<(), tagsql::Error> {
///     let mut rows: Vec<Box<Total>> = Vec::new();
///     ctx.search("select count(*) as total from users", params![])
///         .fetch(&mut rows)
/// }
/// ```
///
/// Primitives are not targets:
///
/// ```compile_fail
/// use tagsql::{params, Context};
///
/// fn count(ctx: &Context<'_>) -> Result<(), tagsql::Error> {
///     let mut total: i64 = 0;
///     ctx.search("select count(*) as total from users", params![])
///         .fetch(&mut total)
/// }
/// ```
///
/// Neither are nested collections:
///
/// ```compile_fail
/// use tagsql::{params, Context, Record};
///
/// #[derive(Default, Record)]
/// struct Total {
///     #[column("total")]
///     total: i64,
/// }
///
/// fn count(ctx: &Context<'_>) -> Result<(), tagsql::Error> {
///     let mut rows: Vec<Vec<Total>> = Vec::new();
///     ctx.search("select count(*) as total from users", params![])
///         .fetch(&mut rows)
/// }
/// ```
pub trait ResultTarget {
    type Record: Record;

    fn commit(&mut self, record: Self::Record);
}

impl<R: Record> ResultTarget for R {
    type Record = R;

    fn commit(&mut self, record: R) {
        *self = record;
    }
}

impl<E: Element> ResultTarget for Option<E> {
    type Record = E::Record;

    fn commit(&mut self, record: E::Record) {
        *self = Some(E::from_record(record));
    }
}

impl<E: Element> ResultTarget for Vec<E> {
    type Record = E::Record;

    fn commit(&mut self, record: E::Record) {
        self.push(E::from_record(record));
    }
}

/// Decode one result row into `target`
///
/// A fresh default record is populated from the row: columns with no field
/// under the descriptor's key are ignored, and null values leave the field at
/// its default. The record is then committed into the target.
pub fn unmarshal<T: ResultTarget>(
    columns: &[String],
    raw: Vec<Value>,
    descriptor: &Descriptor<T::Record>,
    target: &mut T,
) -> Result<(), Error> {
    if columns.len() != raw.len() {
        return Err(Error::RowShape {
            columns: columns.len(),
            values: raw.len(),
        });
    }

    let mut record = T::Record::default();
    for (column, value) in columns.iter().zip(raw) {
        if value.is_null() {
            continue;
        }
        let Some(field) = descriptor.field(column) else {
            continue;
        };
        if let Some(value) = coerce(field.kind(), column, field.type_name(), value)? {
            field.set(&mut record, value);
        }
    }

    target.commit(record);
    Ok(())
}
