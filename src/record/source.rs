//! Shapes a caller may pass as the records of an insert or an update.

use super::{Element, Record};

/// Records to marshal, normalized to an ordered list of references
pub enum RecordSource<'a, R> {
    Single(&'a R),
    Collection(Vec<&'a R>),
}

impl<'a, R> RecordSource<'a, R> {
    /// The records in caller order
    pub fn records(&self) -> Vec<&'a R> {
        match self {
            RecordSource::Single(record) => vec![*record],
            RecordSource::Collection(records) => records.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecordSource::Single(_) => 1,
            RecordSource::Collection(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Conversion into a [`RecordSource`]
///
/// Implemented for a single record (`&R`, `&Box<R>`), for borrowed
/// collections of records or boxed records (`&[E]`, `&[E; N]`, `&Vec<E>`), and
/// for an owned list of references (`Vec<&R>`).
///
/// ```no_run
/// use tagsql::{Context, Record};
///
/// #[derive(Default, Record)]
/// struct Sample {
///     #[column("n")]
///     n: i64,
/// }
///
/// fn insert(ctx: &Context<'_>, samples: &[Box<Sample>]) -> Result<u64, tagsql::Error> {
///     ctx.insert("samples", &["n"], samples).exec()
/// }
/// ```
///
/// Primitive values are not records:
///
/// ```compile_fail
/// use tagsql::Context;
///
/// fn insert(ctx: &Context<'_>) -> Result<u64, tagsql::Error> {
///     ctx.insert("samples", &["n"], &[1i64, 2, 3]).exec()
/// }
/// ```
///
/// Nor are nested references:
///
/// ```compile_fail
/// use tagsql::{Context, Record};
///
/// #[derive(Default, Record)]
/// struct Sample {
///     #[column("n")]
///     n: i64,
/// }
///
/// fn insert(ctx: &Context<'_>, sample: &Sample) -> Result<u64, tagsql::Error> {
///     ctx.insert("samples", &["n"], &sample).exec()
/// }
/// ```
pub trait IntoRecords<'a> {
    type Record: Record;

    fn into_records(self) -> RecordSource<'a, Self::Record>;
}

impl<'a, E: Element> IntoRecords<'a> for &'a E {
    type Record = E::Record;

    fn into_records(self) -> RecordSource<'a, E::Record> {
        RecordSource::Single(self.as_record())
    }
}

impl<'a, E: Element> IntoRecords<'a> for &'a [E] {
    type Record = E::Record;

    fn into_records(self) -> RecordSource<'a, E::Record> {
        RecordSource::Collection(self.iter().map(Element::as_record).collect())
    }
}

impl<'a, E: Element, const N: usize> IntoRecords<'a> for &'a [E; N] {
    type Record = E::Record;

    fn into_records(self) -> RecordSource<'a, E::Record> {
        self.as_slice().into_records()
    }
}

impl<'a, E: Element> IntoRecords<'a> for &'a Vec<E> {
    type Record = E::Record;

    fn into_records(self) -> RecordSource<'a, E::Record> {
        self.as_slice().into_records()
    }
}

impl<'a, R: Record> IntoRecords<'a> for Vec<&'a R> {
    type Record = R;

    fn into_records(self) -> RecordSource<'a, R> {
        RecordSource::Collection(self)
    }
}
