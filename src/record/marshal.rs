use super::{Descriptor, Record};
use crate::error::Error;
use crate::value::Value;

/// Flatten records into positional parameters
///
/// Produces one value per (record, column), record-major: for records `[a, b]`
/// and columns `[x, y]` the result is `[a.x, a.y, b.x, b.y]`. Every column must
/// be mapped under the descriptor's key.
pub fn marshal<R: Record>(
    columns: &[&str],
    descriptor: &Descriptor<R>,
    records: &[&R],
) -> Result<Vec<Value>, Error> {
    if records.is_empty() {
        return Err(Error::EmptyDataset);
    }

    let fields = columns
        .iter()
        .map(|column| {
            descriptor
                .field(column)
                .ok_or_else(|| Error::UnmappedColumn {
                    column: column.to_string(),
                    key: descriptor.key().to_string(),
                })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let mut params = Vec::with_capacity(records.len() * fields.len());
    for record in records {
        params.extend(fields.iter().map(|field| field.get(record)));
    }
    Ok(params)
}
