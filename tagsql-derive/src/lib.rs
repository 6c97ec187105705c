//! Procedural macros for tagsql
//!
//! This crate provides the `Record` derive, which turns column annotations on
//! struct fields into the static field table consumed by `tagsql::Descriptor`.

mod attributes;
mod record;

use proc_macro::TokenStream;

/// Derive macro for `Record` - generates the column annotation table of a struct
///
/// Every field carrying a `#[column(...)]` attribute becomes a mapped field; all
/// other fields are ignored by marshaling and unmarshaling.
///
/// Annotation forms:
///
/// - `#[column("id")]` or `#[column = "id"]` maps the field under the default key `column`
/// - `#[column(db = "user_id")]` maps the field under the key `db`
/// - `#[column("id", db = "user_id")]` maps the field under both keys
///
/// An empty or whitespace-only name leaves the field unmapped for that key.
///
/// This macro generates:
/// - `Record` implementation (lazily built field table with getter/setter pairs)
/// - `Element` implementations for the struct and for `Box` of the struct, so both
///   can be used as collection items when inserting or fetching
///
/// # Example
///
/// ```ignore
/// use tagsql::Record;
///
/// #[derive(Record, Default)]
/// pub struct User {
///     #[column("id")]
///     pub id: i64,
///     #[column("name", db = "user_name")]
///     pub name: String,
///     pub cached: Vec<String>, // not mapped
/// }
/// ```
#[proc_macro_derive(Record, attributes(column))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input)
}
