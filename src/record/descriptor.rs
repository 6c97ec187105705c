//! Column -> field lookup for one annotation key.

use super::{Field, Record};
use indexmap::IndexMap;
use std::collections::HashSet;

/// The columns a record type exposes under one annotation key
///
/// Columns keep field declaration order. Fields without a name for the key are
/// not part of the descriptor.
pub struct Descriptor<R: Record> {
    key: String,
    columns: IndexMap<&'static str, &'static Field<R>>,
}

impl<R: Record> Descriptor<R> {
    pub fn of(key: &str) -> Self {
        let columns = R::fields()
            .iter()
            .filter_map(|field| field.column(key).map(|column| (column, field)))
            .collect();
        Descriptor {
            key: key.to_string(),
            columns,
        }
    }

    /// Annotation key this descriptor was built for
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn field(&self, column: &str) -> Option<&'static Field<R>> {
        self.columns.get(column).copied()
    }

    /// Column names in declaration order
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.keys().copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &'static Field<R>)> + '_ {
        self.columns.iter().map(|(column, field)| (*column, *field))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// All columns of `R` under `key` except the given ones, in declaration order
///
/// Handy for insert column lists that leave out generated columns.
pub fn columns_except<R: Record>(key: &str, excepts: &[&str]) -> Vec<&'static str> {
    let excluded: HashSet<&str> = excepts.iter().copied().collect();
    Descriptor::<R>::of(key)
        .columns()
        .filter(|column| !excluded.contains(column))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;

    #[derive(Debug, Default, Record)]
    struct User {
        #[column("id", db = "user_id")]
        id: i64,
        #[column("name", db = " ")]
        name: String,
        #[column("email", db = "mail")]
        email: String,
        #[column("created_at")]
        created_at: Option<chrono::NaiveDateTime>,
    }

    #[test]
    fn test_default_key_columns_in_declaration_order() {
        let descriptor = Descriptor::<User>::of("column");
        let columns: Vec<&str> = descriptor.columns().collect();
        assert_eq!(columns, vec!["id", "name", "email", "created_at"]);
        assert_eq!(descriptor.key(), "column");
    }

    #[test]
    fn test_custom_key_skips_blank_names() {
        let descriptor = Descriptor::<User>::of("db");
        let columns: Vec<&str> = descriptor.columns().collect();
        assert_eq!(columns, vec!["user_id", "mail"]);
        assert_eq!(descriptor.field("mail").map(|f| f.name()), Some("email"));
        assert!(descriptor.field("name").is_none());
    }

    #[test]
    fn test_unknown_key_is_empty() {
        let descriptor = Descriptor::<User>::of("json");
        assert!(descriptor.is_empty());
        assert_eq!(descriptor.len(), 0);
    }

    #[test]
    fn test_columns_except() {
        assert_eq!(
            columns_except::<User>("column", &["id", "created_at"]),
            vec!["name", "email"]
        );
        assert_eq!(columns_except::<User>("db", &[]), vec!["user_id", "mail"]);
        assert_eq!(
            columns_except::<User>("column", &["missing"]),
            vec!["id", "name", "email", "created_at"]
        );
    }
}
