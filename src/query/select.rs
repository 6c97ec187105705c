use super::{Scope, Stage, Statement};
use crate::error::Error;
use crate::record::{Element, ResultTarget};
use crate::value::Value;

/// Select builder
///
/// Starts from `select <columns> from <table> [where <filter>]` and accepts
/// refinements in stage order: [`group_by`](Self::group_by) once, then any
/// number of [`order_by_asc`](Self::order_by_asc) /
/// [`order_by_desc`](Self::order_by_desc), then [`limit`](Self::limit) once.
/// A refinement out of order records a construction error.
///
/// A select created from raw SQL (`search`) accepts no refinements at all.
pub struct Select<'h> {
    scope: Scope<'h>,
    sql: String,
    params: Vec<Value>,
    stage: Stage,
    ordered: bool,
    raw: bool,
    err: Option<Error>,
}

impl<'h> Select<'h> {
    pub(crate) fn new(
        scope: Scope<'h>,
        table: &str,
        columns: &[&str],
        filter: &str,
        params: Vec<Value>,
    ) -> Self {
        let columns = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(",")
        };
        let mut sql = format!("select {columns} from {table}");
        let filter = filter.trim();
        if !filter.is_empty() {
            sql.push_str(" where ");
            sql.push_str(filter);
        }
        Select {
            scope,
            sql,
            params,
            stage: Stage::Base,
            ordered: false,
            raw: false,
            err: None,
        }
    }

    pub(crate) fn raw(scope: Scope<'h>, sql: &str, params: Vec<Value>) -> Self {
        Select {
            scope,
            sql: sql.to_string(),
            params,
            stage: Stage::Base,
            ordered: false,
            raw: true,
            err: None,
        }
    }

    /// Check that a refinement may run; records the error otherwise
    fn admit(&mut self, operation: &'static str, allowed: bool) -> bool {
        if self.err.is_some() {
            return false;
        }
        if self.raw {
            self.err = Some(Error::RawMode { operation });
            return false;
        }
        if !allowed {
            self.err = Some(Error::IllegalStage {
                operation,
                stage: self.stage,
            });
            return false;
        }
        true
    }

    /// Append ` group by c1,c2`; only directly after the base select
    ///
    /// An empty column list still moves the builder to the grouped stage.
    pub fn group_by(mut self, columns: &[&str]) -> Self {
        let allowed = self.stage < Stage::Grouped;
        if self.admit("group_by", allowed) {
            self.stage = Stage::Grouped;
            if !columns.is_empty() {
                self.sql.push_str(" group by ");
                self.sql.push_str(&columns.join(","));
            }
        }
        self
    }

    pub fn order_by_asc(self, column: &str) -> Self {
        self.order_by("order_by_asc", column, "asc")
    }

    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by("order_by_desc", column, "desc")
    }

    fn order_by(mut self, operation: &'static str, column: &str, direction: &str) -> Self {
        let allowed = self.stage <= Stage::Ordered;
        if self.admit(operation, allowed) {
            self.stage = Stage::Ordered;
            if self.ordered {
                self.sql.push_str(", ");
            } else {
                self.sql.push_str(" order by ");
                self.ordered = true;
            }
            self.sql.push_str(column);
            self.sql.push(' ');
            self.sql.push_str(direction);
        }
        self
    }

    /// Append ` limit ?, ?` with `offset` and `size` as trailing parameters
    pub fn limit(mut self, offset: u64, size: u64) -> Self {
        let allowed = self.stage < Stage::Paginated;
        if self.admit("limit", allowed) {
            self.stage = Stage::Paginated;
            self.sql.push_str(" limit ?, ?");
            self.params.push(Value::U64(offset));
            self.params.push(Value::U64(size));
        }
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn error(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    pub fn desc(&self) -> (&str, &[Value]) {
        (&self.sql, &self.params)
    }

    pub fn build(self) -> Result<Statement<'h>, Error> {
        match self.err {
            Some(err) => Err(err),
            None => Ok(Statement::new(self.scope, self.sql, self.params)),
        }
    }

    /// Run the query and decode every row into `target`
    ///
    /// A bare record or `Option` target keeps the last row; a `Vec` target
    /// collects all rows in result order after its existing elements.
    pub fn fetch<T: ResultTarget>(self, target: &mut T) -> Result<(), Error> {
        self.build()?.query(target)?;
        Ok(())
    }

    /// Run the query and collect every row
    pub fn fetch_all<R: Element<Record = R>>(self) -> Result<Vec<R>, Error> {
        let mut rows: Vec<R> = Vec::new();
        self.fetch(&mut rows)?;
        Ok(rows)
    }

    /// Run the query and keep the last row, if there was one
    pub fn fetch_one<R: Element<Record = R>>(self) -> Result<Option<R>, Error> {
        let mut row: Option<R> = None;
        self.fetch(&mut row)?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Handle;
    use crate::testing::MockConnection;
    use crate::Record;

    #[derive(Debug, Default, Clone, PartialEq, Record)]
    struct User {
        #[column("id")]
        id: i64,
        #[column("name")]
        name: String,
        #[column("age")]
        age: u32,
    }

    fn scope(mock: &MockConnection) -> Scope<'_> {
        Scope {
            handle: Handle::Shared(mock),
            key: "column",
        }
    }

    fn bytes(s: &str) -> Value {
        Value::Bytes(s.as_bytes().to_vec())
    }

    #[test]
    fn test_select_with_order_and_limit() {
        let mock = MockConnection::new();
        let select = Select::new(scope(&mock), "users", &[], "age > ?", vec![Value::I32(30)])
            .order_by_desc("age")
            .limit(0, 10);
        let (sql, params) = select.desc();
        assert_eq!(
            sql,
            "select * from users where age > ? order by age desc limit ?, ?"
        );
        assert_eq!(params, &[Value::I32(30), Value::U64(0), Value::U64(10)]);
        assert_eq!(select.stage(), Stage::Paginated);
    }

    #[test]
    fn test_columns_and_no_filter() {
        let mock = MockConnection::new();
        let select = Select::new(scope(&mock), "users", &["id", "name"], "  ", vec![]);
        assert_eq!(select.desc().0, "select id,name from users");
    }

    #[test]
    fn test_repeated_ordering_is_comma_separated() {
        let mock = MockConnection::new();
        let select = Select::new(scope(&mock), "users", &[], "", vec![])
            .order_by_asc("name")
            .order_by_asc("id")
            .order_by_desc("age");
        assert_eq!(
            select.desc().0,
            "select * from users order by name asc, id asc, age desc"
        );
    }

    #[test]
    fn test_group_by() {
        let mock = MockConnection::new();
        let select = Select::new(scope(&mock), "users", &["age"], "", vec![])
            .group_by(&["age", "name"])
            .order_by_asc("age");
        assert_eq!(
            select.desc().0,
            "select age from users group by age,name order by age asc"
        );
    }

    #[test]
    fn test_empty_group_by_advances_stage() {
        let mock = MockConnection::new();
        let select = Select::new(scope(&mock), "users", &[], "", vec![]).group_by(&[]);
        assert_eq!(select.desc().0, "select * from users");
        assert_eq!(select.stage(), Stage::Grouped);
        let select = select.group_by(&["id"]);
        assert!(matches!(select.error(), Some(Error::IllegalStage { .. })));
    }

    #[test]
    fn test_group_by_twice_fails() {
        let mock = MockConnection::new();
        let select = Select::new(scope(&mock), "users", &[], "", vec![])
            .group_by(&["age"])
            .group_by(&["name"]);
        assert!(matches!(
            select.error(),
            Some(Error::IllegalStage {
                operation: "group_by",
                stage: Stage::Grouped
            })
        ));
    }

    #[test]
    fn test_ordering_after_limit_fails() {
        let mock = MockConnection::new();
        let select = Select::new(scope(&mock), "users", &[], "", vec![])
            .limit(0, 5)
            .order_by_asc("id");
        let err = select.error().unwrap();
        assert_eq!(err.to_string(), "can not use order_by_asc after limit");

        let err = select.fetch_all::<User>().unwrap_err();
        assert!(err.is_construction());
        assert_eq!(mock.prepare_count(), 0);
    }

    #[test]
    fn test_group_after_order_and_second_limit_fail() {
        let mock = MockConnection::new();
        let select = Select::new(scope(&mock), "users", &[], "", vec![])
            .order_by_asc("id")
            .group_by(&["id"]);
        assert!(select.error().is_some());

        let select = Select::new(scope(&mock), "users", &[], "", vec![])
            .limit(0, 5)
            .limit(5, 5);
        assert!(matches!(
            select.error(),
            Some(Error::IllegalStage { operation: "limit", .. })
        ));
        assert_eq!(select.desc().1.len(), 2);
        let message = select.error().map(ToString::to_string).unwrap_or_default();
        assert_eq!(message, "limit can only be applied once per select");
    }

    #[test]
    fn test_raw_mode_rejects_refinements() {
        let mock = MockConnection::new();
        for select in [
            Select::raw(scope(&mock), "select * from users", vec![]).group_by(&["id"]),
            Select::raw(scope(&mock), "select * from users", vec![]).order_by_asc("id"),
            Select::raw(scope(&mock), "select * from users", vec![]).order_by_desc("id"),
            Select::raw(scope(&mock), "select * from users", vec![]).limit(0, 1),
        ] {
            assert!(matches!(select.error(), Some(Error::RawMode { .. })));
            assert_eq!(select.desc().0, "select * from users");
        }
    }

    #[test]
    fn test_first_error_wins() {
        let mock = MockConnection::new();
        let select = Select::raw(scope(&mock), "select 1", vec![])
            .limit(0, 1)
            .group_by(&["x"]);
        assert!(matches!(
            select.error(),
            Some(Error::RawMode { operation: "limit" })
        ));
    }

    #[test]
    fn test_fetch_all_in_result_order() {
        let mock = MockConnection::new();
        mock.push_rows(
            &["id", "name", "age"],
            vec![
                vec![Value::I64(2), bytes("b"), bytes("20")],
                vec![Value::I64(1), bytes("a"), Value::Null],
            ],
        );
        let users = Select::new(scope(&mock), "users", &[], "", vec![])
            .fetch_all::<User>()
            .unwrap();
        assert_eq!(
            users,
            vec![
                User {
                    id: 2,
                    name: "b".to_string(),
                    age: 20
                },
                User {
                    id: 1,
                    name: "a".to_string(),
                    age: 0
                },
            ]
        );
        assert_eq!(mock.prepare_count(), 1);
    }

    #[test]
    fn test_fetch_into_existing_collection_appends() {
        let mock = MockConnection::new();
        mock.push_rows(&["id"], vec![vec![Value::I64(3)]]);
        let mut users = vec![Box::new(User {
            id: 1,
            ..Default::default()
        })];
        Select::new(scope(&mock), "users", &["id"], "", vec![])
            .fetch(&mut users)
            .unwrap();
        assert_eq!(users.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_fetch_one_keeps_last_row() {
        let mock = MockConnection::new();
        mock.push_rows(&["id"], vec![vec![Value::I64(1)], vec![Value::I64(2)]]);
        let user = Select::new(scope(&mock), "users", &[], "", vec![])
            .fetch_one::<User>()
            .unwrap();
        assert_eq!(user.map(|u| u.id), Some(2));

        mock.push_rows(&["id"], vec![]);
        let user = Select::new(scope(&mock), "users", &[], "", vec![])
            .fetch_one::<User>()
            .unwrap();
        assert!(user.is_none());
    }

    #[test]
    fn test_coercion_error_keeps_earlier_rows() {
        let mock = MockConnection::new();
        mock.push_rows(
            &["id", "name"],
            vec![
                vec![Value::I64(1), bytes("ok")],
                vec![Value::I64(2), Value::I64(99)],
                vec![Value::I64(3), bytes("never")],
            ],
        );
        let mut users: Vec<User> = Vec::new();
        let err = Select::new(scope(&mock), "users", &[], "", vec![])
            .fetch(&mut users)
            .unwrap_err();
        assert!(err.is_coercion());
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "ok");
    }

    #[test]
    fn test_prepare_failure_is_returned_unchanged() {
        let mock = MockConnection::new();
        mock.fail_prepare("no such table: users");
        let err = Select::new(scope(&mock), "users", &[], "", vec![])
            .fetch_all::<User>()
            .unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
        assert!(err.to_string().contains("no such table"));
    }

    #[test]
    fn test_search_params_pass_through() {
        let mock = MockConnection::new();
        mock.push_rows(&["id"], vec![vec![Value::I64(1)]]);
        let users = Select::raw(
            scope(&mock),
            "select id from users where name = ?",
            vec![Value::from("a")],
        )
        .fetch_all::<User>()
        .unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(
            mock.executed(),
            vec![(
                "select id from users where name = ?".to_string(),
                vec![Value::Text("a".to_string())]
            )]
        );
    }
}
