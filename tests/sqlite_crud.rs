//! End-to-end statements against the bundled SQLite provider

use chrono::NaiveDate;
use tagsql::{
    columns_except, params, Database, DatasourceConfig, Descriptor, Error, Record, SqlitePool,
    Stage, Value,
};

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct User {
    #[column("id")]
    id: i64,
    #[column("name")]
    name: String,
    #[column("age")]
    age: i32,
    #[column("email")]
    email: Option<String>,
    #[column("created")]
    created: Option<chrono::NaiveDateTime>,
    // not mapped
    visits: u32,
}

const SCHEMA: &str = "create table users (
    id integer primary key autoincrement,
    name text not null,
    age integer not null,
    email text,
    created datetime
)";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn memory_database() -> Database {
    init_logger();
    let pool = SqlitePool::open(DatasourceConfig::new("main", ":memory:")).unwrap();
    {
        let conn = pool.checkout().unwrap();
        conn.get().unwrap().execute_batch(SCHEMA).unwrap();
    }
    Database::builder().register("main", pool).build()
}

fn user(name: &str, age: i32) -> User {
    User {
        name: name.to_string(),
        age,
        ..Default::default()
    }
}

#[test]
fn test_insert_select_update_delete() {
    let db = memory_database();
    let ctx = db.context().unwrap();
    let columns = ["name", "age", "email"];

    let users = vec![user("ada", 36), user("bob", 25), user("cy", 41)];
    let inserted = ctx.insert("users", &columns, &users).exec().unwrap();
    assert_eq!(inserted, 3);

    let adults: Vec<User> = ctx
        .select("users", &[], "age > ?", params![30])
        .order_by_desc("age")
        .limit(0, 10)
        .fetch_all()
        .unwrap();
    let names: Vec<_> = adults.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["cy", "ada"]);
    assert!(adults.iter().all(|u| u.id > 0 && u.visits == 0));

    let mut ada = adults[1].clone();
    ada.age = 37;
    ada.email = Some("ada@example.com".to_string());
    let updated = ctx
        .update("users", &["age", "email"], "id = ?")
        .params_from(&ada, &["id"])
        .exec()
        .unwrap();
    assert_eq!(updated, 1);

    let reloaded: Option<User> = ctx
        .select("users", &[], "id = ?", params![ada.id])
        .fetch_one()
        .unwrap();
    assert_eq!(reloaded.as_ref(), Some(&ada));

    let deleted = ctx
        .delete("users", "age < ?")
        .params(params![30])
        .exec()
        .unwrap();
    assert_eq!(deleted, 1);

    let remaining: Vec<User> = ctx.search("select * from users", params![]).fetch_all().unwrap();
    assert_eq!(remaining.len(), 2);
}

#[test]
fn test_last_insert_id() {
    let db = memory_database();
    let ctx = db.context().unwrap();

    let first = ctx
        .insert("users", &["name", "age"], &user("ada", 36))
        .last_insert_id()
        .exec()
        .unwrap();
    let second = ctx
        .insert("users", &["name", "age"], &user("bob", 25))
        .last_insert_id()
        .exec()
        .unwrap();
    assert_eq!(second, first + 1);
}

#[test]
fn test_insert_nothing_skips_database() {
    let db = memory_database();
    let ctx = db.context().unwrap();

    let none: Vec<User> = Vec::new();
    let insert = ctx.insert("users", &["name", "age"], &none);
    assert_eq!(insert.desc(), ("", &[][..]));
    assert_eq!(insert.exec().unwrap(), 0);
}

#[test]
fn test_round_trip_through_descriptor() {
    let db = memory_database();
    let ctx = db.context().unwrap();

    let created = NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_milli_opt(8, 30, 15, 250)
        .unwrap();
    let original = User {
        email: Some("ada@example.com".to_string()),
        created: Some(created),
        ..user("ada", 36)
    };
    let columns = columns_except::<User>("column", &["id"]);
    ctx.insert("users", &columns, &original).exec().unwrap();

    let fetched: User = ctx
        .select("users", &columns, "", params![])
        .fetch_one()
        .unwrap()
        .unwrap();
    assert_eq!(fetched.created, Some(created));

    let descriptor = Descriptor::<User>::of("column");
    let from_original: Vec<Value> = columns
        .iter()
        .map(|c| descriptor.field(c).unwrap().get(&original))
        .collect();
    let from_fetched: Vec<Value> = columns
        .iter()
        .map(|c| descriptor.field(c).unwrap().get(&fetched))
        .collect();
    assert_eq!(from_original, from_fetched);
}

#[test]
fn test_fetch_into_boxed_and_existing_targets() {
    let db = memory_database();
    let ctx = db.context().unwrap();
    let batch = [user("ada", 36), user("bob", 25)];
    ctx.insert("users", &["name", "age"], &batch).exec().unwrap();

    let mut boxed: Vec<Box<User>> = vec![Box::new(user("seed", 1))];
    ctx.select("users", &["name", "age"], "", params![])
        .order_by_asc("name")
        .fetch(&mut boxed)
        .unwrap();
    let names: Vec<_> = boxed.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["seed", "ada", "bob"]);

    // A bare record keeps the last row.
    let mut last = User::default();
    ctx.select("users", &["name"], "", params![])
        .order_by_asc("name")
        .fetch(&mut last)
        .unwrap();
    assert_eq!(last.name, "bob");

    let missing: Option<User> = ctx
        .select("users", &[], "name = ?", params!["nobody"])
        .fetch_one()
        .unwrap();
    assert!(missing.is_none());
}

#[test]
fn test_group_by_and_pagination() {
    let db = memory_database();
    let ctx = db.context().unwrap();
    let batch = vec![
        user("ada", 30),
        user("bob", 30),
        user("cy", 40),
        user("dee", 50),
    ];
    let refs: Vec<&User> = batch.iter().collect();
    ctx.insert("users", &["name", "age"], refs).exec().unwrap();

    let ages: Vec<User> = ctx
        .select("users", &["age"], "", params![])
        .group_by(&["age"])
        .order_by_asc("age")
        .limit(1, 2)
        .fetch_all()
        .unwrap();
    let ages: Vec<_> = ages.iter().map(|u| u.age).collect();
    assert_eq!(ages, [40, 50]);
}

#[test]
fn test_stage_errors_surface_at_execution() {
    let db = memory_database();
    let ctx = db.context().unwrap();

    let select = ctx
        .select("users", &[], "", params![])
        .limit(0, 1)
        .order_by_asc("age");
    assert_eq!(select.stage(), Stage::Paginated);
    assert!(matches!(
        select.fetch_all::<User>(),
        Err(Error::IllegalStage { .. })
    ));

    let raw = ctx.search("select * from users", params![]).limit(0, 1);
    assert!(matches!(raw.fetch_all::<User>(), Err(Error::RawMode { .. })));

    let update = ctx.update("users", &["age"], "   ");
    assert!(matches!(
        update.exec(),
        Err(Error::MissingFilter { operation: "update" })
    ));
}

#[test]
fn test_text_into_integer_field_fails_conversion() {
    let db = memory_database();
    let ctx = db.context().unwrap();
    ctx.insert("users", &["name", "age"], &user("ada", 36))
        .exec()
        .unwrap();

    #[derive(Debug, Default, Record)]
    struct Wrong {
        #[column("name")]
        name: i64,
    }

    let result = ctx.select("users", &["name"], "", params![]).fetch_all::<Wrong>();
    assert!(matches!(result, Err(Error::Conversion { .. })));
}

#[test]
fn test_transaction_commit() {
    let db = memory_database();
    let ctx = db.context().unwrap();

    let tx = ctx.begin().unwrap();
    tx.insert("users", &["name", "age"], &user("ada", 36))
        .exec()
        .unwrap();
    let inside: Vec<User> = tx.select("users", &[], "", params![]).fetch_all().unwrap();
    assert_eq!(inside.len(), 1);
    tx.commit().unwrap();

    let after: Vec<User> = ctx.select("users", &[], "", params![]).fetch_all().unwrap();
    assert_eq!(after.len(), 1);
}

#[test]
fn test_transaction_rollback_and_drop() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tx.db");
    let path = path.to_str().unwrap();

    let pool = SqlitePool::open(DatasourceConfig::new("main", path).max_connections(2)).unwrap();
    {
        let conn = pool.checkout().unwrap();
        conn.get().unwrap().execute_batch(SCHEMA).unwrap();
    }
    let db = Database::builder().register("main", pool).build();
    let ctx = db.context().unwrap();

    let tx = ctx.begin().unwrap();
    tx.insert("users", &["name", "age"], &user("ada", 36))
        .exec()
        .unwrap();
    tx.rollback().unwrap();

    {
        let tx = ctx.begin().unwrap();
        tx.insert("users", &["name", "age"], &user("bob", 25))
            .exec()
            .unwrap();
    }

    let rows: Vec<User> = ctx.select("users", &[], "", params![]).fetch_all().unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_named_datasources() {
    init_logger();
    let main = SqlitePool::open(DatasourceConfig::new("main", ":memory:")).unwrap();
    let audit = SqlitePool::open(DatasourceConfig::new("audit", ":memory:")).unwrap();
    for pool in [&main, &audit] {
        let conn = pool.checkout().unwrap();
        conn.get().unwrap().execute_batch(SCHEMA).unwrap();
    }
    let db = Database::builder()
        .register("main", main)
        .register("audit", audit)
        .build();

    db.context_of("audit")
        .unwrap()
        .insert("users", &["name", "age"], &user("ada", 36))
        .exec()
        .unwrap();

    let in_main: Vec<User> = db
        .context()
        .unwrap()
        .select("users", &[], "", params![])
        .fetch_all()
        .unwrap();
    assert!(in_main.is_empty());

    assert!(matches!(
        db.context_of("missing"),
        Err(Error::InvalidDatasource(name)) if name == "missing"
    ));
}

#[test]
fn test_statement_outside_open_transaction_times_out() {
    init_logger();
    let config = DatasourceConfig::new("main", ":memory:").pool_timeout_seconds(1);
    let pool = SqlitePool::open(config).unwrap();
    {
        let conn = pool.checkout().unwrap();
        conn.get().unwrap().execute_batch(SCHEMA).unwrap();
    }
    let db = Database::builder().register("main", pool).build();
    let ctx = db.context().unwrap();

    let tx = ctx.begin().unwrap();
    let blocked = ctx.select("users", &[], "", params![]).fetch_all::<User>();
    assert!(matches!(blocked, Err(Error::Pool(_))));

    tx.commit().unwrap();
    let rows: Vec<User> = ctx.select("users", &[], "", params![]).fetch_all().unwrap();
    assert!(rows.is_empty());
}
