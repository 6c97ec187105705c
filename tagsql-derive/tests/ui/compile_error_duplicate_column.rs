#![allow(dead_code)]
use tagsql::Record;
#[derive(Default, Record)]
struct Account {
    #[column("id")]
    id: i64,
    #[column("id")]
    legacy_id: i64,
}
fn main() {}
