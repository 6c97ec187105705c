#![allow(dead_code)]
use tagsql::Record;
#[derive(Default, Record)]
struct Account {
    #[column(db = "id", db = "account_id")]
    id: i64,
}
fn main() {}
