#![allow(dead_code)]
use tagsql::Record;
#[derive(Default, Record)]
struct Account {
    #[column]
    id: i64,
}
fn main() {}
