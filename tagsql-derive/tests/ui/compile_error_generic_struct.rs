#![allow(dead_code)]
use tagsql::Record;
#[derive(Default, Record)]
struct Wrapper<T> {
    #[column("value")]
    value: T,
}
fn main() {}
