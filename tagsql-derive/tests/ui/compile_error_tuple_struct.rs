#![allow(dead_code)]
use tagsql::Record;
#[derive(Default, Record)]
struct Pair(i64, String);
fn main() {}
