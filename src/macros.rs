/// Build a `Vec<Value>` of positional parameters
///
/// ```
/// use tagsql::{params, Value};
///
/// let params = params!["ada", 36, None::<i64>];
/// assert_eq!(params, vec![Value::from("ada"), Value::I32(36), Value::Null]);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}
