//! Path and query parameter encoding.
//!
//! - [`PathParameters`] fill `{name}` placeholders of an operation
//! - [`QueryParameters`] render the `name=value&...` query string
//! - [`compose_url`] combines both into the relative URL of a call

mod path;
mod query;

pub use path::PathParameters;
pub use query::{QueryParameter, QueryParameters, QueryValue};

/// Builds the relative URL of a call.
///
/// Placeholders are substituted first; the query string is appended after a
/// `?` only when there is at least one parameter.
///
/// # Example
///
/// ```
/// use restkit_core::{PathParameters, QueryParameters, compose_url};
///
/// let path = PathParameters::try_from_pairs([("id", 42)]).expect("valid");
/// let query = QueryParameters::try_from_pairs([("expand", "orders")]).expect("valid");
///
/// assert_eq!(compose_url("users/{id}", &path, &query), "users/42?expand=orders");
/// assert_eq!(
///     compose_url("users/{id}", &path, &QueryParameters::new()),
///     "users/42"
/// );
/// ```
#[must_use]
pub fn compose_url(operation: &str, path: &PathParameters, query: &QueryParameters) -> String {
    let mut url = path.apply(operation);
    let query = query.to_string();
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }
    url
}

/// Builds [`PathParameters`] from `name => value` pairs.
///
/// Evaluates to a [`Result`](crate::Result) that fails on a repeated name.
///
/// ```
/// let path = restkit_core::path_params! { "id" => 777, "key" => "abc" }.expect("unique");
/// assert_eq!(path.apply("base/{id}/sub/{key}"), "base/777/sub/abc");
/// ```
#[macro_export]
macro_rules! path_params {
    () => {
        ::std::result::Result::<_, $crate::Error>::Ok($crate::PathParameters::new())
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        $crate::PathParameters::try_from_pairs([
            $((
                ::std::string::String::from($name),
                ::std::string::ToString::to_string(&$value),
            )),+
        ])
    };
}

/// Builds [`QueryParameters`] from `name => value` pairs, in order.
///
/// ```
/// let query = restkit_core::query_params! { "Ids" => vec![7, 11, 21], "q" => "a b" }
///     .expect("valid names");
/// assert_eq!(query.to_string(), "Ids=7&Ids=11&Ids=21&q=a%20b");
/// ```
#[macro_export]
macro_rules! query_params {
    () => {
        ::std::result::Result::<_, $crate::Error>::Ok($crate::QueryParameters::new())
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        $crate::QueryParameters::try_from_pairs([
            $((
                ::std::string::String::from($name),
                $crate::QueryValue::from($value),
            )),+
        ])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_path_only() {
        let path = crate::path_params! { "id" => 777, "key" => "abc" }.expect("unique");
        assert_eq!(
            compose_url("base/{id}/sub/{key}", &path, &QueryParameters::new()),
            "base/777/sub/abc"
        );
    }

    #[test]
    fn compose_path_and_query() {
        let path = crate::path_params! { "id" => 1 }.expect("unique");
        let query = crate::query_params! {
            "Ids" => vec![7, 11, 21],
            "Desc" => "What",
            "Flag" => None::<bool>,
        }
        .expect("valid");

        insta::assert_snapshot!(
            compose_url("orders/{id}", &path, &query),
            @"orders/1?Ids=7&Ids=11&Ids=21&Desc=What&Flag="
        );
    }

    #[test]
    fn compose_without_parameters() {
        let path = crate::path_params! {}.expect("empty");
        let query = crate::query_params! {}.expect("empty");
        assert_eq!(compose_url("status/{unbound}", &path, &query), "status/{unbound}");
    }

    #[test]
    fn duplicate_path_macro_fails() {
        assert!(crate::path_params! { "id" => 1, "id" => 2 }.is_err());
    }
}
