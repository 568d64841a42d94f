//! Header precedence.
//!
//! From weakest to strongest: transport default headers, settings default
//! headers, the authorization header, common headers from the hooks,
//! per-call headers.

use http::HeaderMap;

/// Merge `incoming` into `target`; every name present in `incoming` replaces
/// all values of that name in `target`.
pub fn merge(target: &mut HeaderMap, incoming: &HeaderMap) {
    for name in incoming.keys() {
        target.remove(name);
        for value in incoming.get_all(name) {
            target.append(name.clone(), value.clone());
        }
    }
}

/// Add the `defaults` whose name is not already present in `target`.
pub fn fill_missing(target: &mut HeaderMap, defaults: &HeaderMap) {
    for name in defaults.keys() {
        if target.contains_key(name) {
            continue;
        }
        for value in defaults.get_all(name) {
            target.append(name.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use http::header::{ACCEPT, HeaderValue};

    use super::*;

    fn values<'a>(headers: &'a HeaderMap, name: &str) -> Vec<&'a str> {
        headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    #[test]
    fn merge_replaces_every_value_of_a_name() {
        let mut target = HeaderMap::new();
        target.append("x-tag", HeaderValue::from_static("a"));
        target.append("x-tag", HeaderValue::from_static("b"));
        target.insert("x-keep", HeaderValue::from_static("k"));

        let mut incoming = HeaderMap::new();
        incoming.append("x-tag", HeaderValue::from_static("c"));
        incoming.append("x-tag", HeaderValue::from_static("d"));

        merge(&mut target, &incoming);

        check!(values(&target, "x-tag") == ["c", "d"]);
        check!(values(&target, "x-keep") == ["k"]);
    }

    #[test]
    fn fill_missing_keeps_existing_names() {
        let mut target = HeaderMap::new();
        target.insert(ACCEPT, HeaderValue::from_static("text/plain"));

        let mut defaults = HeaderMap::new();
        defaults.insert(ACCEPT, HeaderValue::from_static("application/xml"));
        defaults.insert("x-tenant", HeaderValue::from_static("acme"));

        fill_missing(&mut target, &defaults);

        check!(values(&target, "accept") == ["text/plain"]);
        check!(values(&target, "x-tenant") == ["acme"]);
    }
}
