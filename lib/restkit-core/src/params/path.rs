//! Path parameters substituted into `{name}` placeholders.

use std::fmt;

use crate::{Error, Result};

/// Ordered mapping of placeholder name to its stringified value.
///
/// Names are unique: [`PathParameters::insert`] refuses a name that is already
/// bound, while [`PathParameters::set`] rebinds it explicitly.
///
/// # Example
///
/// ```
/// use restkit_core::PathParameters;
///
/// let mut path = PathParameters::new();
/// path.insert("id", 777).expect("new name");
/// path.insert("key", "abc").expect("new name");
///
/// assert_eq!(path.apply("base/{id}/sub/{key}"), "base/777/sub/abc");
/// assert!(path.insert("id", 1).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParameters {
    entries: Vec<(String, String)>,
}

impl PathParameters {
    /// Creates an empty set of path parameters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builds parameters from `(name, value)` pairs, failing on the first
    /// empty or repeated name.
    pub fn try_from_pairs<I, N, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: fmt::Display,
    {
        let mut params = Self::new();
        for (name, value) in pairs {
            params.insert(name, value)?;
        }
        Ok(params)
    }

    /// Binds a new placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when the name is empty or already bound.
    pub fn insert(&mut self, name: impl Into<String>, value: impl fmt::Display) -> Result<()> {
        let name = checked_name(name.into())?;
        if self.get(&name).is_some() {
            return Err(Error::invalid_parameter(format!(
                "path parameter `{name}` is already defined"
            )));
        }
        self.entries.push((name, value.to_string()));
        Ok(())
    }

    /// Binds or rebinds a placeholder, keeping its original position.
    pub fn set(&mut self, name: impl Into<String>, value: impl fmt::Display) -> Result<()> {
        let name = checked_name(name.into())?;
        let value = value.to_string();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        Ok(())
    }

    /// Value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Removes a binding, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Number of bound placeholders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Replaces every literal `{name}` in `operation` with its value.
    ///
    /// Values are inserted as-is. Placeholders without a binding are left
    /// untouched.
    #[must_use]
    pub fn apply(&self, operation: &str) -> String {
        self.entries
            .iter()
            .fold(operation.to_string(), |path, (name, value)| {
                path.replace(&format!("{{{name}}}"), value)
            })
    }
}

fn checked_name(name: String) -> Result<String> {
    if name.is_empty() {
        return Err(Error::invalid_parameter("path parameter name is empty"));
    }
    Ok(name)
}
