//! Query parameters and their `name=value` rendering.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::{Error, Result};

/// Characters escaped in query values: everything but the RFC 3986
/// unreserved set.
const DATA_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Value of a query parameter.
///
/// A `List` expands to one `name=value` pair per element; `Null` and `None`
/// elements render as `name=`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QueryValue {
    /// No value, rendered as an empty string.
    #[default]
    Null,
    /// A single value.
    Scalar(String),
    /// An ordered sequence of values.
    List(Vec<Option<String>>),
}

impl QueryValue {
    /// Builds a list value from anything convertible, flattening nested lists.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        let mut values = Vec::new();
        for item in items {
            match item.into() {
                Self::Null => values.push(None),
                Self::Scalar(value) => values.push(Some(value)),
                Self::List(nested) => values.extend(nested),
            }
        }
        Self::List(values)
    }

    /// Returns `true` for [`QueryValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The scalar value, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    fn into_elements(self) -> Vec<Option<String>> {
        match self {
            Self::Null => vec![None],
            Self::Scalar(value) => vec![Some(value)],
            Self::List(values) => values,
        }
    }
}

macro_rules! scalar_query_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for QueryValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_query_value!(
    &str, String, &String, char, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128,
    usize, f32, f64,
);

impl<T: Into<Self>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for QueryValue {
    fn from(items: Vec<T>) -> Self {
        Self::list(items)
    }
}

impl<T: Into<Self>, const N: usize> From<[T; N]> for QueryValue {
    fn from(items: [T; N]) -> Self {
        Self::list(items)
    }
}

impl<T: Into<Self> + Clone> From<&[T]> for QueryValue {
    fn from(items: &[T]) -> Self {
        Self::list(items.iter().cloned())
    }
}

/// A named query parameter.
///
/// # Example
///
/// ```
/// use restkit_core::QueryParameter;
///
/// let param = QueryParameter::new("q", "rust lang").expect("valid name");
/// assert_eq!(param.to_string(), "q=rust%20lang");
///
/// let ids = QueryParameter::new("Ids", vec![7, 11, 21]).expect("valid name");
/// assert_eq!(ids.to_string(), "Ids=7&Ids=11&Ids=21");
///
/// let raw = QueryParameter::encoded("filter", "a%2Cb").expect("valid name");
/// assert_eq!(raw.to_string(), "filter=a%2Cb");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameter {
    name: String,
    value: QueryValue,
    pre_encoded: bool,
}

impl QueryParameter {
    /// Creates a parameter whose value is percent-encoded when rendered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when the name is empty.
    pub fn new(name: impl Into<String>, value: impl Into<QueryValue>) -> Result<Self> {
        Self::build(name.into(), value.into(), false)
    }

    /// Creates a parameter whose value is already encoded and rendered verbatim.
    pub fn encoded(name: impl Into<String>, value: impl Into<QueryValue>) -> Result<Self> {
        Self::build(name.into(), value.into(), true)
    }

    fn build(name: String, value: QueryValue, pre_encoded: bool) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::invalid_parameter("query parameter name is empty"));
        }
        Ok(Self {
            name,
            value,
            pre_encoded,
        })
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter value.
    #[must_use]
    pub const fn value(&self) -> &QueryValue {
        &self.value
    }

    /// Whether the value bypasses escaping.
    #[must_use]
    pub const fn is_pre_encoded(&self) -> bool {
        self.pre_encoded
    }

    fn write_pair(&self, f: &mut fmt::Formatter<'_>, value: Option<&str>) -> fmt::Result {
        let value = value.unwrap_or_default();
        if self.pre_encoded {
            write!(f, "{}={value}", self.name)
        } else {
            write!(
                f,
                "{}={}",
                self.name,
                utf8_percent_encode(value, DATA_COMPONENT)
            )
        }
    }
}

impl fmt::Display for QueryParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            QueryValue::Null => self.write_pair(f, None),
            QueryValue::Scalar(value) => self.write_pair(f, Some(value)),
            QueryValue::List(values) => {
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str("&")?;
                    }
                    self.write_pair(f, value.as_deref())?;
                }
                Ok(())
            }
        }
    }
}

/// Ordered collection of query parameters.
///
/// Insertion order is kept and names may repeat; each occurrence is rendered
/// on its own.
///
/// # Example
///
/// ```
/// use restkit_core::QueryParameters;
///
/// let mut query = QueryParameters::new();
/// query.append("Desc", "What").expect("valid");
/// query.append("Page", 2).expect("valid");
/// query.append("Desc", "Happens").expect("valid");
///
/// assert_eq!(query.to_string(), "Desc=What&Page=2&Desc=Happens");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    params: Vec<QueryParameter>,
}

impl QueryParameters {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Builds a collection from `(name, value)` pairs.
    pub fn try_from_pairs<I, N, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<QueryValue>,
    {
        let mut query = Self::new();
        for (name, value) in pairs {
            query.append(name, value)?;
        }
        Ok(query)
    }

    /// Appends a parameter.
    pub fn push(&mut self, param: QueryParameter) {
        self.params.push(param);
    }

    /// Appends a parameter that will be percent-encoded.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Result<()> {
        self.push(QueryParameter::new(name, value)?);
        Ok(())
    }

    /// Appends a parameter whose value is already encoded.
    pub fn append_encoded(
        &mut self,
        name: impl Into<String>,
        value: impl Into<QueryValue>,
    ) -> Result<()> {
        self.push(QueryParameter::encoded(name, value)?);
        Ok(())
    }

    /// Value for `name`.
    ///
    /// A name that occurs more than once yields a [`QueryValue::List`] of all
    /// its values in order.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<QueryValue> {
        let mut matches = self.params.iter().filter(|param| param.name == name);
        let first = matches.next()?;
        let rest: Vec<_> = matches.collect();
        if rest.is_empty() {
            return Some(first.value.clone());
        }
        Some(QueryValue::list(
            std::iter::once(first)
                .chain(rest)
                .map(|param| param.value.clone()),
        ))
    }

    /// Writes the value of `name`.
    ///
    /// - `Null` removes every occurrence.
    /// - Otherwise element `i` of the value replaces occurrence `i`, a `None`
    ///   element removes its occurrence, surplus occurrences are removed and
    ///   surplus elements are appended. A scalar is a one-element list.
    ///
    /// Replaced occurrences lose their pre-encoded flag.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_parameter("query parameter name is empty"));
        }

        let value = value.into();
        if value.is_null() {
            self.remove(&name);
            return Ok(());
        }

        let positions: Vec<usize> = self
            .params
            .iter()
            .enumerate()
            .filter(|(_, param)| param.name == name)
            .map(|(index, _)| index)
            .collect();
        let elements = value.into_elements();
        let mut doomed: Vec<usize> = positions.iter().skip(elements.len()).copied().collect();

        for (index, element) in elements.into_iter().enumerate() {
            match (positions.get(index), element) {
                (Some(&position), Some(value)) => {
                    if let Some(param) = self.params.get_mut(position) {
                        param.value = QueryValue::Scalar(value);
                        param.pre_encoded = false;
                    }
                }
                (Some(&position), None) => doomed.push(position),
                (None, Some(value)) => self.params.push(QueryParameter {
                    name: name.clone(),
                    value: QueryValue::Scalar(value),
                    pre_encoded: false,
                }),
                (None, None) => {}
            }
        }

        if !doomed.is_empty() {
            let mut index = 0;
            self.params.retain(|_| {
                let keep = !doomed.contains(&index);
                index += 1;
                keep
            });
        }
        Ok(())
    }

    /// Removes every occurrence of `name`, returning how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.params.len();
        self.params.retain(|param| param.name != name);
        before - self.params.len()
    }

    /// Number of parameters (occurrences, not pairs).
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterates over the parameters in order.
    pub fn iter(&self) -> std::slice::Iter<'_, QueryParameter> {
        self.params.iter()
    }
}

impl fmt::Display for QueryParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for param in &self.params {
            // An empty list renders nothing and must not leave a stray `&`.
            if matches!(&param.value, QueryValue::List(values) if values.is_empty()) {
                continue;
            }
            if !first {
                f.write_str("&")?;
            }
            first = false;
            write!(f, "{param}")?;
        }
        Ok(())
    }
}

impl FromIterator<QueryParameter> for QueryParameters {
    fn from_iter<I: IntoIterator<Item = QueryParameter>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

impl Extend<QueryParameter> for QueryParameters {
    fn extend<I: IntoIterator<Item = QueryParameter>>(&mut self, iter: I) {
        self.params.extend(iter);
    }
}

impl<'a> IntoIterator for &'a QueryParameters {
    type Item = &'a QueryParameter;
    type IntoIter = std::slice::Iter<'a, QueryParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}
