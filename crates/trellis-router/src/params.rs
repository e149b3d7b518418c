//! Typed parameter bindings produced by a successful match
//!
//! A `[name]` segment binds exactly one string, a `[[...name]]` segment binds
//! an ordered, possibly empty, sequence. Bindings keep declaration order.

use std::fmt;

/// Value bound to a single route parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Bound by a dynamic segment
    One(String),
    /// Bound by an optional catch-all segment
    Many(Vec<String>),
}

impl ParamValue {
    pub fn as_one(&self) -> Option<&str> {
        match self {
            ParamValue::One(value) => Some(value),
            ParamValue::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&[String]> {
        match self {
            ParamValue::One(_) => None,
            ParamValue::Many(values) => Some(values),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::One(value) => f.write_str(value),
            ParamValue::Many(values) => f.write_str(&values.join("/")),
        }
    }
}

/// Ordered mapping from parameter name to bound value
///
/// # Examples
///
/// ```
/// use trellis_router::ParamBindings;
///
/// let params = ParamBindings::new()
///     .with_one("slug", "7")
///     .with_many("filters", ["a", "b"]);
///
/// assert_eq!(params.get_one("slug"), Some("7"));
/// assert_eq!(params.get_many("filters"), Some(&["a".to_string(), "b".to_string()][..]));
/// assert_eq!(params.get_many("missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParamBindings {
    entries: Vec<(String, ParamValue)>,
}

impl ParamBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to a single value, replacing any earlier binding
    pub fn insert_one(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.insert(name.into(), ParamValue::One(value.into()));
    }

    /// Binds `name` to an ordered sequence, replacing any earlier binding
    pub fn insert_many<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(name.into(), ParamValue::Many(values));
    }

    pub fn with_one(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_one(name, value);
        self
    }

    pub fn with_many<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert_many(name, values);
        self
    }

    fn insert(&mut self, name: String, value: ParamValue) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Value of a dynamic segment; `None` if absent or bound to a sequence
    pub fn get_one(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_one)
    }

    /// Sequence bound by a catch-all; `None` if absent or bound to a single value
    pub fn get_many(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(ParamValue::as_many)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, ParamValue)> for ParamBindings {
    fn from_iter<T: IntoIterator<Item = (S, ParamValue)>>(iter: T) -> Self {
        let mut bindings = ParamBindings::new();
        for (name, value) in iter {
            bindings.insert(name.into(), value);
        }
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut params = ParamBindings::new().with_one("a", "1").with_one("b", "2");
        params.insert_one("a", "3");

        let names: Vec<&str> = params.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(params.get_one("a"), Some("3"));
    }

    #[test]
    fn test_kind_mismatch_is_none() {
        let params = ParamBindings::new()
            .with_one("slug", "7")
            .with_many("rest", Vec::<String>::new());

        assert_eq!(params.get_many("slug"), None);
        assert_eq!(params.get_one("rest"), None);
        assert_eq!(params.get_many("rest"), Some(&[][..]));
    }

    #[test]
    fn test_display_joins_sequences() {
        let value = ParamValue::Many(vec!["a".into(), "b".into()]);
        assert_eq!(value.to_string(), "a/b");
        assert_eq!(ParamValue::One("x".into()).to_string(), "x");
    }

    #[test]
    fn test_from_iterator() {
        let params: ParamBindings = vec![("id", ParamValue::One("1".into()))]
            .into_iter()
            .collect();
        assert_eq!(params.len(), 1);
        assert!(params.contains("id"));
    }
}
