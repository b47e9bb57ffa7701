//! Dimension sets attached to metric registrations
//!
//! A [`Dimensions`] value is a map from dimension name to dimension value.
//! It is stored ordered by name so that the same set always renders, and
//! therefore resolves, to the same storage key regardless of insertion
//! order.

use std::borrow::Cow;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mapping of dimension name to dimension value
///
/// # Example
/// ```
/// use dimetrics_registry::Dimensions;
///
/// let dims = Dimensions::new().with("region", "eu-west-1").with("host", "api-1");
/// assert_eq!(dims.to_string(), "host=api-1,region=eu-west-1");
/// assert_eq!(dims.get("region"), Some("eu-west-1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Dimensions(BTreeMap<String, String>);

impl Dimensions {
    /// An empty dimension set
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insertion
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a dimension, returning the previous value for that name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs ordered by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Characters with structural meaning in a resolved key
const KEY_RESERVED: [char; 5] = ['\\', '[', ']', ',', '='];

/// Backslash-escape the characters that delimit a resolved key
///
/// Returns the input unchanged when it contains none of `\ [ ] , =`.
pub(crate) fn escape_key_part(part: &str) -> Cow<'_, str> {
    if !part.contains(KEY_RESERVED) {
        return Cow::Borrowed(part);
    }
    let mut escaped = String::with_capacity(part.len() + 4);
    for ch in part.chars() {
        if KEY_RESERVED.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    Cow::Owned(escaped)
}

/// Renders as `name=value` pairs joined by commas, ordered by name
///
/// Reserved characters inside names and values are backslash-escaped, so
/// distinct sets never render the same.
impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, value)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", escape_key_part(name), escape_key_part(value))?;
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for Dimensions
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Dimensions
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<BTreeMap<String, String>> for Dimensions {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl IntoIterator for Dimensions {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates insertion order does not affect equality or rendering.
    ///
    /// Assertions:
    /// - Confirms both sets compare equal.
    /// - Confirms both render as `"a=1,b=2"`.
    #[test]
    fn test_order_independent() {
        let first = Dimensions::new().with("b", "2").with("a", "1");
        let second = Dimensions::from([("a", "1"), ("b", "2")]);

        assert_eq!(first, second);
        assert_eq!(first.to_string(), "a=1,b=2");
        assert_eq!(second.to_string(), "a=1,b=2");
    }

    #[test]
    fn test_insert_replaces_value() {
        let mut dims = Dimensions::new();
        assert_eq!(dims.insert("env", "dev"), None);
        assert_eq!(dims.insert("env", "prod"), Some("dev".to_string()));
        assert_eq!(dims.get("env"), Some("prod"));
        assert_eq!(dims.len(), 1);
    }

    #[test]
    fn test_empty_renders_empty() {
        let dims = Dimensions::new();
        assert!(dims.is_empty());
        assert_eq!(dims.to_string(), "");
    }

    /// Validates reserved characters are escaped when rendering.
    ///
    /// Assertions:
    /// - Confirms `{x: "1,y=2"}` and `{x: "1", y: "2"}` render differently.
    /// - Confirms each reserved character gains one backslash.
    #[test]
    fn test_reserved_characters_are_escaped() {
        let packed = Dimensions::from([("x", "1,y=2")]);
        let split = Dimensions::from([("x", "1"), ("y", "2")]);

        assert_eq!(packed.to_string(), r"x=1\,y\=2");
        assert_eq!(split.to_string(), "x=1,y=2");
        assert_ne!(packed.to_string(), split.to_string());
        assert_eq!(escape_key_part(r"a\[b]"), r"a\\\[b\]");
        assert!(matches!(escape_key_part("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_iter_is_sorted() {
        let dims: Dimensions = vec![("zone", "c"), ("app", "web")].into_iter().collect();
        let names: Vec<&str> = dims.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["app", "zone"]);
    }
}
