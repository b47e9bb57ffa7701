//! Dimension metadata store
//!
//! Maps a resolved storage key back to the metric name and dimension set it
//! was registered with. Registration without dimensions is a pass-through:
//! the key is the name and nothing is recorded. Names and dimensions have
//! their key delimiters (`\ [ ] , =`) backslash-escaped, so every distinct
//! `(name, dimensions)` pair resolves to its own key.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::RwLock;

use dimetrics_common::{read_or_recover, write_or_recover};

use crate::dimensions::{escape_key_part, Dimensions};

/// Metric name and dimensions recorded for a resolved key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    /// Logical metric name as supplied by the caller
    pub metric: String,
    /// Dimensions attached at registration
    pub dimensions: Dimensions,
}

/// Thread-safe store resolving `(name, dimensions)` to storage keys
#[derive(Debug, Default)]
pub struct MetricMetadata {
    entries: RwLock<HashMap<String, MetadataEntry>>,
}

impl MetricMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Composite key for a name and a dimension set
    ///
    /// Format: `name[dim1=value1,dim2=value2]`, dimensions ordered by name,
    /// or the escaped name alone when `dimensions` is empty.
    pub fn composite_key(name: &str, dimensions: &Dimensions) -> String {
        let name = escape_key_part(name);
        if dimensions.is_empty() {
            return name.into_owned();
        }
        format!("{name}[{dimensions}]")
    }

    /// Resolve a storage key and record its dimensions
    ///
    /// A bare name is recorded only when escaping changed it.
    pub fn register(&self, name: &str, dimensions: &Dimensions) -> String {
        if dimensions.is_empty() {
            if let Cow::Borrowed(plain) = escape_key_part(name) {
                return plain.to_string();
            }
        }

        let key = Self::composite_key(name, dimensions);
        let mut entries = write_or_recover(&self.entries, "MetricMetadata::entries");
        entries.entry(key.clone()).or_insert_with(|| {
            tracing::trace!(key = %key, metric = name, "Recorded dimension metadata");
            MetadataEntry { metric: name.to_string(), dimensions: dimensions.clone() }
        });
        key
    }

    pub fn get_metadata(&self, key: &str) -> Option<MetadataEntry> {
        read_or_recover(&self.entries, "MetricMetadata::entries").get(key).cloned()
    }

    /// Metric name and dimensions for a key
    ///
    /// Keys registered without dimensions resolve to `(key, {})`.
    pub fn get_metric_and_dims(&self, key: &str) -> (String, Dimensions) {
        match self.get_metadata(key) {
            Some(entry) => (entry.metric, entry.dimensions),
            None => (key.to_string(), Dimensions::new()),
        }
    }

    /// Remove every recorded entry
    pub fn clear(&self) {
        write_or_recover(&self.entries, "MetricMetadata::entries").clear();
    }

    /// Keys with recorded dimensions, in sorted order
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> =
            read_or_recover(&self.entries, "MetricMetadata::entries").keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        read_or_recover(&self.entries, "MetricMetadata::entries").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_without_dimensions_passes_through() {
        let metadata = MetricMetadata::new();
        assert_eq!(metadata.register("requests", &Dimensions::new()), "requests");
        assert!(metadata.is_empty());
    }

    /// Validates dimensioned registration and reverse lookup.
    ///
    /// Assertions:
    /// - Confirms the key equals `"requests[method=GET,status=200]"`.
    /// - Confirms `get_metric_and_dims` returns the original name and dims.
    #[test]
    fn test_register_with_dimensions() {
        let metadata = MetricMetadata::new();
        let dims = Dimensions::new().with("status", "200").with("method", "GET");

        let key = metadata.register("requests", &dims);

        assert_eq!(key, "requests[method=GET,status=200]");
        assert_eq!(metadata.get_metric_and_dims(&key), ("requests".to_string(), dims));
        assert_eq!(metadata.len(), 1);
    }

    #[test]
    fn test_register_is_deterministic() {
        let metadata = MetricMetadata::new();
        let first = metadata.register("latency", &Dimensions::from([("a", "1"), ("b", "2")]));
        let second = metadata.register("latency", &Dimensions::from([("b", "2"), ("a", "1")]));

        assert_eq!(first, second);
        assert_eq!(metadata.len(), 1);
    }

    /// Validates values containing delimiters cannot alias another set.
    ///
    /// Assertions:
    /// - Confirms `{x: "1,y=2"}` and `{x: "1", y: "2"}` resolve to different
    ///   keys, each keeping its own dimensions.
    #[test]
    fn test_delimiters_in_values_stay_distinct() {
        let metadata = MetricMetadata::new();
        let packed = Dimensions::from([("x", "1,y=2")]);
        let split = Dimensions::from([("x", "1"), ("y", "2")]);

        let packed_key = metadata.register("req", &packed);
        let split_key = metadata.register("req", &split);

        assert_ne!(packed_key, split_key);
        assert_eq!(metadata.get_metric_and_dims(&packed_key).1, packed);
        assert_eq!(metadata.get_metric_and_dims(&split_key).1, split);
    }

    /// Validates a bracketed bare name does not alias a dimensioned key.
    ///
    /// Assertions:
    /// - Confirms `"req[x=1]"` with no dims and `"req"` with `{x: "1"}`
    ///   resolve to different keys.
    /// - Confirms the escaped bare name maps back to `("req[x=1]", {})`.
    #[test]
    fn test_bracketed_name_stays_distinct() {
        let metadata = MetricMetadata::new();

        let bare = metadata.register("req[x=1]", &Dimensions::new());
        let dimensioned = metadata.register("req", &Dimensions::from([("x", "1")]));

        assert_eq!(bare, r"req\[x\=1\]");
        assert_eq!(dimensioned, "req[x=1]");
        assert_eq!(
            metadata.get_metric_and_dims(&bare),
            ("req[x=1]".to_string(), Dimensions::new())
        );
    }

    #[test]
    fn test_unknown_key_falls_back() {
        let metadata = MetricMetadata::new();
        let (metric, dims) = metadata.get_metric_and_dims("plain");
        assert_eq!(metric, "plain");
        assert!(dims.is_empty());
    }

    #[test]
    fn test_clear_removes_entries() {
        let metadata = MetricMetadata::new();
        let key = metadata.register("jobs", &Dimensions::from([("queue", "high")]));

        metadata.clear();

        assert!(metadata.is_empty());
        assert!(metadata.get_metadata(&key).is_none());
    }
}
