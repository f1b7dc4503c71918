//! Measurement records emitted by the collector.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Measurement name used for every record produced from a profile report.
pub const MEASUREMENT: &str = "glusterfs";

/// Tag key holding the volume name.
pub const TAG_VOLUME: &str = "volume";
/// Tag key holding the brick identifier.
pub const TAG_BRICK: &str = "brick";

/// Numeric fields of a record, keyed by field name.
pub type Fields = BTreeMap<String, f64>;

/// Tags attached to a record.
///
/// Empty until the first `Brick:` header of a report has been seen; after
/// that it always holds both `volume` and `brick`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeMap<String, String>);

impl TagSet {
    /// Creates an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags for records belonging to `brick` of `volume`.
    pub fn for_brick(volume: &str, brick: &str) -> Self {
        let mut tags = BTreeMap::new();
        tags.insert(TAG_VOLUME.to_string(), volume.to_string());
        tags.insert(TAG_BRICK.to_string(), brick.to_string());
        Self(tags)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn volume(&self) -> Option<&str> {
        self.get(TAG_VOLUME)
    }

    pub fn brick(&self) -> Option<&str> {
        self.get(TAG_BRICK)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over tags in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A single tagged measurement: name, numeric fields, tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub measurement: String,
    pub fields: Fields,
    pub tags: TagSet,
}

impl Measurement {
    pub fn new(measurement: impl Into<String>, fields: Fields, tags: TagSet) -> Self {
        Self {
            measurement: measurement.into(),
            fields,
            tags,
        }
    }

    /// Record with a single field, e.g. `read` or `write` byte counters.
    pub fn single(field: &str, value: f64, tags: TagSet) -> Self {
        let mut fields = Fields::new();
        fields.insert(field.to_string(), value);
        Self::new(MEASUREMENT, fields, tags)
    }

    pub fn field(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_set_for_brick() {
        let tags = TagSet::for_brick("vol0", "node1:/data/brick1");
        assert_eq!(tags.volume(), Some("vol0"));
        assert_eq!(tags.brick(), Some("node1:/data/brick1"));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_tag_set_default_is_empty() {
        let tags = TagSet::new();
        assert!(tags.is_empty());
        assert_eq!(tags.volume(), None);
        assert_eq!(tags.brick(), None);
    }

    #[test]
    fn test_measurement_single() {
        let m = Measurement::single("read", 12345.0, TagSet::new());
        assert_eq!(m.measurement, MEASUREMENT);
        assert_eq!(m.field("read"), Some(12345.0));
        assert_eq!(m.fields.len(), 1);
    }

    #[test]
    fn test_tag_set_serializes_as_map() {
        let tags = TagSet::for_brick("vol0", "b1");
        let json = serde_json::to_string(&tags).unwrap();
        assert_eq!(json, r#"{"brick":"b1","volume":"vol0"}"#);
    }
}
