use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;

/// Marks a segment as visible in the viewer's `segments` list.
pub const SENTINEL: char = '!';

/// Normalized identifier of a neural segment.
///
/// Every dataset spells segment ids differently (JSON numbers in the edge
/// list, CSV text in the metadata table, `!`-prefixed strings in the viewer
/// state). All joins compare the normalized text held here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(String);

impl SegmentId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize(raw.as_ref()).to_string())
    }

    /// Builds an id from a JSON scalar. Integer literals keep their exact
    /// digits at any magnitude, and `10327.0` maps to `"10327"`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::new(s)),
            Value::Number(n) => {
                let literal = n.to_string();
                if literal.contains(['.', 'e', 'E']) {
                    n.as_f64().map(format_float)
                } else {
                    Some(Self::new(literal))
                }
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Viewer spelling with the sentinel prefix.
    pub fn prefixed(&self) -> String {
        format!("{}{}", SENTINEL, self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

fn format_float(f: f64) -> SegmentId {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.007_199_254_740_992e15 {
        SegmentId(format!("{}", f as i64))
    } else {
        SegmentId::new(f.to_string())
    }
}

/// Trims whitespace and strips the sentinel prefix.
///
/// Repeated sentinels are all removed so that normalizing is idempotent.
pub fn normalize(raw: &str) -> &str {
    raw.trim().trim_start_matches(SENTINEL).trim()
}

/// Returns true when the token is spelled with the sentinel prefix.
pub fn has_sentinel(raw: &str) -> bool {
    raw.starts_with(SENTINEL)
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SegmentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SegmentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SegmentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SegmentId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<u64> for SegmentId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for SegmentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SegmentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SegmentId::from_json(&value).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "segment id must be a string or number, got {}",
                value
            ))
        })
    }
}
