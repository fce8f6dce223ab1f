use crate::ids::SegmentId;
use serde::{Deserialize, Serialize};

/// Placeholder shown for a metadata field the source row did not provide.
pub const MISSING_VALUE: &str = "N/A";

/// One directed, weighted connection entry of the connectivity matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub row: SegmentId,
    pub col: SegmentId,
    pub weight: f64,
}

impl EdgeRecord {
    pub fn new(row: impl Into<SegmentId>, col: impl Into<SegmentId>, weight: f64) -> Self {
        Self {
            row: row.into(),
            col: col.into(),
            weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataField {
    pub name: String,
    pub value: Option<String>,
}

/// Per-segment metadata row. Fields keep the column order of the source
/// table and are never coerced to numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    key: SegmentId,
    fields: Vec<MetadataField>,
}

impl MetadataRecord {
    pub fn new(key: SegmentId, fields: Vec<MetadataField>) -> Self {
        Self { key, fields }
    }

    /// Builds a record from `(name, value)` pairs, normalizing the value of
    /// `key_field` into the record key. The key field itself stays in the
    /// field list with its normalized spelling.
    pub fn from_pairs<I, K, V>(key_field: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut key = SegmentId::new("");
        let fields = pairs
            .into_iter()
            .map(|(name, value)| {
                let name = name.into();
                let mut value = value.map(Into::into);
                if name == key_field {
                    key = SegmentId::new(value.as_deref().unwrap_or_default());
                    value = Some(key.as_str().to_string());
                }
                MetadataField { name, value }
            })
            .collect();
        Self { key, fields }
    }

    pub fn key(&self) -> &SegmentId {
        &self.key
    }

    pub fn fields(&self) -> &[MetadataField] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .and_then(|field| field.value.as_deref())
    }

    /// Key/value rows for the side panel, absent values rendered as `N/A`.
    pub fn display_rows(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|field| {
                (
                    field.name.clone(),
                    field
                        .value
                        .clone()
                        .unwrap_or_else(|| MISSING_VALUE.to_string()),
                )
            })
            .collect()
    }
}
