use connectome_core::ids::normalize;
use connectome_core::model::MetadataRecord;
use connectome_core::SegmentId;
use ingestion::MetadataTable;
use std::collections::HashMap;

/// Metadata lookup keyed by normalized segment id.
///
/// Rows whose key is empty are kept out of the key set. When two rows share
/// a key the first one wins.
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    headers: Vec<String>,
    records: Vec<MetadataRecord>,
    by_key: HashMap<SegmentId, usize>,
    malformed_rows: Vec<usize>,
    duplicate_keys: Vec<SegmentId>,
}

impl MetadataIndex {
    pub fn build(records: Vec<MetadataRecord>) -> Self {
        let mut by_key = HashMap::new();
        let mut malformed_rows = Vec::new();
        let mut duplicate_keys = Vec::new();

        for (row, record) in records.iter().enumerate() {
            if record.key().is_empty() {
                malformed_rows.push(row);
                continue;
            }
            if by_key.contains_key(record.key()) {
                duplicate_keys.push(record.key().clone());
            } else {
                by_key.insert(record.key().clone(), row);
            }
        }

        Self {
            headers: Vec::new(),
            records,
            by_key,
            malformed_rows,
            duplicate_keys,
        }
    }

    pub fn from_table(table: MetadataTable) -> Self {
        let headers = table.headers;
        let mut index = Self::build(table.records);
        index.headers = headers;
        index
    }

    pub fn get(&self, id: &str) -> Option<&MetadataRecord> {
        self.by_key
            .get(normalize(id))
            .map(|&row| &self.records[row])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_key.contains_key(normalize(id))
    }

    pub fn keys(&self) -> impl Iterator<Item = &SegmentId> {
        self.by_key.keys()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Zero-based data row numbers excluded for an empty key.
    pub fn malformed_rows(&self) -> &[usize] {
        &self.malformed_rows
    }

    pub fn duplicate_keys(&self) -> &[SegmentId] {
        &self.duplicate_keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, kind: &str) -> MetadataRecord {
        MetadataRecord::from_pairs("bodyId_post", vec![("bodyId_post", Some(key)), ("type", Some(kind))])
    }

    #[test]
    fn test_lookup_by_normalized_key() {
        let index = MetadataIndex::build(vec![record("10327", "DNa02")]);
        assert_eq!(index.get("10327").unwrap().get("type"), Some("DNa02"));
        assert_eq!(index.get(" !10327 ").unwrap().get("type"), Some("DNa02"));
        assert!(index.get("11670").is_none());
    }

    #[test]
    fn test_empty_key_rows_are_excluded() {
        let index = MetadataIndex::build(vec![record("  ", "X"), record("2", "Y")]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.malformed_rows(), &[0]);
        assert!(index.get("").is_none());
    }

    #[test]
    fn test_duplicate_key_first_row_wins() {
        let index = MetadataIndex::build(vec![record("5", "first"), record("5", "second")]);
        assert_eq!(index.get("5").unwrap().get("type"), Some("first"));
        assert_eq!(index.duplicate_keys().len(), 1);
    }
}
