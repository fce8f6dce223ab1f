use crate::error::LoadError;
use connectome_core::model::MetadataRecord;
use csv::{ReaderBuilder, Trim};

/// Parsed metadata table. Values are kept as text exactly as written.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataTable {
    pub key_field: String,
    pub headers: Vec<String>,
    pub records: Vec<MetadataRecord>,
}

/// Parses the metadata CSV. The header row names the fields (whitespace
/// trimmed); rows shorter than the header leave the missing fields absent.
/// Blank lines are skipped; a row of bare delimiters is kept with an empty
/// key so the index can exclude and report it.
pub fn parse_metadata(text: &str, key_field: &str) -> Result<MetadataTable, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if !headers.iter().any(|h| h == key_field) {
        return Err(LoadError::MissingKeyColumn(key_field.to_string()));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let pairs = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), row.get(i).map(str::to_string)));
        records.push(MetadataRecord::from_pairs(key_field, pairs));
    }

    tracing::debug!(rows = records.len(), fields = headers.len(), "parsed metadata table");

    Ok(MetadataTable {
        key_field: key_field.to_string(),
        headers,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_trimmed_and_values_kept_as_text() {
        let csv = " bodyId_post , type ,size\n10327,DNa02,007\n11670,DNb01,12\n";
        let table = parse_metadata(csv, "bodyId_post").unwrap();
        assert_eq!(table.headers, vec!["bodyId_post", "type", "size"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].key().as_str(), "10327");
        assert_eq!(table.records[0].get("size"), Some("007"));
    }

    #[test]
    fn test_blank_lines_skipped_and_short_rows_absent() {
        let csv = "bodyId_post,type,class\n\n1,X\n\n2,Y,Z\n";
        let table = parse_metadata(csv, "bodyId_post").unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].get("class"), None);
        assert_eq!(table.records[0].display_rows()[2].1, "N/A");
        assert_eq!(table.records[1].get("class"), Some("Z"));
    }

    #[test]
    fn test_quoted_fields_keep_commas() {
        let csv = "bodyId_post,notes\n5,\"left, ventral\"\n";
        let table = parse_metadata(csv, "bodyId_post").unwrap();
        assert_eq!(table.records[0].get("notes"), Some("left, ventral"));
    }

    #[test]
    fn test_missing_key_column_is_rejected() {
        let err = parse_metadata("id,type\n1,X\n", "bodyId_post").unwrap_err();
        assert!(matches!(err, LoadError::MissingKeyColumn(ref k) if k == "bodyId_post"));
    }

    #[test]
    fn test_delimiter_only_row_is_kept() {
        let table = parse_metadata("bodyId_post,type\n,\n\n2,X\n", "bodyId_post").unwrap();
        assert_eq!(table.records.len(), 2);
        assert!(table.records[0].key().is_empty());
        assert_eq!(table.records[1].key().as_str(), "2");
    }

    #[test]
    fn test_empty_key_kept_for_index_to_exclude() {
        let table = parse_metadata("bodyId_post,type\n ,X\n3,Y\n", "bodyId_post").unwrap();
        assert_eq!(table.records.len(), 2);
        assert!(table.records[0].key().is_empty());
    }
}
