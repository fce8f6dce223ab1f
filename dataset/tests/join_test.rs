use connectome_core::diagnostics::{DiagnosticKind, InMemoryDiagnosticSink};
use dataset::DatasetIndex;
use ingestion::edges::parse_edges;
use ingestion::metadata::parse_metadata;

#[test]
fn test_numeric_and_text_ids_resolve_to_same_record() {
    let edges = parse_edges(r#"[{"row": 1, "col": 10327, "weight": 12}, {"row": "1", "col": "11670", "weight": 3}]"#)
        .unwrap();
    let table = parse_metadata("bodyId_post,type\n10327,DNa02\n 11670 ,DNb01\n", "bodyId_post").unwrap();
    let index = DatasetIndex::build(&edges, table.records);

    for col in index.col_ids() {
        assert!(index.metadata_for(col.as_str()).is_some(), "no metadata for {}", col);
    }
    assert_eq!(index.metadata_for("10327").unwrap().get("type"), Some("DNa02"));
    assert_eq!(index.metadata_for("11670").unwrap().get("type"), Some("DNb01"));
    assert_eq!(index.weight("1", "10327"), 12.0);
    assert_eq!(index.join_report().overlap, 2);
}

#[test]
fn test_wide_numeric_column_joins_text_key() {
    let edges = parse_edges(r#"[{"row": 1, "col": 123456789012345678901234, "weight": 1}]"#).unwrap();
    let table = parse_metadata("bodyId_post,type\n123456789012345678901234,X\n", "bodyId_post").unwrap();
    let index = DatasetIndex::build(&edges, table.records);

    assert_eq!(index.col_ids()[0].as_str(), "123456789012345678901234");
    assert_eq!(
        index.metadata_for(index.col_ids()[0].as_str()).unwrap().get("type"),
        Some("X")
    );
}

#[test]
fn test_delimiter_only_row_reported_as_malformed() {
    let edges = parse_edges(r#"[{"row": 1, "col": 2, "weight": 1}]"#).unwrap();
    let table = parse_metadata("bodyId_post,type\n,\n2,X\n", "bodyId_post").unwrap();
    let index = DatasetIndex::build(&edges, table.records);
    let sink = InMemoryDiagnosticSink::default();

    let report = index.report(&sink);
    assert_eq!(report.overlap, 1);
    assert_eq!(report.metadata_without_column, 0);
    assert_eq!(sink.count(DiagnosticKind::MalformedRecord), 1);
}

#[test]
fn test_single_edge_scenario() {
    let edges = parse_edges(r#"[{"row":"1","col":"2","weight":5}]"#).unwrap();
    let table = parse_metadata("bodyId_post,type\n2,X\n", "bodyId_post").unwrap();
    let index = DatasetIndex::build(&edges, table.records);

    assert_eq!(index.row_ids().len(), 1);
    assert_eq!(index.col_ids().len(), 1);
    assert_eq!(index.matrix().dense(), vec![vec![5.0]]);
    assert_eq!(
        index.metadata_for("2").unwrap().display_rows(),
        vec![
            ("bodyId_post".to_string(), "2".to_string()),
            ("type".to_string(), "X".to_string()),
        ]
    );
    assert!(index.metadata_for("1").is_none());
}
