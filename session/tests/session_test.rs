use connectome_core::config::{AppConfig, ClearPolicy};
use connectome_core::diagnostics::{Dataset, DiagnosticKind, InMemoryDiagnosticSink};
use connectome_core::SegmentId;
use ingestion::edges::parse_edges;
use ingestion::metadata::parse_metadata;
use ingestion::viewer_state::parse_viewer_state;
use ingestion::{LoadError, LoadedDataset};
use session::{CellClick, Session, SessionEvent, ViewStatus};
use std::sync::Arc;
use viewer::DeepLinkCodec;

const EDGES: &str = r#"[{"row":"1","col":"2","weight":5}]"#;
const METADATA: &str = "bodyId_post,type\n2,X\n";
const STATE: &str = r#"{"layers":[{"name":"manc:v1.2.3","segments":["!2"]}]}"#;

fn edges() -> LoadedDataset {
    LoadedDataset::Edges(parse_edges(EDGES).unwrap())
}

fn metadata() -> LoadedDataset {
    LoadedDataset::Metadata(parse_metadata(METADATA, "bodyId_post").unwrap())
}

fn state(text: &str) -> LoadedDataset {
    LoadedDataset::ViewerState(parse_viewer_state(text).unwrap())
}

fn ids(session: &Session) -> Vec<&str> {
    session.selection().ids().iter().map(SegmentId::as_str).collect()
}

fn loaded_session() -> Session {
    let mut session = Session::new(&AppConfig::default());
    session.dataset_loaded(edges());
    session.dataset_loaded(metadata());
    session.dataset_loaded(state(STATE));
    session
}

fn decoded_segments(session: &Session) -> Vec<String> {
    let codec = DeepLinkCodec::from_config(&AppConfig::default().viewer);
    let link = session.deep_link().ready().unwrap();
    let document = codec.decode(&link).unwrap();
    document["layers"][0]["segments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_scenario_single_edge_load() {
    let session = loaded_session();

    assert_eq!(ids(&session), vec!["2"]);
    let record = session.displayed_metadata().unwrap();
    assert_eq!(record.get("bodyId_post"), Some("2"));
    assert_eq!(record.get("type"), Some("X"));
    assert_eq!(record.fields().len(), 2);
    assert_eq!(decoded_segments(&session), vec!["!2"]);
}

#[test]
fn test_scenario_clear_empties_selection_and_link() {
    let mut session = loaded_session();
    session.clear();

    assert!(session.selection().is_empty());
    assert_eq!(session.selection_display(), "");
    let codec = DeepLinkCodec::from_config(&AppConfig::default().viewer);
    let document = codec.decode(&session.deep_link().ready().unwrap()).unwrap();
    let layer = &document["layers"][0];
    assert_eq!(layer["segments"], serde_json::json!([]));
    assert!(layer.get("segmentQuery").is_none());
}

#[test]
fn test_scenario_unknown_column_unsets_panel_but_selects() {
    let mut session = loaded_session();
    assert!(session.displayed_metadata().is_some());

    let selected = session.click(&CellClick::new("1", "99"));

    assert_eq!(selected.as_str(), "99");
    assert_eq!(ids(&session), vec!["2", "99"]);
    assert!(session.displayed_metadata().is_none());
    assert_eq!(session.metadata_panel(), ViewStatus::Ready(None));
}

#[test]
fn test_scenario_reset_always_yields_default_pair() {
    let mut session = loaded_session();
    session.add(SegmentId::new("7"));
    session.reset();
    assert_eq!(ids(&session), vec!["10327", "11670"]);

    session.clear();
    session.reset();
    session.reset();
    assert_eq!(ids(&session), vec!["10327", "11670"]);
}

#[test]
fn test_click_selects_column_not_row() {
    let mut session = loaded_session();
    session.clear();
    session.click(&CellClick::new("1", "2"));

    assert_eq!(ids(&session), vec!["2"]);
    assert!(!session.selection().contains("1"));
}

#[test]
fn test_repeated_click_is_idempotent_but_refreshes_panel() {
    let mut session = loaded_session();
    session.click(&CellClick::new("1", "99"));
    assert!(session.displayed_metadata().is_none());

    session.click(&CellClick::new("1", "2"));
    assert_eq!(ids(&session), vec!["2", "99"]);
    assert_eq!(session.displayed_segment().map(SegmentId::as_str), Some("2"));
}

#[test]
fn test_clear_retains_panel_by_default() {
    let mut session = loaded_session();
    session.clear();
    assert_eq!(session.displayed_segment().map(SegmentId::as_str), Some("2"));
}

#[test]
fn test_clear_policy_unset_drops_panel() {
    let mut config = AppConfig::default();
    config.selection.clear_policy = ClearPolicy::Unset;
    let mut session = Session::new(&config);
    session.dataset_loaded(edges());
    session.dataset_loaded(metadata());
    session.dataset_loaded(state(STATE));

    session.clear();
    assert!(session.displayed_metadata().is_none());
}

#[test]
fn test_all_load_orders_reach_same_state() {
    let orders: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    let reference = loaded_session().snapshot();

    for order in orders {
        let mut session = Session::new(&AppConfig::default());
        for step in order {
            let dataset = match step {
                0 => edges(),
                1 => metadata(),
                _ => state(STATE),
            };
            session.apply(SessionEvent::Loaded(Ok(dataset)));
        }
        assert!(session.is_ready());
        assert!(session.index().is_some(), "order {:?}", order);
        assert_eq!(session.snapshot(), reference, "order {:?}", order);
        assert_eq!(
            session.displayed_segment().map(SegmentId::as_str),
            Some("2"),
            "order {:?}",
            order
        );
    }
}

#[test]
fn test_views_report_loading_until_inputs_arrive() {
    let mut session = Session::new(&AppConfig::default());
    assert!(session.matrix_view().is_loading());
    assert!(session.metadata_panel().is_loading());
    assert!(session.deep_link().is_loading());
    assert_eq!(ids(&session), vec!["10327", "11670"]);

    session.dataset_loaded(edges());
    let matrix = session.matrix_view().ready().unwrap();
    assert_eq!(matrix.weights, vec![vec![5.0]]);
    assert!(matrix.selected_cols.is_empty());
    assert!(session.index().is_none());
}

#[test]
fn test_selection_before_metadata_resolves_when_it_arrives() {
    let mut session = Session::new(&AppConfig::default());
    session.dataset_loaded(edges());
    session.dataset_loaded(state(STATE));
    session.click(&CellClick::new("1", "2"));
    assert!(session.displayed_metadata().is_none());

    session.dataset_loaded(metadata());
    assert_eq!(session.displayed_segment().map(SegmentId::as_str), Some("2"));
}

#[test]
fn test_missing_layer_keeps_default_selection() {
    let sink = Arc::new(InMemoryDiagnosticSink::default());
    let mut session = Session::new(&AppConfig::default()).with_diagnostics(sink.clone());
    session.dataset_loaded(metadata());
    session.dataset_loaded(state(r#"{"layers":[{"name":"other","segments":["!5"]}]}"#));

    assert_eq!(ids(&session), vec!["10327", "11670"]);
    assert_eq!(sink.count(DiagnosticKind::MissingLayer), 1);
    let link = session.deep_link().ready().unwrap();
    assert!(link.starts_with("https://neuroglancer-demo.appspot.com/#!"));
    assert!(!link.contains("10327"));
}

#[test]
fn test_layer_without_segments_keeps_default_selection() {
    let mut session = Session::new(&AppConfig::default());
    session.dataset_loaded(state(r#"{"layers":[{"name":"manc:v1.2.3"}]}"#));
    assert_eq!(ids(&session), vec!["10327", "11670"]);

    let codec = DeepLinkCodec::from_config(&AppConfig::default().viewer);
    let document = codec.decode(&session.deep_link().ready().unwrap()).unwrap();
    assert_eq!(
        document["layers"][0]["segments"],
        serde_json::json!(["10327", "11670"])
    );
}

#[test]
fn test_failed_load_is_local_to_its_consumers() {
    let sink = Arc::new(InMemoryDiagnosticSink::default());
    let mut session = Session::new(&AppConfig::default()).with_diagnostics(sink.clone());
    let err = parse_edges("not json").unwrap_err();
    session.apply(SessionEvent::Loaded(Err(err)));
    session.dataset_loaded(metadata());
    session.dataset_loaded(state(STATE));

    match session.matrix_view() {
        ViewStatus::Failed(err) => assert_eq!(err.dataset, Dataset::Edges),
        other => panic!("expected failed matrix view, got {:?}", other),
    }
    assert!(session.deep_link().ready().is_some());
    assert_eq!(
        session.metadata_panel().ready().unwrap().unwrap().segment.as_str(),
        "2"
    );
    assert!(session.index().is_none());
    assert_eq!(sink.count(DiagnosticKind::LoadFailed), 1);
}

#[test]
fn test_repeated_load_is_ignored() {
    let mut session = loaded_session();
    session.dataset_loaded(state(r#"{"layers":[{"name":"manc:v1.2.3","segments":["8"]}]}"#));
    assert_eq!(ids(&session), vec!["2"]);
    assert_eq!(decoded_segments(&session), vec!["!2"]);
}

#[test]
fn test_metadata_failure_drops_pending_display() {
    let mut session = Session::new(&AppConfig::default());
    session.dataset_loaded(state(STATE));
    session.load_failed(LoadError::MissingKeyColumn("bodyId_post".to_string()));

    assert!(session.displayed_metadata().is_none());
    assert!(session.metadata_panel().is_failed());
    assert_eq!(ids(&session), vec!["2"]);
}

#[test]
fn test_explicit_initialize_overwrites_user_edits() {
    let mut session = loaded_session();
    session.add(SegmentId::new("5"));
    let document = session.base_document().unwrap().clone();
    session.initialize_from(&document);
    assert_eq!(ids(&session), vec!["2"]);
}

#[test]
fn test_join_report_available_after_both_tables() {
    let session = loaded_session();
    let report = session.join_report().unwrap();
    assert_eq!(report.overlap, 1);
    assert!(report.columns_without_metadata.is_empty());
}
