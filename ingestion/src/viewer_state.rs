use crate::error::LoadError;
use connectome_core::diagnostics::Dataset;
use serde_json::Value;

/// Parses the base viewer-state document. Object key order is preserved so
/// re-serializing an untouched document reproduces its field layout.
pub fn parse_viewer_state(text: &str) -> Result<Value, LoadError> {
    let document: Value = serde_json::from_str(text).map_err(|source| LoadError::Json {
        dataset: Dataset::ViewerState,
        source,
    })?;

    match document.get("layers") {
        Some(Value::Array(_)) => Ok(document),
        Some(_) => Err(LoadError::Shape {
            dataset: Dataset::ViewerState,
            reason: "`layers` is not an array".to_string(),
        }),
        None => Err(LoadError::Shape {
            dataset: Dataset::ViewerState,
            reason: "missing `layers`".to_string(),
        }),
    }
}
