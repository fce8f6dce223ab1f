use connectome_core::ids::has_sentinel;
use connectome_core::SegmentId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const LAYERS_FIELD: &str = "layers";
pub const NAME_FIELD: &str = "name";
pub const SEGMENTS_FIELD: &str = "segments";
pub const SEGMENT_QUERY_FIELD: &str = "segmentQuery";

/// How a document spells the entries of its `segments` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SegmentConvention {
    /// Every entry carries the `!` sentinel.
    Prefixed,
    #[default]
    Bare,
}

impl SegmentConvention {
    /// Infers the convention from the first existing segment entry. Numbers
    /// and missing entries count as bare.
    pub fn detect(first: Option<&Value>) -> Self {
        match first {
            Some(Value::String(s)) if has_sentinel(s) => SegmentConvention::Prefixed,
            _ => SegmentConvention::Bare,
        }
    }

    pub fn format(&self, id: &SegmentId) -> String {
        match self {
            SegmentConvention::Prefixed => id.prefixed(),
            SegmentConvention::Bare => id.as_str().to_string(),
        }
    }
}

/// Base viewer state plus the properties derived from it once on load.
///
/// The wrapped document is never mutated; encoding always works on a copy.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerDocument {
    document: Value,
    layer_name: String,
    convention: SegmentConvention,
}

impl ViewerDocument {
    pub fn new(document: Value, layer_name: impl Into<String>) -> Self {
        let layer_name = layer_name.into();
        let convention = SegmentConvention::detect(
            find_layer(&document, &layer_name)
                .and_then(|layer| layer.get(SEGMENTS_FIELD))
                .and_then(Value::as_array)
                .and_then(|segments| segments.first()),
        );
        Self {
            document,
            layer_name,
            convention,
        }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn layer_name(&self) -> &str {
        &self.layer_name
    }

    pub fn convention(&self) -> SegmentConvention {
        self.convention
    }

    pub fn layer(&self) -> Option<&Value> {
        find_layer(&self.document, &self.layer_name)
    }

    pub fn has_layer(&self) -> bool {
        self.layer().is_some()
    }

    /// Segment ids of the named layer with the sentinel stripped. `None`
    /// when the layer or its `segments` field is absent.
    pub fn layer_segments(&self) -> Option<Vec<SegmentId>> {
        let segments = self.layer()?.get(SEGMENTS_FIELD)?.as_array()?;
        Some(segments.iter().filter_map(SegmentId::from_json).collect())
    }
}

pub fn find_layer<'a>(document: &'a Value, name: &str) -> Option<&'a Value> {
    document
        .get(LAYERS_FIELD)?
        .as_array()?
        .iter()
        .find(|layer| layer.get(NAME_FIELD).and_then(Value::as_str) == Some(name))
}

pub fn find_layer_mut<'a>(document: &'a mut Value, name: &str) -> Option<&'a mut Value> {
    document
        .get_mut(LAYERS_FIELD)?
        .as_array_mut()?
        .iter_mut()
        .find(|layer| layer.get(NAME_FIELD).and_then(Value::as_str) == Some(name))
}
