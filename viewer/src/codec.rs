use crate::document::{
    find_layer, find_layer_mut, ViewerDocument, SEGMENTS_FIELD, SEGMENT_QUERY_FIELD,
};
use connectome_core::config::ViewerConfig;
use connectome_core::error::{ConnectomeError, ErrorCode};
use connectome_core::SegmentId;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use thiserror::Error;

/// Bytes left unescaped by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("link does not start with {expected}")]
    ForeignLink { expected: String },
    #[error("fragment is not valid UTF-8 after unescaping")]
    InvalidEscape(#[from] std::str::Utf8Error),
    #[error("fragment is not a JSON document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}

impl ConnectomeError for CodecError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidArgument
    }
}

/// Turns a base viewer document plus a selection into a viewer deep link.
#[derive(Debug, Clone, PartialEq)]
pub struct DeepLinkCodec {
    base_url: String,
    fragment_marker: String,
}

impl DeepLinkCodec {
    pub fn new(base_url: impl Into<String>, fragment_marker: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            fragment_marker: fragment_marker.into(),
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(config.base_url.clone(), config.fragment_marker.clone())
    }

    fn prefix(&self) -> String {
        format!("{}{}", self.base_url, self.fragment_marker)
    }

    pub fn encode(&self, base: &ViewerDocument, selection: &[SegmentId]) -> String {
        let state = apply_selection(base, selection);
        let escaped = utf8_percent_encode(&state.to_string(), URI_COMPONENT).to_string();
        format!("{}{}", self.prefix(), escaped)
    }

    pub fn decode(&self, link: &str) -> Result<Value, CodecError> {
        let prefix = self.prefix();
        let fragment = link
            .strip_prefix(prefix.as_str())
            .ok_or(CodecError::ForeignLink { expected: prefix.clone() })?;
        let json = percent_decode_str(fragment).decode_utf8()?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Decodes a pasted link into a base document for `layer_name`.
    pub fn decode_document(
        &self,
        link: &str,
        layer_name: impl Into<String>,
    ) -> Result<ViewerDocument, CodecError> {
        Ok(ViewerDocument::new(self.decode(link)?, layer_name))
    }

    /// Decodes a link and returns the named layer's segments with the
    /// sentinel stripped. `None` when the layer or its segments are absent.
    pub fn decode_segments(
        &self,
        link: &str,
        layer_name: &str,
    ) -> Result<Option<Vec<SegmentId>>, CodecError> {
        let document = self.decode(link)?;
        Ok(find_layer(&document, layer_name)
            .and_then(|layer| layer.get(SEGMENTS_FIELD))
            .and_then(Value::as_array)
            .map(|segments| segments.iter().filter_map(SegmentId::from_json).collect()))
    }
}

/// Copy of the base document with the named layer's `segments` replaced by
/// the selection, spelled in the document's own convention.
///
/// A non-empty selection also sets `segmentQuery` to its first id; an empty
/// selection drops `segmentQuery`. Without the layer the copy is unchanged.
pub fn apply_selection(base: &ViewerDocument, selection: &[SegmentId]) -> Value {
    let mut state = base.document().clone();
    let convention = base.convention();

    let Some(layer) = find_layer_mut(&mut state, base.layer_name()).and_then(Value::as_object_mut)
    else {
        return state;
    };

    let segments = selection
        .iter()
        .map(|id| Value::String(convention.format(id)))
        .collect();
    layer.insert(SEGMENTS_FIELD.to_string(), Value::Array(segments));

    match selection.first() {
        Some(first) => {
            layer.insert(
                SEGMENT_QUERY_FIELD.to_string(),
                Value::String(first.as_str().to_string()),
            );
        }
        None => layer.retain(|key, _| key != SEGMENT_QUERY_FIELD),
    }

    state
}
