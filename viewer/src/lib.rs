//! Viewer state handling: the base document with its segment spelling
//! convention, and the deep-link codec built on top of it.

pub mod codec;
pub mod document;

pub use codec::{apply_selection, CodecError, DeepLinkCodec};
pub use document::{SegmentConvention, ViewerDocument};
