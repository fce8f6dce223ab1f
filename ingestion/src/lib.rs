pub mod edges;
pub mod error;
pub mod metadata;
pub mod source;
pub mod viewer_state;

pub use error::LoadError;
pub use metadata::MetadataTable;
pub use source::{load, DatasetSource, FileSource, InMemorySource, LoadedDataset};
