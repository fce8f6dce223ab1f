pub mod index;
pub mod matrix;
pub mod metadata;

pub use index::{DatasetIndex, JoinReport};
pub use matrix::ConnectivityMatrix;
pub use metadata::MetadataIndex;
