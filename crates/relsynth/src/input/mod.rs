//! Input parsing and dataset loading.

mod loader;
mod reader;
mod source;

pub use loader::{DatasetLoader, DatasetManifest, ResourceManifest};
pub use reader::{ReaderConfig, TableReader};
pub use source::{DataTable, SourceMetadata};
