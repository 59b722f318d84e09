//! Linkloader library

pub mod catalog;
pub mod extractor;
pub mod utils;

// Re-export main types for easier use
pub use catalog::{CatalogPipeline, CatalogResponse, FormatRecord, SelectionPolicy, VideoMetadata};
pub use extractor::{MediaTool, ToolOutput, YtDlpTool};
pub use utils::{CatalogError, Settings, ToolError};
