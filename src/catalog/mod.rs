pub mod metadata;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod selection;

pub use metadata::parse_metadata;
pub use models::{CatalogResponse, ErrorBody, FormatRecord, VideoMetadata};
pub use parser::parse_formats;
pub use pipeline::CatalogPipeline;
pub use resolver::LinkResolver;
pub use selection::SelectionPolicy;
