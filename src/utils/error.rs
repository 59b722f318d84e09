//! Error handling for Linkloader

use crate::catalog::models::ErrorBody;
use thiserror::Error;

/// Failures raised while invoking the external media tool itself
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("yt-dlp not found. Please install yt-dlp")]
    NotFound,

    #[error("Failed to run yt-dlp: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Error returned by a catalog query
///
/// Every variant carries a stable [`kind`](CatalogError::kind) tag so callers can
/// branch on it without matching display strings.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("No video URL provided.")]
    MissingInput,

    #[error("Error fetching metadata.")]
    MetadataFetch { details: String },

    #[error("Error fetching formats.")]
    FormatList { details: String },

    #[error("No formats available.")]
    NoFormatsAvailable,

    #[error("{message}")]
    LinkResolution {
        format_id: String,
        message: String,
        details: Option<String>,
    },

    #[error("Media tool unavailable.")]
    ToolUnavailable { details: String },
}

impl From<ToolError> for CatalogError {
    fn from(err: ToolError) -> Self {
        CatalogError::ToolUnavailable {
            details: err.to_string(),
        }
    }
}

impl CatalogError {
    /// Stable machine-readable tag
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::MissingInput => "missing_input",
            CatalogError::MetadataFetch { .. } => "metadata_fetch",
            CatalogError::FormatList { .. } => "format_list",
            CatalogError::NoFormatsAvailable => "no_formats_available",
            CatalogError::LinkResolution { .. } => "link_resolution",
            CatalogError::ToolUnavailable { .. } => "tool_unavailable",
        }
    }

    /// Diagnostic text produced by the tool, if any
    pub fn details(&self) -> Option<&str> {
        match self {
            CatalogError::MetadataFetch { details }
            | CatalogError::FormatList { details }
            | CatalogError::ToolUnavailable { details } => Some(details.as_str()),
            CatalogError::LinkResolution { details, .. } => details.as_deref(),
            CatalogError::MissingInput | CatalogError::NoFormatsAvailable => None,
        }
    }

    /// HTTP status an outer web layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::MissingInput => 400,
            CatalogError::NoFormatsAvailable => 404,
            CatalogError::ToolUnavailable { .. } => 503,
            CatalogError::MetadataFetch { .. }
            | CatalogError::FormatList { .. }
            | CatalogError::LinkResolution { .. } => 500,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: true,
            kind: self.kind().to_string(),
            message: self.to_string(),
            details: self.details().map(str::to_string),
        }
    }
}
