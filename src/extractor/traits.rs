use crate::extractor::models::ToolOutput;
use crate::utils::error::ToolError;
use async_trait::async_trait;

/// Capability to drive an external media-extraction tool
///
/// This trait isolates the catalog pipeline from how the tool is run
/// (a local yt-dlp binary, a remote worker, a scripted fake in tests).
/// Implementations report the raw exit status and output; interpreting them
/// is the caller's job.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Returns a short identifier for this tool (e.g., "yt-dlp")
    fn id(&self) -> &'static str;

    /// Prints title, description and thumbnail, one per line
    async fn fetch_metadata_fields(&self, url: &str) -> Result<ToolOutput, ToolError>;

    /// Prints the tabular list of available formats
    async fn list_formats(&self, url: &str) -> Result<ToolOutput, ToolError>;

    /// Prints the direct download URL for one format
    async fn resolve_link(&self, url: &str, format_id: &str) -> Result<ToolOutput, ToolError>;
}
