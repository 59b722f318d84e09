//! Concurrent direct-link resolution for selected formats

use crate::catalog::models::FormatRecord;
use crate::extractor::traits::MediaTool;
use crate::utils::error::CatalogError;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Resolves a direct download link for every selected format
#[derive(Clone)]
pub struct LinkResolver {
    tool: Arc<dyn MediaTool>,
}

impl LinkResolver {
    pub fn new(tool: Arc<dyn MediaTool>) -> Self {
        Self { tool }
    }

    /// Resolve all formats concurrently
    ///
    /// Returns the formats in their input order, each with `download_link` set, or
    /// the first failure observed. Results of the other invocations are dropped;
    /// processes already started are left to finish on their own.
    pub async fn resolve(
        &self,
        url: &str,
        formats: Vec<FormatRecord>,
    ) -> Result<Vec<FormatRecord>, CatalogError> {
        let count = formats.len();
        debug!("Resolving {} download links for {}", count, url);

        let resolved = try_join_all(
            formats
                .into_iter()
                .map(|format| self.resolve_one(url, format)),
        )
        .await?;

        info!("Resolved {} download links", count);
        Ok(resolved)
    }

    async fn resolve_one(
        &self,
        url: &str,
        mut format: FormatRecord,
    ) -> Result<FormatRecord, CatalogError> {
        if format.id.trim().is_empty() {
            error!("Selected format without id: {:?}", format);
            return Err(CatalogError::LinkResolution {
                format_id: String::new(),
                message: format!(
                    "Invalid format ID for {} {}",
                    format.extension, format.resolution
                ),
                details: None,
            });
        }

        let failure = |details: Option<String>| CatalogError::LinkResolution {
            format_id: format.id.clone(),
            message: format!("Error fetching download link for format {}.", format.id),
            details,
        };

        let output = self
            .tool
            .resolve_link(url, &format.id)
            .await
            .map_err(|e| failure(Some(e.to_string())))?;

        if !output.is_success() {
            error!(
                "Failed to get direct URL for format {}: {}",
                format.id,
                output.stderr.trim()
            );
            return Err(failure(Some(output.stderr)));
        }

        let link = output.stdout.trim();
        if link.is_empty() {
            error!("yt-dlp printed no URL for format {}", format.id);
            return Err(failure(Some(output.stderr)));
        }

        format.download_link = Some(link.to_string());
        Ok(format)
    }
}
