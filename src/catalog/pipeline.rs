//! Catalog query pipeline
//!
//! metadata -> format listing -> selection -> link resolution, stopping at the
//! first stage that fails.

use crate::catalog::metadata::parse_metadata;
use crate::catalog::models::{CatalogResponse, FormatRecord, VideoMetadata};
use crate::catalog::parser::parse_formats;
use crate::catalog::resolver::LinkResolver;
use crate::catalog::selection::SelectionPolicy;
use crate::extractor::traits::MediaTool;
use crate::utils::config::Settings;
use crate::utils::error::CatalogError;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Answers catalog queries for video URLs
///
/// Holds no per-request state, so one pipeline can serve concurrent queries.
#[derive(Clone)]
pub struct CatalogPipeline {
    tool: Arc<dyn MediaTool>,
    settings: Settings,
    policy: SelectionPolicy,
    resolver: LinkResolver,
}

impl CatalogPipeline {
    pub fn new(tool: Arc<dyn MediaTool>, settings: Settings) -> Self {
        let settings = settings.sanitized();
        Self {
            policy: SelectionPolicy::from_settings(&settings),
            resolver: LinkResolver::new(Arc::clone(&tool)),
            tool,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Metadata plus the selected formats, each with a direct link
    pub async fn query(&self, url: &str) -> Result<CatalogResponse, CatalogError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(CatalogError::MissingInput);
        }

        let span = info_span!("catalog_query", request_id = %Uuid::new_v4(), tool = self.tool.id());
        self.run(url).instrument(span).await
    }

    async fn run(&self, url: &str) -> Result<CatalogResponse, CatalogError> {
        info!("Querying formats for {}", url);

        let metadata = self.fetch_metadata(url).await?;
        let catalog = self.fetch_catalog(url).await?;

        let selected = self.policy.select(&catalog);
        if selected.is_empty() {
            warn!(
                "None of the {} listed formats matched the selection policy",
                catalog.len()
            );
            return Err(CatalogError::NoFormatsAvailable);
        }
        debug!("Selected {} of {} formats", selected.len(), catalog.len());

        let formats = self.resolver.resolve(url, selected).await?;
        debug_assert!(formats.iter().all(FormatRecord::is_resolved));

        info!("Query for {} returned {} formats", url, formats.len());
        Ok(CatalogResponse::new(metadata, formats))
    }

    async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata, CatalogError> {
        let output = self
            .tool
            .fetch_metadata_fields(url)
            .await
            .map_err(|e| CatalogError::MetadataFetch {
                details: e.to_string(),
            })?;

        if !output.is_success() {
            warn!("Metadata fetch failed for {}", url);
            return Err(CatalogError::MetadataFetch {
                details: output.stderr,
            });
        }

        Ok(parse_metadata(
            &output.stdout,
            self.settings.description_word_limit,
        ))
    }

    async fn fetch_catalog(&self, url: &str) -> Result<Vec<FormatRecord>, CatalogError> {
        let output = self
            .tool
            .list_formats(url)
            .await
            .map_err(|e| CatalogError::FormatList {
                details: e.to_string(),
            })?;

        if !output.is_success() {
            warn!("Format listing failed for {}", url);
            return Err(CatalogError::FormatList {
                details: output.stderr,
            });
        }

        let catalog = parse_formats(&output.stdout, &self.settings.layout);
        if catalog.is_empty() {
            warn!("Format listing for {} contained no parsable rows", url);
            return Err(CatalogError::NoFormatsAvailable);
        }
        Ok(catalog)
    }
}
