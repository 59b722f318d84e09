//! Data structures for catalog queries

use serde::{Deserialize, Serialize};

/// Placeholder for columns the listing left blank
pub const NOT_AVAILABLE: &str = "N/A";

/// Title, description and thumbnail of a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub thumbnail: String,
}

/// One selectable encoding from the tool's format listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRecord {
    pub id: String,
    pub extension: String,
    pub resolution: String,
    pub fps: Option<String>,
    pub filesize: String,
    #[serde(rename = "tbr")]
    pub bitrate: String,
    /// Transport hint from the listing (https, m3u8, ...). Never a link.
    pub protocol: Option<String>,
    pub codec: String,
    #[serde(rename = "abr")]
    pub audio_bitrate: String,
    #[serde(rename = "asr")]
    pub audio_sample_rate: String,
    pub download_link: Option<String>,
}

impl FormatRecord {
    /// Record with every optional column at its default
    pub fn new(
        id: impl Into<String>,
        extension: impl Into<String>,
        resolution: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            extension: extension.into(),
            resolution: resolution.into(),
            fps: None,
            filesize: NOT_AVAILABLE.to_string(),
            bitrate: NOT_AVAILABLE.to_string(),
            protocol: None,
            codec: NOT_AVAILABLE.to_string(),
            audio_bitrate: NOT_AVAILABLE.to_string(),
            audio_sample_rate: NOT_AVAILABLE.to_string(),
            download_link: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.download_link.as_deref().is_some_and(|l| !l.is_empty())
    }
}

/// Successful query payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub error: bool,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub formats: Vec<FormatRecord>,
}

impl CatalogResponse {
    pub fn new(metadata: VideoMetadata, formats: Vec<FormatRecord>) -> Self {
        Self {
            error: false,
            title: metadata.title,
            description: metadata.description,
            thumbnail: metadata.thumbnail,
            formats,
        }
    }
}

/// Failed query payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: bool,
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_wire_keys() {
        let mut record = FormatRecord::new("140", "m4a", "audio only");
        record.download_link = Some("https://cdn.example/140".to_string());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["tbr"], "N/A");
        assert_eq!(json["abr"], "N/A");
        assert_eq!(json["asr"], "N/A");
        assert_eq!(json["download_link"], "https://cdn.example/140");
        assert!(json["fps"].is_null());
    }

    #[test]
    fn test_is_resolved() {
        let mut record = FormatRecord::new("18", "mp4", "640x360");
        assert!(!record.is_resolved());
        record.download_link = Some(String::new());
        assert!(!record.is_resolved());
        record.download_link = Some("https://cdn.example/18".to_string());
        assert!(record.is_resolved());
    }
}
