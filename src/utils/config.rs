//! Catalog configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::platform;

/// Query settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Explicit yt-dlp binary; discovered automatically when unset
    pub ytdlp_path: Option<PathBuf>,

    /// Video resolutions worth exposing, as printed by the tool ("WxH")
    pub target_resolutions: Vec<String>,

    /// Containers accepted for video formats
    pub video_extensions: Vec<String>,

    /// Container accepted for the audio track
    pub audio_extension: String,

    /// Resolution label the tool prints for audio-only formats
    pub audio_resolution: String,

    /// Number of words kept from the description
    pub description_word_limit: usize,

    /// Column layout of the format listing
    pub layout: CatalogLayout,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            target_resolutions: vec![
                "854x480".to_string(),
                "1280x720".to_string(),
                "1920x1080".to_string(),
                "3840x2160".to_string(),
                "4096x2160".to_string(),
            ],
            video_extensions: vec!["mp4".to_string(), "webm".to_string()],
            audio_extension: "m4a".to_string(),
            audio_resolution: "audio only".to_string(),
            description_word_limit: 20,
            layout: CatalogLayout::default(),
        }
    }
}

impl Settings {
    /// Default settings file location
    /// - Linux: ~/.config/linkloader/settings.json
    pub fn default_path() -> PathBuf {
        platform::config_dir().join("settings.json")
    }

    /// Load settings from a JSON file; missing keys keep their defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings.sanitized())
    }

    /// Load from `path` if given, else from the default location when it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let default_path = Self::default_path();
                if default_path.is_file() {
                    Self::load_from(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Enforce sane minimums
    pub fn sanitized(mut self) -> Self {
        if self.description_word_limit == 0 {
            self.description_word_limit = 1;
        }
        if self.layout.delimiters.is_empty() {
            self.layout.delimiters = CatalogLayout::default().delimiters;
        }
        self
    }
}

/// Layout of the tool's tabular format listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogLayout {
    /// Characters separating the head, transfer and codec column groups
    pub delimiters: Vec<char>,

    /// Meaning of each whitespace token in the codec group, in order
    ///
    /// Only used for listings without an `ID EXT ...` header row; when the header is
    /// present the columns are matched by name.
    pub codec_columns: Vec<CodecColumn>,
}

impl Default for CatalogLayout {
    fn default() -> Self {
        Self {
            delimiters: vec!['|', '│'],
            codec_columns: vec![
                CodecColumn::Codec,
                CodecColumn::AudioBitrate,
                CodecColumn::AudioSampleRate,
            ],
        }
    }
}

/// Role of a token in the codec column group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecColumn {
    Codec,
    AudioBitrate,
    AudioSampleRate,
    Skip,
}
