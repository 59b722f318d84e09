//! Format selection policy
//!
//! Keeps the video formats at the configured target resolutions and appends the
//! single best audio-only track.

use crate::catalog::models::FormatRecord;
use crate::utils::config::Settings;
use std::cmp::Ordering;

/// Which formats are worth exposing to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub target_resolutions: Vec<String>,
    pub video_extensions: Vec<String>,
    pub audio_extension: String,
    pub audio_resolution: String,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl SelectionPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            target_resolutions: settings.target_resolutions.clone(),
            video_extensions: settings.video_extensions.clone(),
            audio_extension: settings.audio_extension.clone(),
            audio_resolution: settings.audio_resolution.clone(),
        }
    }

    /// Video candidates in listing order, then at most one audio track
    pub fn select(&self, formats: &[FormatRecord]) -> Vec<FormatRecord> {
        let mut selected: Vec<FormatRecord> = formats
            .iter()
            .filter(|f| self.is_target_video(f))
            .cloned()
            .collect();

        if let Some(audio) = self.best_audio(formats) {
            selected.push(audio.clone());
        }

        selected
    }

    pub fn is_target_video(&self, format: &FormatRecord) -> bool {
        self.video_extensions.contains(&format.extension)
            && self.target_resolutions.contains(&format.resolution)
    }

    pub fn is_audio_candidate(&self, format: &FormatRecord) -> bool {
        format.extension == self.audio_extension && format.resolution == self.audio_resolution
    }

    /// Highest-bitrate audio candidate; the first one seen wins ties
    pub fn best_audio<'a>(&self, formats: &'a [FormatRecord]) -> Option<&'a FormatRecord> {
        let mut best: Option<&FormatRecord> = None;
        for candidate in formats.iter().filter(|f| self.is_audio_candidate(f)) {
            let replace = match best {
                None => true,
                Some(current) => {
                    compare_bitrate(audio_bitrate(candidate), audio_bitrate(current))
                        == Ordering::Greater
                }
            };
            if replace {
                best = Some(candidate);
            }
        }
        best
    }
}

/// Audio bitrate of a record, falling back to the total bitrate column
fn audio_bitrate(format: &FormatRecord) -> Option<f64> {
    leading_number(&format.audio_bitrate).or_else(|| leading_number(&format.bitrate))
}

/// Non-numeric bitrates rank below every numeric one
fn compare_bitrate(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Numeric prefix of a column value ("129k" -> 129, "N/A" -> None)
pub fn leading_number(value: &str) -> Option<f64> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    value[..end].parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str, ext: &str, resolution: &str) -> FormatRecord {
        FormatRecord::new(id, ext, resolution)
    }

    fn audio(id: &str, abr: &str) -> FormatRecord {
        let mut record = FormatRecord::new(id, "m4a", "audio only");
        record.audio_bitrate = abr.to_string();
        record
    }

    #[test]
    fn test_keeps_target_videos_in_order() {
        let formats = vec![
            video("137", "mp4", "1920x1080"),
            video("18", "mp4", "640x360"),
            video("247", "webm", "1280x720"),
            video("399", "mkv", "1920x1080"),
            video("135", "mp4", "854x480"),
        ];
        let selected = SelectionPolicy::default().select(&formats);
        let ids: Vec<&str> = selected.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["137", "247", "135"]);
    }

    #[test]
    fn test_highest_audio_bitrate_wins() {
        let formats = vec![audio("a", "128k"), audio("b", "256k")];
        let selected = SelectionPolicy::default().select(&formats);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "b");
    }

    #[test]
    fn test_numeric_beats_not_available() {
        let formats = vec![audio("na", "N/A"), audio("low", "96k")];
        let selected = SelectionPolicy::default().select(&formats);
        assert_eq!(selected[0].id, "low");

        let formats = vec![audio("low", "96"), audio("na", "N/A")];
        let selected = SelectionPolicy::default().select(&formats);
        assert_eq!(selected[0].id, "low");
    }

    #[test]
    fn test_first_seen_wins_ties() {
        let formats = vec![audio("first", "128k"), audio("second", "128k")];
        let selected = SelectionPolicy::default().select(&formats);
        assert_eq!(selected[0].id, "first");
    }

    #[test]
    fn test_total_bitrate_fallback() {
        let mut listed = audio("tbr-only", "mp4a.40.5");
        listed.bitrate = "160k".to_string();
        let formats = vec![audio("abr", "129k"), listed];
        let selected = SelectionPolicy::default().select(&formats);
        assert_eq!(selected[0].id, "tbr-only");
    }

    #[test]
    fn test_audio_appended_after_videos() {
        let formats = vec![
            audio("140", "129k"),
            video("22", "mp4", "1280x720"),
            FormatRecord::new("251", "webm", "audio only"),
        ];
        let selected = SelectionPolicy::default().select(&formats);
        let ids: Vec<&str> = selected.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["22", "140"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(SelectionPolicy::default().select(&[]).is_empty());
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("129k"), Some(129.0));
        assert_eq!(leading_number("49.5k"), Some(49.5));
        assert_eq!(leading_number("256"), Some(256.0));
        assert_eq!(leading_number("N/A"), None);
        assert_eq!(leading_number(""), None);
    }
}
