//! Title/description/thumbnail extraction from the metadata invocation

use crate::catalog::models::VideoMetadata;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const NO_DESCRIPTION: &str = "No description available";

/// Parse one field per line: title, description, thumbnail
pub fn parse_metadata(stdout: &str, word_limit: usize) -> VideoMetadata {
    let mut lines = stdout.lines().map(|line| line.trim_end_matches('\r'));

    let title = non_blank(lines.next())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let description = non_blank(lines.next())
        .map(|line| truncate_words(line, word_limit))
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    let thumbnail = lines
        .next()
        .map(str::trim)
        .filter(|value| value.contains("http"))
        .unwrap_or_default()
        .to_string();

    VideoMetadata {
        title,
        description,
        thumbnail,
    }
}

fn non_blank(line: Option<&str>) -> Option<&str> {
    line.filter(|l| !l.trim().is_empty())
}

fn truncate_words(line: &str, limit: usize) -> String {
    line.split_whitespace()
        .take(limit)
        .collect::<Vec<_>>()
        .join(" ")
}
