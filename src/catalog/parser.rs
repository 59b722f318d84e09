//! Parser for the tool's tabular format listing (`yt-dlp -F`)
//!
//! yt-dlp prints a header row followed by one padded row per format:
//!
//! ```text
//! ID  EXT   RESOLUTION FPS CH │  FILESIZE   TBR PROTO │ VCODEC        VBR ACODEC      ABR ASR MORE INFO
//! 140 m4a   audio only      2 │            129k https │ audio only        mp4a.40.2  129k 44k [en] medium
//! ```
//!
//! Every cell is padded to its column width, either left-aligned (starts under the
//! header name) or right-aligned (ends under it). A value therefore always overlaps
//! its header name, which is how cells are matched to columns; blank cells simply
//! leave their field at its default. Listings without a header row fall back to
//! positional rules driven by [`CatalogLayout`].
//!
//! Rows that are not format entries (banners, separators) are skipped rather than
//! failing the whole listing.

use crate::catalog::models::{FormatRecord, NOT_AVAILABLE};
use crate::utils::config::{CatalogLayout, CodecColumn};
use tracing::debug;

const APPROX_MARKERS: [&str; 2] = ["≈", "~"];

const KNOWN_PROTOCOLS: [&str; 8] = [
    "dash",
    "mhtml",
    "rtmp",
    "rtsp",
    "f4m",
    "ism",
    "mms",
    "websocket_frag",
];

/// Parse a whole listing, preserving row order
pub fn parse_formats(stdout: &str, layout: &CatalogLayout) -> Vec<FormatRecord> {
    let mut header: Option<HeaderColumns> = None;
    let mut formats = Vec::new();

    for line in stdout.lines() {
        if let Some(columns) = HeaderColumns::from_line(line, layout) {
            debug!("Listing header has {} columns", columns.columns.len());
            header = Some(columns);
            continue;
        }

        let record = match &header {
            Some(columns) => columns.parse_row(line, layout),
            None => parse_line(line, layout),
        };
        formats.extend(record);
    }

    formats
}

/// Parse a single row without a header, by position; `None` for non-format rows
pub fn parse_line(line: &str, layout: &CatalogLayout) -> Option<FormatRecord> {
    let is_delimiter = |c: char| layout.delimiters.contains(&c);

    let mut groups = line.splitn(3, is_delimiter);
    let head = groups.next()?;
    let transfer = groups.next()?;
    // Anything past a third delimiter is not part of the codec group
    let codec = groups.next()?.split(is_delimiter).next().unwrap_or_default();

    let head_tokens = merge_only(head.split_whitespace());
    if is_header(head_tokens.iter().map(String::as_str)) {
        return None;
    }

    let mut head_tokens = head_tokens.into_iter();
    let (Some(id), Some(extension), Some(resolution)) =
        (head_tokens.next(), head_tokens.next(), head_tokens.next())
    else {
        debug!("Skipping listing row without id/ext/resolution: {:?}", line);
        return None;
    };

    let mut record = FormatRecord::new(id, extension, resolution);
    record.fps = head_tokens.next();

    let (filesize, bitrate, protocol) = split_transfer(transfer);
    record.filesize = filesize;
    record.bitrate = bitrate;
    record.protocol = protocol;

    apply_codec_columns(&mut record, codec, &layout.codec_columns);

    Some(record)
}

/// Record field a header column feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Extension,
    Resolution,
    Fps,
    Filesize,
    Bitrate,
    Protocol,
    VideoCodec,
    AudioCodec,
    AudioBitrate,
    AudioSampleRate,
    Other,
}

impl Field {
    fn from_header(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "ID" => Field::Id,
            "EXT" => Field::Extension,
            "RESOLUTION" => Field::Resolution,
            "FPS" => Field::Fps,
            "FILESIZE" => Field::Filesize,
            "TBR" => Field::Bitrate,
            "PROTO" => Field::Protocol,
            "VCODEC" => Field::VideoCodec,
            "ACODEC" => Field::AudioCodec,
            "ABR" => Field::AudioBitrate,
            "ASR" => Field::AudioSampleRate,
            _ => Field::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Column {
    field: Field,
    start: usize,
    end: usize,
}

/// Column positions taken from the listing's header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderColumns {
    columns: Vec<Column>,
}

impl HeaderColumns {
    /// Recognise a header row (`ID EXT ...` with both group delimiters)
    pub fn from_line(line: &str, layout: &CatalogLayout) -> Option<Self> {
        if count_delimiters(line, layout) < 2 {
            return None;
        }

        let tokens: Vec<Token> = tokenize(line)
            .into_iter()
            .filter(|t| !is_delimiter_token(&t.text, layout))
            .collect();
        if !is_header(tokens.iter().map(|t| t.text.as_str())) {
            return None;
        }

        let columns = tokens
            .into_iter()
            .map(|t| Column {
                field: Field::from_header(&t.text),
                start: t.start,
                end: t.end,
            })
            .collect();
        Some(Self { columns })
    }

    /// Parse a row aligned under this header; `None` for non-format rows
    pub fn parse_row(&self, line: &str, layout: &CatalogLayout) -> Option<FormatRecord> {
        if count_delimiters(line, layout) < 2 {
            return None;
        }

        let mut cells: Vec<Option<String>> = vec![None; self.columns.len()];
        let mut current: Option<usize> = None;

        for token in fold_approx(tokenize(line)) {
            if is_delimiter_token(&token.text, layout) {
                current = None;
                continue;
            }
            // A token that overlaps no header name continues the previous cell ("audio only")
            if let Some(index) = self.column_at(&token) {
                current = Some(index);
            }
            let Some(index) = current else {
                continue;
            };
            match &mut cells[index] {
                Some(cell) => {
                    cell.push(' ');
                    cell.push_str(&token.text);
                }
                empty => *empty = Some(token.text),
            }
        }

        let mut value = |field: Field| -> Option<String> {
            self.columns
                .iter()
                .zip(cells.iter_mut())
                .filter(|(column, _)| column.field == field)
                .find_map(|(_, cell)| cell.take())
        };

        let (Some(id), Some(extension), Some(resolution)) = (
            value(Field::Id),
            value(Field::Extension),
            value(Field::Resolution),
        ) else {
            debug!("Skipping listing row without id/ext/resolution: {:?}", line);
            return None;
        };

        let mut record = FormatRecord::new(id, extension, resolution);
        record.fps = value(Field::Fps);
        record.protocol = value(Field::Protocol);
        if let Some(filesize) = value(Field::Filesize) {
            record.filesize = filesize;
        }
        if let Some(bitrate) = value(Field::Bitrate) {
            record.bitrate = bitrate;
        }
        if let Some(codec) = pick_codec(value(Field::VideoCodec), value(Field::AudioCodec)) {
            record.codec = codec;
        }
        if let Some(abr) = value(Field::AudioBitrate) {
            record.audio_bitrate = abr;
        }
        if let Some(asr) = value(Field::AudioSampleRate) {
            record.audio_sample_rate = asr;
        }

        Some(record)
    }

    fn column_at(&self, token: &Token) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| token.start < column.end && column.start < token.end)
    }
}

/// Whitespace-separated word with its char span in the line
#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    start: usize,
    end: usize,
    text: String,
}

fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    // (char offset, byte offset) of the token being read
    let mut open: Option<(usize, usize)> = None;
    let mut width = 0;

    for (offset, (byte, ch)) in line.char_indices().enumerate() {
        if ch.is_whitespace() {
            if let Some((start, byte_start)) = open.take() {
                tokens.push(Token {
                    start,
                    end: offset,
                    text: line[byte_start..byte].to_string(),
                });
            }
        } else if open.is_none() {
            open = Some((offset, byte));
        }
        width = offset + 1;
    }

    if let Some((start, byte_start)) = open {
        tokens.push(Token {
            start,
            end: width,
            text: line[byte_start..].to_string(),
        });
    }
    tokens
}

/// Attach a standalone "≈"/"~" size marker to the value after it
fn fold_approx(tokens: Vec<Token>) -> Vec<Token> {
    let mut folded = Vec::with_capacity(tokens.len());
    let mut marker: Option<Token> = None;

    for token in tokens {
        if APPROX_MARKERS.contains(&token.text.as_str()) {
            marker = Some(token);
            continue;
        }
        match marker.take() {
            Some(marker) => folded.push(Token {
                start: marker.start,
                end: token.end,
                text: format!("{}{}", marker.text, token.text),
            }),
            None => folded.push(token),
        }
    }
    folded
}

fn count_delimiters(line: &str, layout: &CatalogLayout) -> usize {
    line.chars()
        .filter(|c| layout.delimiters.contains(c))
        .count()
}

fn is_delimiter_token(text: &str, layout: &CatalogLayout) -> bool {
    let mut chars = text.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if layout.delimiters.contains(&c))
}

fn is_header<'a>(mut tokens: impl Iterator<Item = &'a str>) -> bool {
    matches!(
        (tokens.next(), tokens.next()),
        (Some(id), Some(ext)) if id.eq_ignore_ascii_case("id") && ext.eq_ignore_ascii_case("ext")
    )
}

/// Video codec, or the audio codec when the video column is a placeholder
fn pick_codec(video: Option<String>, audio: Option<String>) -> Option<String> {
    [video, audio]
        .into_iter()
        .flatten()
        .find(|codec| !codec.ends_with(" only") && codec.as_str() != "none")
}

/// Join "<word> only" pairs ("audio only", "video only") into one token
fn merge_only<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for token in tokens {
        match merged.last_mut() {
            Some(prev) if token == "only" && !prev.ends_with(" only") => {
                prev.push_str(" only");
            }
            _ => merged.push(token.to_string()),
        }
    }
    merged
}

/// Filesize, total bitrate and protocol hint from the middle group, by value shape
fn split_transfer(group: &str) -> (String, String, Option<String>) {
    let mut filesize = None;
    let mut bitrate = None;
    let mut protocol = None;

    for token in fold_approx(tokenize(group)) {
        let text = token.text;
        if protocol.is_none() && is_protocol(&text) {
            protocol = Some(text);
        } else if filesize.is_none() && is_size(&text) {
            filesize = Some(text);
        } else if bitrate.is_none() && is_bitrate(&text) {
            bitrate = Some(text);
        } else {
            debug!("Ignoring unrecognised transfer value {:?}", text);
        }
    }

    (
        filesize.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        bitrate.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        protocol,
    )
}

fn starts_with_digit(value: &str) -> bool {
    value.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// "1.14MiB", "≈7.44MiB", "~20.11MiB", "512KiB"
fn is_size(token: &str) -> bool {
    let value = token.trim_start_matches(|c: char| c == '≈' || c == '~');
    starts_with_digit(value) && value.ends_with('B')
}

/// "129k"
fn is_bitrate(token: &str) -> bool {
    starts_with_digit(token) && token.ends_with('k')
}

fn is_protocol(token: &str) -> bool {
    token.split('+').all(|part| {
        let part = part.to_ascii_lowercase();
        part.starts_with("http") || part.starts_with("m3u8") || KNOWN_PROTOCOLS.contains(&part.as_str())
    })
}

fn apply_codec_columns(record: &mut FormatRecord, group: &str, columns: &[CodecColumn]) {
    let tokens = merge_only(group.split_whitespace());
    for (column, value) in columns.iter().zip(tokens) {
        match column {
            CodecColumn::Codec => record.codec = value,
            CodecColumn::AudioBitrate => record.audio_bitrate = value,
            CodecColumn::AudioSampleRate => record.audio_sample_rate = value,
            CodecColumn::Skip => {}
        }
    }
}
