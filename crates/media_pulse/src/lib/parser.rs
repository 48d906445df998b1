//! # Yt Parser
//!
//! Scraping helpers for YouTube watch pages: pulls the caption track list out
//! of the embedded `ytInitialPlayerResponse`, parses timedtext XML into
//! [`CaptionFragment`]s, and validates video identifiers.

use std::{ops::Deref, sync::LazyLock};

use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::{error::Error, types::CaptionFragment};

static YT_PLAYER_RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)var\s+ytInitialPlayerResponse\s*=\s*(\{.*?\});\s*(?:var\s+\w+\s*=|</script>)",
    )
    .unwrap()
});

static TIMEDTEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<text\s+start="([\d.]+)"(?:\s+dur="([\d.]+)")?[^>]*>(.*?)</text>"#).unwrap()
});

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|amp|lt|gt|quot|apos);").unwrap());

/// Styling markup YouTube inlines into caption text.
static INLINE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?(?:font|b|i|u)\b[^>]*>").unwrap());

static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

static VIDEO_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|//|\.)(?:youtube\.com/(?:watch\?(?:[^#\s]*&)?v=|shorts/|embed/|live/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
    )
    .unwrap()
});

/// A caption track advertised by the watch page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// `"asr"` for auto-generated tracks
    pub kind: Option<String>,
}

/// Returns `true` when `id` is exactly 11 characters of `[A-Za-z0-9_-]`.
pub fn is_valid_video_id(id: &str) -> bool {
    VIDEO_ID_RE.is_match(id)
}

/// Accepts either a bare video id or a YouTube URL and returns the id.
///
/// # Returns
/// * `Ok(String)` with the 11 character video id.
/// * `Err(Error::InvalidInput)` when no valid id can be found.
pub fn extract_video_id(input: &str) -> Result<String, Error> {
    if is_valid_video_id(input) {
        return Ok(input.to_string());
    }

    VIDEO_URL_RE
        .captures(input)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            Error::InvalidInput(
                "Invalid video ID: expected 11 characters of letters, digits, '-' or '_'".into(),
            )
        })
}

/// Reads `captions.playerCaptionsTracklistRenderer.captionTracks` from the
/// player response.
///
/// # Returns
/// * `Ok(Vec<CaptionTrack>)` with at least one track.
/// * `Err(Error::ParseError)` if the video has no captions.
#[tracing::instrument(skip(json))]
pub fn parse_caption_tracks(json: &Value) -> Result<Vec<CaptionTrack>, Error> {
    let tracks = json["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"]
        .as_array()
        .ok_or(Error::ParseError(
            "Failed to get ['captions']['playerCaptionsTracklistRenderer']['captionTracks']",
        ))?;

    let tracks = tracks
        .iter()
        .cloned()
        .map(serde_json::from_value::<CaptionTrack>)
        .collect::<Result<Vec<_>, _>>()?;

    if tracks.is_empty() {
        return Err(Error::ParseError("Video has no caption tracks"));
    }

    Ok(tracks)
}

/// Picks the track for `language`, or the first track when no language is
/// requested. A request for `en` also matches regional codes like `en-GB`.
pub fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    language: Option<&str>,
) -> Option<&'a CaptionTrack> {
    let Some(language) = language else {
        return tracks.first();
    };

    tracks
        .iter()
        .find(|t| t.language_code.eq_ignore_ascii_case(language))
        .or_else(|| {
            tracks.iter().find(|t| {
                t.language_code
                    .split_once('-')
                    .is_some_and(|(base, _)| base.eq_ignore_ascii_case(language))
            })
        })
}

/// Parses timedtext XML (`<transcript><text start dur>..</text></transcript>`)
/// into fragments, preserving document order.
pub fn parse_timedtext(xml: &str) -> Vec<CaptionFragment> {
    TIMEDTEXT_RE
        .captures_iter(xml)
        .filter_map(|cap| {
            let start = cap.get(1)?.as_str().parse::<f64>().ok()?;
            let duration = cap
                .get(2)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or_default();
            let raw = cap.get(3).map(|m| m.as_str()).unwrap_or_default();

            // markup arrives escaped once, literal text twice (`&amp;lt;`)
            let text = decode_entities(raw);
            let text = INLINE_TAG_RE.replace_all(&text, "");
            let text = decode_entities(&text).trim().to_string();

            Some(CaptionFragment {
                text,
                start,
                duration,
            })
        })
        .collect()
}

fn decode_entities(input: &str) -> String {
    ENTITY_RE
        .replace_all(input, |cap: &regex::Captures| {
            let entity = &cap[1];
            match entity {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                _ => {
                    let code = if let Some(hex) = entity
                        .strip_prefix("#x")
                        .or_else(|| entity.strip_prefix("#X"))
                    {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        entity[1..].parse::<u32>().ok()
                    };
                    code.and_then(char::from_u32)
                        .map(String::from)
                        .unwrap_or_else(|| cap[0].to_string())
                }
            }
        })
        .into_owned()
}

pub struct YtWatchPage(String);

impl Deref for YtWatchPage {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl YtWatchPage {
    pub fn new(doc: String) -> Self {
        YtWatchPage(doc)
    }

    pub fn to_json<T>(&self) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        YT_PLAYER_RESPONSE_RE
            .captures(self)
            .and_then(|cap| cap.get(1))
            .and_then(|m| serde_json::from_str(m.as_str()).ok())
            .ok_or(Error::ParseError(
                "Failed to extract ytInitialPlayerResponse from the page's script tag",
            ))
    }

    pub fn caption_tracks(&self) -> Result<Vec<CaptionTrack>, Error> {
        let json = self.to_json::<Value>()?;
        parse_caption_tracks(&json)
    }
}

impl From<String> for YtWatchPage {
    fn from(value: String) -> Self {
        YtWatchPage(value)
    }
}
