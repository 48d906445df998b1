use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scales down proportionally so neither side exceeds `max_dimension`.
    /// Returns `self` untouched when it already fits.
    pub fn fit_within(self, max_dimension: u32) -> Self {
        if self.width <= max_dimension && self.height <= max_dimension {
            return self;
        }

        let scale = f64::min(
            max_dimension as f64 / self.width as f64,
            max_dimension as f64 / self.height as f64,
        );

        Self {
            width: ((self.width as f64 * scale).round() as u32).clamp(1, max_dimension),
            height: ((self.height as f64 * scale).round() as u32).clamp(1, max_dimension),
        }
    }
}

/// An uploaded image. Never mutated; compression only derives new buffers.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub bytes: Vec<u8>,
    pub dimensions: Dimensions,
    pub mime_type: String,
}

#[derive(Debug, Clone)]
pub struct CompressionResult {
    pub bytes: Vec<u8>,
    pub quality: u8,
    pub dimensions: Dimensions,
    pub attempts: u32,
}

impl CompressionResult {
    pub const MIME_TYPE: &'static str = "image/jpeg";

    pub fn size_kb(&self) -> usize {
        self.bytes.len() / 1024
    }
}

/// A single caption line as delivered by a transcript source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CaptionFragment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// One language configuration in the transcript fallback order.
/// `language: None` asks the source for whatever track it has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptCandidate {
    pub language: Option<String>,
    pub display_name: String,
}

impl TranscriptCandidate {
    pub fn new(language: Option<&str>, display_name: impl Into<String>) -> Self {
        Self {
            language: language.map(str::to_string),
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptResult {
    pub text: String,
    pub char_count: usize,
    pub language: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub text: String,
    pub model: String,
}

// ─── HTTP payloads ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub video_id: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionResponse {
    pub success: bool,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub success: bool,
    pub video_id: String,
    pub summary: String,
    pub transcript_language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
