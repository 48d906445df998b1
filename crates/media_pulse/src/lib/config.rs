use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::{compress::CompressionStrategy, types::TranscriptCandidate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub code: String,
    pub name: String,
}

impl Language {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Parses `code` or `code:Display Name`. A bare code doubles as its name.
impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (code, name) = match s.split_once(':') {
            Some((code, name)) => (code.trim(), name.trim()),
            None => (s.trim(), s.trim()),
        };
        if code.is_empty() || name.is_empty() {
            return Err(format!("invalid language '{s}', expected code or code:Name"));
        }
        Ok(Language::new(code, name))
    }
}

/// Runtime settings for the media pipelines.
#[derive(Debug, Clone)]
pub struct Config {
    /// Candidate model ids, tried in order.
    pub models: Vec<String>,
    pub primary_language: Language,
    pub secondary_language: Language,
    pub transcript_timeout: Duration,
    pub max_transcript_chars: usize,
    pub target_size_kb: usize,
    pub max_image_dimension: u32,
    pub compression: CompressionStrategy,
    pub workdir: PathBuf,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub max_concurrent_generations: usize,
    pub max_upload_bytes: usize,
    /// Allowed CORS origin; any origin when unset.
    pub cors_origin: Option<String>,
}

impl Config {
    pub const AUTO_DETECT_NAME: &str = "Auto-detected";

    /// Primary language, secondary language, then whatever track exists.
    pub fn transcript_candidates(&self) -> Vec<TranscriptCandidate> {
        vec![
            TranscriptCandidate::new(
                Some(&self.primary_language.code),
                &self.primary_language.name,
            ),
            TranscriptCandidate::new(
                Some(&self.secondary_language.code),
                &self.secondary_language.name,
            ),
            TranscriptCandidate::new(None, Self::AUTO_DETECT_NAME),
        ]
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.workdir.join("uploads")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models: vec!["gemini-2.0-flash".into(), "gemini-1.5-flash".into()],
            primary_language: Language::new("en", "English"),
            secondary_language: Language::new("hi", "Hindi"),
            transcript_timeout: Duration::from_secs(10),
            max_transcript_chars: 8000,
            target_size_kb: 500,
            max_image_dimension: 1920,
            compression: CompressionStrategy::BinarySearch,
            workdir: std::env::temp_dir().join("media-pulse"),
            cache_ttl: Duration::from_secs(60 * 60),
            cache_capacity: 100,
            max_concurrent_generations: 5,
            max_upload_bytes: 10 * 1024 * 1024,
            cors_origin: None,
        }
    }
}
