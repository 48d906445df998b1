use std::time::Duration;

use itertools::Itertools;

use crate::{
    error::Error,
    fallback::{try_in_order, Outcome},
    types::{CaptionFragment, TranscriptCandidate, TranscriptResult},
    yt::TranscriptSource,
};

pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Resolves a transcript by walking language candidates in a fixed order,
/// each attempt bounded by its own timeout.
#[derive(Debug)]
pub struct TranscriptResolver<T> {
    source: T,
    candidates: Vec<TranscriptCandidate>,
    timeout: Duration,
    max_chars: usize,
}

impl<T: TranscriptSource> TranscriptResolver<T> {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_MAX_CHARS: usize = 8000;

    pub fn new(source: T, candidates: Vec<TranscriptCandidate>) -> Self {
        Self {
            source,
            candidates,
            timeout: Self::DEFAULT_TIMEOUT,
            max_chars: Self::DEFAULT_MAX_CHARS,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn candidates(&self) -> &[TranscriptCandidate] {
        &self.candidates
    }

    /// Tries each candidate in order, returning the first non-empty transcript.
    ///
    /// Errors, empty results and timeouts all move on to the next candidate.
    /// A timed out fetch is dropped, which cancels its in-flight request.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, video_id: &str) -> Result<TranscriptResult, Error> {
        let result = try_in_order(&self.candidates, |candidate| async move {
            let language = candidate.language.as_deref();

            match tokio::time::timeout(self.timeout, self.source.fetch(video_id, language)).await
            {
                Ok(Ok(fragments)) if fragments.iter().any(|f| !f.text.trim().is_empty()) => {
                    Outcome::Done(fragments)
                }
                Ok(Ok(_)) => {
                    tracing::warn!(candidate = %candidate.display_name, "Transcript was empty");
                    Outcome::Skip(())
                }
                Ok(Err(e)) => {
                    tracing::warn!(candidate = %candidate.display_name, error = %e, "Transcript fetch failed");
                    Outcome::Skip(())
                }
                Err(_) => {
                    tracing::warn!(
                        candidate = %candidate.display_name,
                        timeout_secs = self.timeout.as_secs_f64(),
                        "Transcript fetch timed out"
                    );
                    Outcome::Skip(())
                }
            }
        })
        .await;

        let (winner, fragments) = result
            .map_err(|_| Error::NoTranscriptAvailable {
                video_id: video_id.to_string(),
            })
            .inspect_err(|e| tracing::error!(error = %e, "All transcript candidates failed"))?;

        let (text, truncated) = truncate(join_fragments(&fragments), self.max_chars);
        let char_count = text.chars().count();

        tracing::info!(
            language = %winner.display_name,
            fragments = fragments.len(),
            char_count,
            truncated,
            "Resolved transcript"
        );

        Ok(TranscriptResult {
            text,
            char_count,
            language: winner.display_name.clone(),
            truncated,
        })
    }
}

/// Joins fragment texts with single spaces in their original order.
pub fn join_fragments(fragments: &[CaptionFragment]) -> String {
    fragments
        .iter()
        .map(|f| f.text.trim())
        .filter(|t| !t.is_empty())
        .join(" ")
}

/// Cuts `text` to `max_chars` characters and appends [`TRUNCATION_MARKER`].
/// Text that already fits is returned unchanged.
pub fn truncate(text: String, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let mut cut = text[..byte_idx].to_string();
            cut.push_str(TRUNCATION_MARKER);
            (cut, true)
        }
        None => (text, false),
    }
}
