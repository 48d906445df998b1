pub mod scraper;

use std::{fmt::Display, future::Future};

use crate::types::CaptionFragment;

/// Something that can hand back the caption lines of a video.
pub trait TranscriptSource {
    type Error: Display + Send;

    /// Fetches captions for `video_id`. `language: None` lets the source
    /// pick whatever track it considers the default.
    fn fetch(
        &self,
        video_id: &str,
        language: Option<&str>,
    ) -> impl Future<Output = Result<Vec<CaptionFragment>, Self::Error>> + Send;
}

impl<T: TranscriptSource + Send + Sync> TranscriptSource for &T {
    type Error = T::Error;

    async fn fetch(
        &self,
        video_id: &str,
        language: Option<&str>,
    ) -> Result<Vec<CaptionFragment>, Self::Error> {
        (**self).fetch(video_id, language).await
    }
}
