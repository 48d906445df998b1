use std::ops::Deref;

use crate::{
    error::Error,
    parser::{parse_timedtext, select_track, YtWatchPage},
    types::CaptionFragment,
    yt::TranscriptSource,
};

/// Scrapes captions straight off the YouTube watch page.
#[derive(Debug, Clone, Default)]
pub struct Scraper(pub reqwest::Client);

impl Deref for Scraper {
    type Target = reqwest::Client;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Scraper {
    const WATCH_URL: &str = "https://www.youtube.com/watch";

    #[tracing::instrument(skip(self))]
    async fn fetch_watch_page(&self, video_id: &str) -> Result<YtWatchPage, Error> {
        let html = self
            .get(Self::WATCH_URL)
            .query(&[("v", video_id)])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(html.into())
    }
}

impl TranscriptSource for Scraper {
    type Error = Error;

    async fn fetch(
        &self,
        video_id: &str,
        language: Option<&str>,
    ) -> Result<Vec<CaptionFragment>, Self::Error> {
        let page = self.fetch_watch_page(video_id).await?;
        let tracks = page.caption_tracks()?;

        let track = select_track(&tracks, language)
            .ok_or(Error::ParseError("No caption track for requested language"))?;

        tracing::debug!(language = %track.language_code, kind = ?track.kind, "Fetching caption track");

        let xml = self
            .get(&track.base_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(parse_timedtext(&xml))
    }
}
