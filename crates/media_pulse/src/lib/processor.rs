pub mod builder;

use std::path::PathBuf;

use media_cache::{CacheStats, MemoryCache, ResponseCache};

use crate::{
    compress::{Compressor, ImageCrateCodec},
    error::Error,
    llm::{
        invoker::GenerationInvoker,
        prompt::{caption_parts, summary_parts},
        Generator,
    },
    parser::extract_video_id,
    queue::GenerationQueue,
    transcript::TranscriptResolver,
    types::{GenerationResult, VideoSummary},
    upload::SpooledUpload,
    yt::TranscriptSource,
};

/// A raw image as received from a client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

// Image captioning and video summarization share one model invoker and one
// generation queue
#[derive(Debug)]
pub struct MediaPulse<T, G>
where
    T: TranscriptSource + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
{
    uploads_dir: PathBuf,
    target_size_kb: usize,
    compressor: Compressor<ImageCrateCodec>,
    resolver: TranscriptResolver<T>,
    invoker: GenerationInvoker<G>,
    queue: GenerationQueue,
    summaries: MemoryCache<VideoSummary>,
}

impl<T, G> MediaPulse<T, G>
where
    T: TranscriptSource + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
{
    pub fn models(&self) -> &[String] {
        self.invoker.models()
    }

    pub fn queue(&self) -> &GenerationQueue {
        &self.queue
    }

    /// Compresses an uploaded image and asks the model chain for a caption.
    #[tracing::instrument(skip_all, fields(len = upload.bytes.len(), content_type = ?upload.content_type))]
    pub async fn caption_image(&self, upload: ImageUpload) -> Result<GenerationResult, Error> {
        if upload.bytes.is_empty() {
            return Err(Error::InvalidInput("No image uploaded".into()));
        }
        if let Some(content_type) = upload.content_type.as_deref() {
            if !content_type.starts_with("image/") {
                return Err(Error::InvalidInput("Only image files are allowed".into()));
            }
        }

        // the spooled file lives until this function returns, whatever the outcome
        let spooled = SpooledUpload::write(&self.uploads_dir, &upload.bytes).await?;
        let asset = ImageCrateCodec::inspect(spooled.read().await?)
            .inspect_err(|e| tracing::warn!(error = %e, "Rejected upload"))?;

        tracing::info!(
            mime_type = %asset.mime_type,
            width = asset.dimensions.width,
            height = asset.dimensions.height,
            "Received image"
        );

        let compressor = self.compressor.clone();
        let target_kb = self.target_size_kb;
        let compressed =
            tokio::task::spawn_blocking(move || compressor.compress(&asset.bytes, target_kb))
                .await??;

        self.queue
            .run(self.invoker.invoke(&caption_parts(&compressed)))
            .await
    }

    /// Resolves a transcript for `input` (a video id or a YouTube url) and
    /// summarizes it. Summaries are served from the cache while fresh.
    #[tracing::instrument(skip(self))]
    pub async fn summarize_video(&self, input: &str) -> Result<VideoSummary, Error> {
        let video_id = extract_video_id(input)?;

        if let Some(summary) = self.summaries.get(&video_id).await {
            tracing::debug!(%video_id, "Serving cached summary");
            return Ok(summary);
        }

        let transcript = self.resolver.resolve(&video_id).await?;
        let parts = summary_parts(&transcript.text, &transcript.language);
        let generation = self.queue.run(self.invoker.invoke(&parts)).await?;

        let summary = VideoSummary {
            success: true,
            video_id: video_id.clone(),
            summary: generation.text,
            transcript_language: transcript.language,
        };
        self.summaries.insert(video_id, summary.clone()).await;

        Ok(summary)
    }

    pub async fn purge_cache(&self) -> usize {
        self.summaries.purge_expired().await
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.summaries.stats().await
    }
}
