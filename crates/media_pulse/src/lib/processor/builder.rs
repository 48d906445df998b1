use media_cache::MemoryCache;

use crate::{
    compress::{Compressor, ImageCrateCodec},
    config::Config,
    llm::{invoker::GenerationInvoker, Generator},
    queue::GenerationQueue,
    transcript::TranscriptResolver,
    yt::TranscriptSource,
    MediaPulse,
};

pub struct MediaPulseBuilder<T = (), G = ()> {
    config: Config,
    transcript_source: T,
    generator: G,
}

impl MediaPulseBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            transcript_source: (),
            generator: (),
        }
    }
}

impl Default for MediaPulseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, G> MediaPulseBuilder<T, G> {
    pub fn transcript_source<T2: TranscriptSource + Send + Sync + 'static>(
        self,
        transcript_source: T2,
    ) -> MediaPulseBuilder<T2, G> {
        MediaPulseBuilder {
            config: self.config,
            transcript_source,
            generator: self.generator,
        }
    }

    pub fn generator<G2: Generator + Send + Sync + 'static>(
        self,
        generator: G2,
    ) -> MediaPulseBuilder<T, G2> {
        MediaPulseBuilder {
            config: self.config,
            transcript_source: self.transcript_source,
            generator,
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }
}

impl<T, G> MediaPulseBuilder<T, G>
where
    T: TranscriptSource + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
{
    pub fn build(self) -> MediaPulse<T, G> {
        let config = self.config;

        let compressor = Compressor::new(ImageCrateCodec)
            .with_max_dimension(config.max_image_dimension)
            .with_strategy(config.compression);

        let resolver =
            TranscriptResolver::new(self.transcript_source, config.transcript_candidates())
                .with_timeout(config.transcript_timeout)
                .with_max_chars(config.max_transcript_chars);

        MediaPulse {
            uploads_dir: config.uploads_dir(),
            target_size_kb: config.target_size_kb,
            compressor,
            resolver,
            invoker: GenerationInvoker::new(self.generator, config.models),
            queue: GenerationQueue::new(config.max_concurrent_generations),
            summaries: MemoryCache::new(config.cache_capacity, config.cache_ttl),
        }
    }
}
