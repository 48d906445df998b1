use crate::{
    compress::{CompressionStrategy, ImageCodec},
    error::Error,
    types::CompressionResult,
};

#[derive(Debug, Clone)]
pub struct Compressor<C> {
    codec: C,
    max_dimension: u32,
    strategy: CompressionStrategy,
}

impl<C: ImageCodec> Compressor<C> {
    pub const MIN_QUALITY: u8 = 10;
    pub const MAX_QUALITY: u8 = 95;
    pub const DEFAULT_MAX_DIMENSION: u32 = 1920;
    /// Early-exit window around the target, in kilobytes.
    pub const TOLERANCE_KB: f64 = 10.0;

    pub fn new(codec: C) -> Self {
        Self {
            codec,
            max_dimension: Self::DEFAULT_MAX_DIMENSION,
            strategy: CompressionStrategy::default(),
        }
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension.max(1);
        self
    }

    pub fn with_strategy(mut self, strategy: CompressionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> CompressionStrategy {
        self.strategy
    }

    /// Re-encodes `bytes` as JPEG aiming for `target_kb`.
    ///
    /// The size guarantee is approximate: with the binary search the result
    /// may sit up to ~10 KB either side of the target, and when even the
    /// lowest quality is too large that lowest-quality encode is returned.
    #[tracing::instrument(skip(self, bytes), fields(input_bytes = bytes.len(), strategy = %self.strategy))]
    pub fn compress(&self, bytes: &[u8], target_kb: usize) -> Result<CompressionResult, Error> {
        let image = self
            .codec
            .decode(bytes)
            .inspect_err(|e| tracing::error!(error = %e, "Failed to decode image"))?;

        let original = self.codec.dimensions(&image);
        let dimensions = original.fit_within(self.max_dimension);
        let image = if dimensions != original {
            tracing::debug!(?original, resized = ?dimensions, "Downscaling image");
            self.codec.resize(image, dimensions)
        } else {
            image
        };

        let (bytes, quality, attempts) = match self.strategy {
            CompressionStrategy::BinarySearch => self.binary_search(&image, target_kb)?,
            CompressionStrategy::LinearStepDown { start, step, floor } => {
                self.linear_step_down(&image, target_kb, start, step, floor)?
            }
        };

        tracing::info!(
            quality,
            attempts,
            output_kb = bytes.len() / 1024,
            target_kb,
            "Compressed image"
        );

        Ok(CompressionResult {
            bytes,
            quality,
            dimensions,
            attempts,
        })
    }

    /// Halves the quality range each round. Whatever was encoded last is
    /// returned, even if an earlier round produced a closer feasible size.
    fn binary_search(
        &self,
        image: &C::Image,
        target_kb: usize,
    ) -> Result<(Vec<u8>, u8, u32), Error> {
        let target = target_kb as f64;
        let mut min_quality = Self::MIN_QUALITY as i32;
        let mut max_quality = Self::MAX_QUALITY as i32;
        let mut best_feasible: Option<u8> = None;
        let mut last: Option<(Vec<u8>, u8)> = None;
        let mut attempts = 0;

        while min_quality <= max_quality {
            let quality = ((min_quality + max_quality) / 2) as u8;
            let encoded = self.codec.encode(image, quality)?;
            attempts += 1;

            let size_kb = encoded.len() as f64 / 1024.0;
            tracing::trace!(quality, size_kb, "Encode attempt");

            if size_kb <= target {
                best_feasible = Some(quality);
                min_quality = quality as i32 + 1;
            } else {
                max_quality = quality as i32 - 1;
            }

            last = Some((encoded, quality));

            if (size_kb - target).abs() < Self::TOLERANCE_KB {
                break;
            }
        }

        tracing::debug!(?best_feasible, "Binary search finished");

        // the range is never empty so at least one encode happened
        let (bytes, quality) = last.ok_or_else(|| Error::Internal("No encode attempted".into()))?;
        Ok((bytes, quality, attempts))
    }

    fn linear_step_down(
        &self,
        image: &C::Image,
        target_kb: usize,
        start: u8,
        step: u8,
        floor: u8,
    ) -> Result<(Vec<u8>, u8, u32), Error> {
        let floor = floor.max(1);
        let step = step.max(1);
        let mut quality = start.clamp(floor, 100);
        let mut attempts = 0;

        loop {
            let encoded = self.codec.encode(image, quality)?;
            attempts += 1;

            if encoded.len() <= target_kb.saturating_mul(1024) || quality <= floor {
                return Ok((encoded, quality, attempts));
            }

            quality = quality.saturating_sub(step).max(floor);
        }
    }
}
