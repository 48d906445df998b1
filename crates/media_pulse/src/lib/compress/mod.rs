//! # Compress
//!
//! Size-targeted JPEG re-encoding. The [`Compressor`] drives an [`ImageCodec`]
//! through a quality search until the encoded buffer lands at (or near) a
//! target size in kilobytes.

pub mod codec;
pub mod compressor;

use std::{fmt, str::FromStr};

pub use codec::ImageCrateCodec;
pub use compressor::Compressor;

use crate::{error::Error, types::Dimensions};

/// Decode/resize/encode primitives the compressor needs from an image library.
pub trait ImageCodec {
    type Image;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Image, Error>;

    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    fn resize(&self, image: Self::Image, to: Dimensions) -> Self::Image;

    /// Lossy encode with a quality factor in `1..=100`.
    fn encode(&self, image: &Self::Image, quality: u8) -> Result<Vec<u8>, Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionStrategy {
    /// Binary search over the quality range, last encode wins.
    BinarySearch,
    /// Step quality down from `start` until under target or at `floor`.
    LinearStepDown { start: u8, step: u8, floor: u8 },
}

impl CompressionStrategy {
    pub const fn linear() -> Self {
        CompressionStrategy::LinearStepDown {
            start: 90,
            step: 10,
            floor: 10,
        }
    }
}

impl Default for CompressionStrategy {
    fn default() -> Self {
        CompressionStrategy::BinarySearch
    }
}

impl FromStr for CompressionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "binary-search" => Ok(CompressionStrategy::BinarySearch),
            "linear" | "linear-step-down" => Ok(CompressionStrategy::linear()),
            other => Err(format!(
                "unknown compression strategy '{other}', expected 'binary-search' or 'linear'"
            )),
        }
    }
}

impl fmt::Display for CompressionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionStrategy::BinarySearch => write!(f, "binary-search"),
            CompressionStrategy::LinearStepDown { .. } => write!(f, "linear"),
        }
    }
}
