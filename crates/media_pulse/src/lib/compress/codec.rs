use std::io::Cursor;

use image::{
    codecs::jpeg::JpegEncoder, imageops::FilterType, ExtendedColorType, ImageEncoder, ImageReader,
    RgbImage,
};

use crate::{
    compress::ImageCodec,
    error::Error,
    types::{Dimensions, ImageAsset},
};

/// [`ImageCodec`] backed by the `image` crate. Decoded images are flattened
/// to RGB up front since JPEG carries no alpha channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateCodec;

impl ImageCrateCodec {
    /// Reads format and dimensions from the image header without a full decode.
    pub fn inspect(bytes: Vec<u8>) -> Result<ImageAsset, Error> {
        let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| Error::ImageDecode(e.to_string()))?;

        let format = reader
            .format()
            .ok_or_else(|| Error::ImageDecode("Unrecognized image format".into()))?;

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| Error::ImageDecode(e.to_string()))?;

        Ok(ImageAsset {
            bytes,
            dimensions: Dimensions::new(width, height),
            mime_type: format.to_mime_type().to_string(),
        })
    }
}

impl ImageCodec for ImageCrateCodec {
    type Image = RgbImage;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Image, Error> {
        image::load_from_memory(bytes)
            .map(|img| img.to_rgb8())
            .map_err(|e| Error::ImageDecode(e.to_string()))
    }

    fn dimensions(&self, image: &Self::Image) -> Dimensions {
        Dimensions::new(image.width(), image.height())
    }

    fn resize(&self, image: Self::Image, to: Dimensions) -> Self::Image {
        if self.dimensions(&image) == to {
            return image;
        }
        image::imageops::resize(&image, to.width, to.height, FilterType::Lanczos3)
    }

    fn encode(&self, image: &Self::Image, quality: u8) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| Error::ImageEncode(e.to_string()))?;
        Ok(buf)
    }
}
