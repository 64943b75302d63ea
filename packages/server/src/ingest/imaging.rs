use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use thiserror::Error;

use crate::config::StorageConfig;

#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Sizes and qualities for derived assets.
#[derive(Clone, Copy, Debug)]
pub struct ImagingOptions {
    pub thumbnail_width: u32,
    pub thumbnail_quality: u8,
    pub compressed_max_width: u32,
    pub compressed_quality: u8,
}

impl From<&StorageConfig> for ImagingOptions {
    fn from(config: &StorageConfig) -> Self {
        Self {
            thumbnail_width: config.thumbnail_width,
            thumbnail_quality: config.thumbnail_quality,
            compressed_max_width: config.compressed_max_width,
            compressed_quality: config.compressed_quality,
        }
    }
}

/// Everything derived from the pixels of an upload. `None` means "not available".
#[derive(Debug, Default)]
pub struct DerivedAssets {
    pub dimensions: Option<(u32, u32)>,
    pub dominant_color: Option<String>,
    /// JPEG bytes.
    pub thumbnail: Option<Vec<u8>>,
    /// JPEG bytes.
    pub compressed: Option<Vec<u8>>,
}

/// Read pixel dimensions from the image header without decoding pixels.
pub fn read_dimensions(bytes: &[u8]) -> Result<(u32, u32), ImagingError> {
    let dims = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(dims)
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImagingError> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    Ok(img)
}

/// Scale to `target_width` keeping the aspect ratio. Never upscales.
pub fn resize_to_width(img: &DynamicImage, target_width: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= target_width || width == 0 {
        return img.clone();
    }
    let target_height = ((height as f64) * (target_width as f64) / (width as f64)).round();
    let target_height = (target_height as u32).max(1);
    img.resize_exact(target_width, target_height, FilterType::Lanczos3)
}

pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImagingError> {
    // JPEG has no alpha channel.
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)).encode_image(&rgb)?;
    Ok(buf)
}

/// Mean color of the image as `#rrggbb`.
pub fn dominant_color(img: &DynamicImage) -> String {
    let small = img.thumbnail(64, 64).to_rgb8();
    let count = u64::from(small.width()) * u64::from(small.height());
    if count == 0 {
        return "#000000".to_string();
    }

    let mut sums = [0u64; 3];
    for pixel in small.pixels() {
        for (sum, channel) in sums.iter_mut().zip(pixel.0) {
            *sum += u64::from(channel);
        }
    }
    let [r, g, b] = sums.map(|s| ((s as f64) / (count as f64)).round() as u8);
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Derive dimensions, color and resized variants from an upload.
///
/// CPU-bound; run it on a blocking thread. Each failure is logged and
/// leaves the corresponding field empty.
pub fn derive(bytes: &[u8], options: ImagingOptions) -> DerivedAssets {
    let mut derived = DerivedAssets {
        dimensions: read_dimensions(bytes)
            .inspect_err(|e| tracing::warn!("Reading dimensions failed: {}", e))
            .ok(),
        ..Default::default()
    };

    let img = match decode(bytes) {
        Ok(img) => img,
        Err(e) => {
            tracing::warn!("Image decode failed, skipping derived assets: {}", e);
            return derived;
        }
    };

    if derived.dimensions.is_none() {
        derived.dimensions = Some(img.dimensions());
    }
    derived.dominant_color = Some(dominant_color(&img));

    let thumbnail = resize_to_width(&img, options.thumbnail_width);
    derived.thumbnail = encode_jpeg(&thumbnail, options.thumbnail_quality)
        .inspect_err(|e| tracing::warn!("Thumbnail generation failed: {}", e))
        .ok();

    let compressed = resize_to_width(&img, options.compressed_max_width);
    derived.compressed = encode_jpeg(&compressed, options.compressed_quality)
        .inspect_err(|e| tracing::warn!("Compressed variant generation failed: {}", e))
        .ok();

    derived
}
