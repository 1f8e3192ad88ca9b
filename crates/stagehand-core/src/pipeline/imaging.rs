//! Image load, resize, grayscale and save, backed by the `image` crate.

use std::io::Cursor;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use thiserror::Error;

use crate::config::{Config, LimitsConfig, TransformConfig};
use crate::error::BoxError;

use super::transform::Transforms;

/// Failures raised by the image collaborators.
#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Image(#[from] image::ImageError),

    #[error("file too large ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge { size_mb: u64, max_mb: u64 },

    #[error("image too large ({width}x{height} > {max_dim})")]
    ImageTooLarge { width: u32, height: u32, max_dim: u32 },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Parse a resampling filter name.
pub fn parse_filter(name: &str) -> Option<FilterType> {
    match name.to_lowercase().as_str() {
        "nearest" => Some(FilterType::Nearest),
        "triangle" => Some(FilterType::Triangle),
        "catmullrom" => Some(FilterType::CatmullRom),
        "gaussian" => Some(FilterType::Gaussian),
        "lanczos3" => Some(FilterType::Lanczos3),
        _ => None,
    }
}

/// Read and decode an image, detecting the format from content first.
pub fn read_image(path: &Path, limits: &LimitsConfig) -> Result<DynamicImage, ImagingError> {
    let size = std::fs::metadata(path)?.len();
    let max_bytes = limits.max_file_size_mb.saturating_mul(1024 * 1024);
    if size > max_bytes {
        return Err(ImagingError::FileTooLarge {
            size_mb: size / (1024 * 1024),
            max_mb: limits.max_file_size_mb,
        });
    }

    let bytes = std::fs::read(path)?;
    let mut reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    if reader.format().is_none() {
        let format = ImageFormat::from_path(path).map_err(|_| {
            ImagingError::UnsupportedFormat(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            )
        })?;
        reader.set_format(format);
    }
    let image = reader.decode()?;

    let (width, height) = image.dimensions();
    if width > limits.max_image_dimension || height > limits.max_image_dimension {
        return Err(ImagingError::ImageTooLarge {
            width,
            height,
            max_dim: limits.max_image_dimension,
        });
    }
    Ok(image)
}

/// Resize to exactly `width` x `height`.
pub fn resize(image: &DynamicImage, width: u32, height: u32, filter: FilterType) -> DynamicImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    image.resize_exact(width, height, filter)
}

/// Convert to 8-bit luminance.
pub fn grayscale(image: &DynamicImage) -> DynamicImage {
    image.grayscale()
}

/// Encode by destination extension, creating the parent directory if needed.
pub fn write_image(path: &Path, image: &DynamicImage) -> Result<(), ImagingError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    image.save(path)?;
    Ok(())
}

/// [`Transforms`] over decoded images.
#[derive(Debug, Clone)]
pub struct ImageTransforms {
    limits: LimitsConfig,
    width: u32,
    height: u32,
    filter: FilterType,
}

impl ImageTransforms {
    pub fn new(transform: &TransformConfig, limits: &LimitsConfig) -> Self {
        Self {
            limits: limits.clone(),
            width: transform.width,
            height: transform.height,
            filter: parse_filter(&transform.filter).unwrap_or(FilterType::Lanczos3),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.transform, &config.limits)
    }
}

impl Transforms for ImageTransforms {
    type Payload = DynamicImage;

    fn load(&self, source: &Path) -> Result<DynamicImage, BoxError> {
        Ok(read_image(source, &self.limits)?)
    }

    fn resize(&self, payload: DynamicImage) -> Result<DynamicImage, BoxError> {
        Ok(resize(&payload, self.width, self.height, self.filter))
    }

    fn grayscale(&self, payload: DynamicImage) -> Result<DynamicImage, BoxError> {
        Ok(grayscale(&payload))
    }

    fn save(&self, dest: &Path, payload: DynamicImage) -> Result<(), BoxError> {
        Ok(write_image(dest, &payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_keeps_matching_target() {
        let img = DynamicImage::new_rgba8(500, 500);
        let resized = resize(&img, 500, 500, FilterType::Lanczos3);
        assert_eq!(resized.dimensions(), (500, 500));
    }

    #[test]
    fn test_resize_to_configured_target() {
        let transforms = ImageTransforms::new(
            &TransformConfig {
                width: 100,
                height: 80,
                filter: "triangle".into(),
            },
            &LimitsConfig::default(),
        );
        let img = DynamicImage::new_rgb8(500, 500);
        let resized = transforms.resize(img).unwrap();
        assert_eq!(resized.dimensions(), (100, 80));
    }

    #[test]
    fn test_grayscale_is_luma() {
        let img = DynamicImage::new_rgb8(100, 100);
        let gray = grayscale(&img);
        assert_eq!(gray.dimensions(), (100, 100));
        assert!(matches!(gray, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/test.png");
        let img = DynamicImage::new_rgb8(32, 16);

        write_image(&path, &img).unwrap();
        let loaded = read_image(&path, &LimitsConfig::default()).unwrap();
        assert_eq!(loaded.dimensions(), (32, 16));
    }

    #[test]
    fn test_format_detected_by_content() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("real.png");
        write_image(&png, &DynamicImage::new_rgb8(8, 8)).unwrap();
        let misnamed = dir.path().join("misnamed.jpg");
        std::fs::copy(&png, &misnamed).unwrap();

        let loaded = read_image(&misnamed, &LimitsConfig::default()).unwrap();
        assert_eq!(loaded.dimensions(), (8, 8));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_image(Path::new("/nonexistent/a.png"), &LimitsConfig::default());
        assert!(matches!(err, Err(ImagingError::Io(_))));
    }

    #[test]
    fn test_read_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(read_image(&path, &LimitsConfig::default()).is_err());
    }

    #[test]
    fn test_read_with_huge_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.png");
        write_image(&path, &DynamicImage::new_rgb8(4, 4)).unwrap();

        let limits = LimitsConfig {
            max_file_size_mb: u64::MAX,
            ..LimitsConfig::default()
        };
        let loaded = read_image(&path, &limits).unwrap();
        assert_eq!(loaded.dimensions(), (4, 4));
    }

    #[test]
    fn test_read_enforces_dimension_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        write_image(&path, &DynamicImage::new_rgb8(64, 8)).unwrap();

        let limits = LimitsConfig {
            max_image_dimension: 32,
            ..LimitsConfig::default()
        };
        let err = read_image(&path, &limits).unwrap_err();
        assert!(matches!(err, ImagingError::ImageTooLarge { width: 64, .. }));
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter("Lanczos3"), Some(FilterType::Lanczos3));
        assert_eq!(parse_filter("nearest"), Some(FilterType::Nearest));
        assert_eq!(parse_filter("bicubic"), None);
    }
}
