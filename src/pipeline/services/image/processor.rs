use crate::common::capture::ScreenCapture;
use crate::error::AppError;
use crate::pipeline::domain::detection::BoundingBox;

/// Raster operations the pipeline needs from its image collaborator.
pub trait ImageProcessor: Send + Sync {
    /// Crops to `region`, clamped to the image bounds.
    fn crop(&self, image: &ScreenCapture, region: BoundingBox) -> Result<ScreenCapture, AppError>;

    /// Shrinks so neither side exceeds `max_dimension`, keeping aspect ratio.
    /// Images already within bounds come back unchanged.
    fn downscale(&self, image: &ScreenCapture, max_dimension: u32) -> Result<ScreenCapture, AppError>;
}

/// `ImageProcessor` over the `image` crate. Output keeps the input encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterImageProcessor;

impl ImageProcessor for RasterImageProcessor {
    fn crop(&self, image: &ScreenCapture, region: BoundingBox) -> Result<ScreenCapture, AppError> {
        let (width, height) = image.dimensions();

        let x0 = (region.x.max(0.0).floor() as u32).min(width);
        let y0 = (region.y.max(0.0).floor() as u32).min(height);
        let x1 = ((region.x + region.width).max(0.0).ceil() as u32).min(width);
        let y1 = ((region.y + region.height).max(0.0).ceil() as u32).min(height);

        if x1 <= x0 || y1 <= y0 {
            return Err(AppError::InvalidArgument(format!(
                "crop region {region:?} does not overlap the {width}x{height} image"
            )));
        }

        let cropped = image.decode()?.crop_imm(x0, y0, x1 - x0, y1 - y0);
        ScreenCapture::from_image(&cropped, image.media_type())
    }

    fn downscale(&self, image: &ScreenCapture, max_dimension: u32) -> Result<ScreenCapture, AppError> {
        let (width, height) = image.dimensions();
        if width <= max_dimension && height <= max_dimension {
            return Ok(image.clone());
        }

        let scaled = image.decode()?.thumbnail(max_dimension, max_dimension);
        ScreenCapture::from_image(&scaled, image.media_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_uses_box_extent() {
        let capture = ScreenCapture::solid(200, 100);
        let cropped = RasterImageProcessor
            .crop(&capture, BoundingBox::new(10.0, 10.0, 50.0, 20.0))
            .unwrap();
        assert_eq!(cropped.dimensions(), (50, 20));
        assert_eq!(cropped.media_type(), capture.media_type());
    }

    #[test]
    fn crop_is_clamped_to_image_bounds() {
        let capture = ScreenCapture::solid(120, 60);
        let cropped = RasterImageProcessor
            .crop(&capture, BoundingBox::new(100.0, 50.0, 80.0, 30.0))
            .unwrap();
        assert_eq!(cropped.dimensions(), (20, 10));
    }

    #[test]
    fn crop_outside_the_image_is_an_error() {
        let capture = ScreenCapture::solid(50, 50);
        assert!(RasterImageProcessor
            .crop(&capture, BoundingBox::new(60.0, 60.0, 10.0, 10.0))
            .is_err());
        assert!(RasterImageProcessor
            .crop(&capture, BoundingBox::default())
            .is_err());
    }

    #[test]
    fn downscale_keeps_aspect_ratio() {
        let capture = ScreenCapture::solid(400, 200);
        let scaled = RasterImageProcessor.downscale(&capture, 100).unwrap();
        assert_eq!(scaled.dimensions(), (100, 50));

        let untouched = RasterImageProcessor.downscale(&capture, 1000).unwrap();
        assert_eq!(untouched.capture_id(), capture.capture_id());
    }
}
