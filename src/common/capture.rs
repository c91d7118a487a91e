use crate::error::AppError;
use base64::{prelude::BASE64_STANDARD, Engine};
use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageFormat, ImageReader};
use serde::Serialize;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Encodings the model providers accept inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Png,
    Jpeg,
}

impl MediaType {
    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            MediaType::Png => ImageFormat::Png,
            MediaType::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// An encoded screenshot. Cloning shares the underlying buffer.
#[derive(Clone)]
pub struct ScreenCapture {
    capture_id: Uuid,
    bytes: Arc<[u8]>,
    media_type: MediaType,
    width: u32,
    height: u32,
    captured_at: DateTime<Utc>,
}

impl ScreenCapture {
    /// Wraps already-encoded image bytes. PNG and JPEG are kept as-is, any
    /// other format the `image` crate understands is re-encoded as PNG.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, AppError> {
        let format = image::guess_format(&bytes)?;
        let media_type = match format {
            ImageFormat::Png => MediaType::Png,
            ImageFormat::Jpeg => MediaType::Jpeg,
            _ => {
                let decoded = image::load_from_memory_with_format(&bytes, format)?;
                return Self::from_image(&decoded, MediaType::Png);
            }
        };

        let (width, height) =
            ImageReader::with_format(Cursor::new(&bytes[..]), format).into_dimensions()?;

        Ok(Self {
            capture_id: Uuid::new_v4(),
            bytes: Arc::from(bytes),
            media_type,
            width,
            height,
            captured_at: Utc::now(),
        })
    }

    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(bytes)
    }

    pub fn from_image(image: &DynamicImage, media_type: MediaType) -> Result<Self, AppError> {
        let mut buf = Vec::new();
        match media_type {
            // JPEG has no alpha channel
            MediaType::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8())
                .write_to(&mut Cursor::new(&mut buf), media_type.image_format())?,
            MediaType::Png => image.write_to(&mut Cursor::new(&mut buf), media_type.image_format())?,
        }

        Ok(Self {
            capture_id: Uuid::new_v4(),
            bytes: Arc::from(buf),
            media_type,
            width: image.width(),
            height: image.height(),
            captured_at: Utc::now(),
        })
    }

    pub fn decode(&self) -> Result<DynamicImage, AppError> {
        Ok(image::load_from_memory_with_format(
            &self.bytes,
            self.media_type.image_format(),
        )?)
    }

    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.bytes)
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type.mime(), self.to_base64())
    }

    pub fn capture_id(&self) -> Uuid {
        self.capture_id
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for ScreenCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenCapture")
            .field("capture_id", &self.capture_id)
            .field("media_type", &self.media_type)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
impl ScreenCapture {
    pub(crate) fn solid(width: u32, height: u32) -> Self {
        use image::{ImageBuffer, Rgb};

        let img = DynamicImage::ImageRgb8(ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(
            width,
            height,
            Rgb([240, 240, 240]),
        ));
        Self::from_image(&img, MediaType::Png).expect("encode test image")
    }
}
