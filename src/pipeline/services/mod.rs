pub mod image;

pub use image::{ImageProcessor, RasterImageProcessor};
