pub mod processor;

pub use processor::{ImageProcessor, RasterImageProcessor};
