pub mod capture;

pub use capture::{MediaType, ScreenCapture};
