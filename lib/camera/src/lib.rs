pub mod frame;
pub mod still_source;

#[cfg(feature = "native")]
pub mod camera_client;

pub use frame::Frame;
pub use image::{Rgba, RgbaImage};
pub use still_source::StillFrameSource;

#[cfg(feature = "native")]
pub use camera_client::{CameraClient, CameraConfig, PixelFormat};

/// Nominal capture resolution requested from a webcam.
pub const NOMINAL_WIDTH: u32 = 640;
pub const NOMINAL_HEIGHT: u32 = 480;

pub type CameraResult<T> = Result<T, CameraError>;

#[derive(thiserror::Error, Debug)]
pub enum CameraError {
    #[error("Failed to query cameras: {0}")]
    QueryError(String),

    #[error("Failed to initialize camera: {0}")]
    InitializationError(String),

    #[error("Failed to start camera: {0}")]
    StartError(String),

    #[error("Failed to stop camera: {0}")]
    StopError(String),

    #[error("No frame available")]
    NoFrameAvailable,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageLibraryError(#[from] image::ImageError),

    #[cfg(feature = "native")]
    #[error("Camera error: {0}")]
    NokhwaError(#[from] nokhwa::NokhwaError),
}

/// Anything that can hand out the frame currently in front of the lens.
///
/// The delivered frame may differ from the nominal resolution; callers size
/// their output from [`Frame::dimensions`].
pub trait FrameSource: Send {
    fn current_frame(&self) -> CameraResult<Frame>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn current_frame(&self) -> CameraResult<Frame> {
        (**self).current_frame()
    }
}

pub fn init() {
    #[cfg(all(feature = "native", target_os = "macos"))]
    nokhwa::nokhwa_initialize(|granted| {
        log::info!("User said {} for nokhwa", granted);
    });
}

pub fn rgb_to_rgba(rgb_image: &image::RgbImage) -> RgbaImage {
    let (width, height) = rgb_image.dimensions();

    RgbaImage::from_fn(width, height, |x, y| {
        let pixel = rgb_image.get_pixel(x, y);
        Rgba([pixel[0], pixel[1], pixel[2], 255])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_rgba_is_opaque() {
        let rgb = image::RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]));
        let rgba = rgb_to_rgba(&rgb);

        assert_eq!(rgba.dimensions(), (3, 2));
        assert!(rgba.pixels().all(|p| *p == Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn test_boxed_source_delegates() {
        let source: Box<dyn FrameSource> =
            Box::new(StillFrameSource::new(RgbaImage::new(4, 3)));
        assert_eq!(source.current_frame().unwrap().dimensions(), (4, 3));
    }
}
