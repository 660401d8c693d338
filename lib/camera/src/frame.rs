use image::RgbaImage;
use std::sync::Arc;

/// One immutable video frame.
///
/// Cloning is cheap: the pixels are shared, so a frame can be handed to a
/// detector task while the compositor reads the same buffer.
#[derive(Debug, Clone)]
pub struct Frame {
    image: Arc<RgbaImage>,
}

impl Frame {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    /// Front-facing cameras are presented mirrored.
    pub fn mirrored(&self) -> Self {
        Self::new(image::imageops::flip_horizontal(self.image.as_ref()))
    }
}

impl From<RgbaImage> for Frame {
    fn from(image: RgbaImage) -> Self {
        Self::new(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_frame_dimensions() {
        let frame = Frame::new(RgbaImage::new(640, 480));
        assert_eq!(frame.dimensions(), (640, 480));
        assert!(!frame.is_empty());
        assert!(Frame::new(RgbaImage::new(0, 480)).is_empty());
    }

    #[test]
    fn test_frame_mirrored() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 255, 255]));

        let mirrored = Frame::new(image).mirrored();
        assert_eq!(*mirrored.image().get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(*mirrored.image().get_pixel(1, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_frame_clone_shares_pixels() {
        let frame = Frame::new(RgbaImage::new(4, 4));
        let other = frame.clone();
        assert!(std::ptr::eq(frame.image(), other.image()));
    }
}
