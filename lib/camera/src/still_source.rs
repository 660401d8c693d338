use crate::{CameraError, CameraResult, Frame, FrameSource};
use std::path::Path;

/// Serves the same still image on every request.
#[derive(Debug, Clone)]
pub struct StillFrameSource {
    frame: Option<Frame>,
}

impl StillFrameSource {
    pub fn new(frame: impl Into<Frame>) -> Self {
        Self {
            frame: Some(frame.into()),
        }
    }

    /// A source whose camera never delivered anything.
    pub fn empty() -> Self {
        Self { frame: None }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> CameraResult<Self> {
        let path = path.as_ref();
        let image = image::open(path)?.to_rgba8();
        log::info!(
            "Loaded still frame {}x{} from {}",
            image.width(),
            image.height(),
            path.display()
        );

        Ok(Self::new(image))
    }
}

impl FrameSource for StillFrameSource {
    fn current_frame(&self) -> CameraResult<Frame> {
        self.frame.clone().ok_or(CameraError::NoFrameAvailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn test_still_source_repeats_frame() {
        let source = StillFrameSource::new(RgbaImage::new(8, 6));
        assert_eq!(source.current_frame().unwrap().dimensions(), (8, 6));
        assert_eq!(source.current_frame().unwrap().dimensions(), (8, 6));
    }

    #[test]
    fn test_empty_source_has_no_frame() {
        let source = StillFrameSource::empty();
        assert!(matches!(
            source.current_frame(),
            Err(CameraError::NoFrameAvailable)
        ));
    }

    #[test]
    fn test_open_missing_file() {
        assert!(StillFrameSource::open("/definitely/not/here.png").is_err());
    }
}
