use crate::{
    CameraError, CameraResult, Frame, FrameSource, NOMINAL_HEIGHT, NOMINAL_WIDTH, rgb_to_rgba,
};
use derivative::Derivative;
use derive_setters::Setters;
use nokhwa::{
    CallbackCamera, query,
    pixel_format::{RgbAFormat, RgbFormat},
    utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType, Resolution},
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    #[default]
    RGBA,
    RGB,
}

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct CameraConfig {
    #[derivative(Default(value = "NOMINAL_WIDTH"))]
    pub width: u32,

    #[derivative(Default(value = "NOMINAL_HEIGHT"))]
    pub height: u32,

    #[derivative(Default(value = "PixelFormat::RGBA"))]
    pub pixel_format: PixelFormat,

    /// Flip frames horizontally, as a front-facing camera is shown to the user.
    #[derivative(Default(value = "true"))]
    pub mirror: bool,
}

pub struct CameraClient {
    camera: Option<CallbackCamera>,
    is_running: Arc<AtomicBool>,
    pixel_format: PixelFormat,
    mirror: bool,
}

impl CameraClient {
    pub fn new(camera_index: CameraIndex, config: CameraConfig) -> CameraResult<Self> {
        let pixel_format = config.pixel_format;
        let format_type = RequestedFormatType::AbsoluteHighestFrameRate;
        let format = match pixel_format {
            PixelFormat::RGBA => RequestedFormat::new::<RgbAFormat>(format_type),
            PixelFormat::RGB => RequestedFormat::new::<RgbFormat>(format_type),
        };

        let mut camera = CallbackCamera::new(camera_index, format, move |_| {})
            .map_err(|e| CameraError::InitializationError(e.to_string()))?;

        // The driver may pick another mode; frames carry their real size.
        if let Err(e) = camera.set_resolution(Resolution::new(config.width, config.height)) {
            log::warn!(
                "camera set resolution ({} x {}) failed: {e}",
                config.width,
                config.height
            );
        }

        Ok(Self {
            camera: Some(camera),
            is_running: Arc::new(AtomicBool::new(false)),
            pixel_format,
            mirror: config.mirror,
        })
    }

    pub fn with_index(index: u32, config: CameraConfig) -> CameraResult<Self> {
        Self::new(CameraIndex::Index(index), config)
    }

    pub fn start(&mut self) -> CameraResult<()> {
        if let Some(ref mut camera) = self.camera {
            camera
                .open_stream()
                .map_err(|e| CameraError::StartError(e.to_string()))?;
            self.is_running.store(true, Ordering::Relaxed);
            Ok(())
        } else {
            Err(CameraError::InitializationError(
                "Camera not initialized".to_string(),
            ))
        }
    }

    pub fn stop(&mut self) -> CameraResult<()> {
        if let Some(ref mut camera) = self.camera {
            camera
                .stop_stream()
                .map_err(|e| CameraError::StopError(e.to_string()))?;
            self.is_running.store(false, Ordering::Relaxed);
            Ok(())
        } else {
            Err(CameraError::StopError("Camera not initialized".to_string()))
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    fn decode_last_frame(&self) -> CameraResult<Frame> {
        let Some(ref camera) = self.camera else {
            return Err(CameraError::InitializationError("No camera".to_string()));
        };

        let buffer = camera.last_frame()?;
        let image = match self.pixel_format {
            PixelFormat::RGBA => buffer.decode_image::<RgbAFormat>()?,
            PixelFormat::RGB => match buffer.decode_image::<RgbFormat>() {
                Ok(rgb_image) => rgb_to_rgba(&rgb_image),
                Err(_) => return Err(CameraError::NoFrameAvailable),
            },
        };

        let frame = Frame::new(image);
        if frame.is_empty() {
            return Err(CameraError::NoFrameAvailable);
        }

        Ok(if self.mirror { frame.mirrored() } else { frame })
    }
}

impl FrameSource for CameraClient {
    fn current_frame(&self) -> CameraResult<Frame> {
        if !self.is_running() {
            return Err(CameraError::NoFrameAvailable);
        }

        self.decode_last_frame()
    }
}

impl Drop for CameraClient {
    fn drop(&mut self) {
        if self.is_running() {
            _ = self.stop();
        }
    }
}

/// Human readable names of the cameras the native backend can see.
pub fn available_cameras() -> CameraResult<Vec<(u32, String)>> {
    let cameras = query(ApiBackend::Auto).map_err(|e| CameraError::QueryError(e.to_string()))?;

    Ok(cameras
        .into_iter()
        .filter_map(|camera| match camera.index() {
            CameraIndex::Index(index) => Some((*index, camera.human_name())),
            CameraIndex::String(_) => None,
        })
        .collect())
}
