use crate::{
    CaptureError, CaptureResult,
    config::Config,
    overlay::{OverlayMode, OverlaySynthesizer},
};
use camera::{Frame, FrameSource};
use face_landmark::{DetectionGate, HeadRegionEstimator};
use rand::{SeedableRng, rngs::StdRng};
use retro_effect::{CompositeSurface, Compositor, LineStroke};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Capturing,
    Captured,
}

/// The finished still: PNG bytes plus the raster size they decode to.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    png: Arc<[u8]>,
    width: u32,
    height: u32,
    mode: OverlayMode,
    stroke_count: usize,
    degraded: bool,
}

impl CapturedImage {
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mode(&self) -> OverlayMode {
        self.mode
    }

    /// Glow lines drawn onto the photo.
    pub fn stroke_count(&self) -> usize {
        self.stroke_count
    }

    /// The effect layers failed and the raw frame was kept instead.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

#[derive(Debug, Default)]
struct Session {
    state: CaptureState,
    image: Option<CapturedImage>,
}

/// Owns the capture state machine: `Idle -> Capturing -> Captured`, and back
/// to `Idle` on retake.
pub struct CapturePipeline {
    frame_source: Mutex<Box<dyn FrameSource>>,
    gate: DetectionGate,
    estimator: HeadRegionEstimator,
    synthesizer: OverlaySynthesizer,
    compositor: Compositor,
    session: Mutex<Session>,
}

impl CapturePipeline {
    pub fn new(
        frame_source: Box<dyn FrameSource>,
        gate: DetectionGate,
        estimator: HeadRegionEstimator,
        synthesizer: OverlaySynthesizer,
        compositor: Compositor,
    ) -> Self {
        Self {
            frame_source: Mutex::new(frame_source),
            gate,
            estimator,
            synthesizer,
            compositor,
            session: Mutex::new(Session::default()),
        }
    }

    pub fn from_config(
        config: &Config,
        frame_source: Box<dyn FrameSource>,
        gate: DetectionGate,
    ) -> CaptureResult<Self> {
        let compositor = Compositor::from_profile(config.effect.profile)
            .map_err(CaptureError::Config)?
            .with_max_surface_pixels(config.effect.max_surface_pixels);

        Ok(Self::new(
            frame_source,
            gate.with_timeout(config.detection.timeout()),
            HeadRegionEstimator::new(config.head_region.clone()),
            OverlaySynthesizer::new(config.overlay.clone()),
            compositor,
        ))
    }

    pub fn state(&self) -> CaptureState {
        self.session().state
    }

    pub fn captured_image(&self) -> Option<CapturedImage> {
        self.session().image.clone()
    }

    /// Runs one capture. Rejected unless the pipeline is idle.
    pub async fn capture(&self) -> CaptureResult<CapturedImage> {
        let guard = self.begin()?;

        let image = self.run().await?;
        guard.commit(image.clone());

        log::info!(
            "capture finished: {}x{}, {:?} with {} strokes{}",
            image.width,
            image.height,
            image.mode,
            image.stroke_count,
            if image.degraded { ", degraded" } else { "" }
        );
        Ok(image)
    }

    /// Drops the captured image and re-enables capture. Returns whether an
    /// image was discarded.
    pub fn retake(&self) -> bool {
        let mut session = self.session();
        if session.state != CaptureState::Captured {
            return false;
        }

        session.state = CaptureState::Idle;
        session.image.take().is_some()
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self) -> CaptureResult<CaptureGuard<'_>> {
        let mut session = self.session();
        if session.state != CaptureState::Idle {
            log::debug!("capture rejected in state {:?}", session.state);
            return Err(CaptureError::Rejected(session.state));
        }

        session.state = CaptureState::Capturing;
        Ok(CaptureGuard {
            pipeline: self,
            committed: false,
        })
    }

    fn snapshot(&self) -> CaptureResult<Frame> {
        let source = self.frame_source.lock().unwrap_or_else(|e| e.into_inner());
        source.current_frame().map_err(CaptureError::FrameUnavailable)
    }

    async fn run(&self) -> CaptureResult<CapturedImage> {
        let frame = self.snapshot()?;
        let frame_size = frame.dimensions();

        let detection = self.gate.detect(&frame).await;
        let region = detection
            .as_ref()
            .and_then(|detection| self.estimator.estimate(detection, frame_size));

        let overlay = self
            .synthesizer
            .synthesize(region, frame_size, &mut StdRng::from_os_rng());

        let (surface, degraded) = compose_or_fallback(&self.compositor, &frame, &overlay.strokes)?;
        let png = surface.encode_png().map_err(CaptureError::Encode)?;

        Ok(CapturedImage {
            png: png.into(),
            width: frame_size.0,
            height: frame_size.1,
            mode: overlay.mode,
            stroke_count: overlay.strokes.len(),
            degraded,
        })
    }
}

/// Draws the frame and every effect layer. A failing layer leaves the plain
/// frame on the surface; only a missing surface is an error.
fn compose_or_fallback(
    compositor: &Compositor,
    frame: &Frame,
    strokes: &[LineStroke],
) -> CaptureResult<(CompositeSurface, bool)> {
    let (width, height) = frame.dimensions();
    let mut surface = compositor
        .acquire_surface(width, height)
        .map_err(CaptureError::SurfaceUnavailable)?;
    surface
        .draw_frame(frame.image())
        .map_err(CaptureError::SurfaceUnavailable)?;

    match compositor.render_layers(&mut surface, strokes) {
        Ok(_) => Ok((surface, false)),
        Err(e) => {
            log::warn!("compositing failed, keeping the plain frame: {e}");
            surface
                .draw_frame(frame.image())
                .map_err(CaptureError::SurfaceUnavailable)?;
            Ok((surface, true))
        }
    }
}

/// Returns the pipeline to `Idle` unless the capture completed, including
/// when the capture future is dropped mid-flight.
struct CaptureGuard<'a> {
    pipeline: &'a CapturePipeline,
    committed: bool,
}

impl CaptureGuard<'_> {
    fn commit(mut self, image: CapturedImage) {
        let mut session = self.pipeline.session();
        session.state = CaptureState::Captured;
        session.image = Some(image);
        self.committed = true;
    }
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            let mut session = self.pipeline.session();
            session.state = CaptureState::Idle;
            session.image = None;
        }
    }
}
