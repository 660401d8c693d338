//! Photo-booth capture: detect a face, hang glow lines over the head, grade
//! the frame and hand back one PNG.

pub mod capture;
pub mod config;
pub mod overlay;

use camera::CameraError;
use retro_effect::EffectError;

pub use capture::{CapturePipeline, CaptureState, CapturedImage};
pub use config::Config;
pub use overlay::{Overlay, OverlayConfig, OverlayMode, OverlaySynthesizer};

pub type CaptureResult<T> = Result<T, CaptureError>;

#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    #[error("Capture rejected while {0:?}")]
    Rejected(CaptureState),

    #[error("Frame unavailable: {0}")]
    FrameUnavailable(#[source] CameraError),

    #[error("Rendering surface unavailable: {0}")]
    SurfaceUnavailable(#[source] EffectError),

    #[error("Encode captured image failed: {0}")]
    Encode(#[source] EffectError),

    #[error("Invalid effect configuration: {0}")]
    Config(#[source] EffectError),
}

pub fn init_logger() {
    use std::io::Write;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            let ts = chrono::Local::now().format("%H:%M:%S");

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                ts,
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}
