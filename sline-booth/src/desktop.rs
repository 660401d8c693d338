use anyhow::{Context, Result};
use camera::{FrameSource, StillFrameSource};
use clap::Parser;
use face_landmark::{DetectionGate, FixedLandmarkProvider, LandmarkProvider};
use sline_booth::{CapturePipeline, Config};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

#[derive(Debug, Parser)]
#[command(version, about = "Take one S-Line photo from a camera or a still image")]
struct Args {
    /// TOML configuration file, created with defaults by `--save-config`.
    #[arg(short, long, default_value = "sline-booth.toml")]
    config: PathBuf,

    /// Use this image as the camera frame.
    #[arg(short, long, conflicts_with = "camera")]
    input: Option<PathBuf>,

    /// Camera index; overrides the configured one.
    #[arg(long)]
    camera: Option<u32>,

    /// Face detection to report for the frame, as JSON. `null` means no face.
    #[arg(short, long)]
    landmarks: Option<PathBuf>,

    /// Where to write the PNG. Defaults to `s-line-photo-<epoch-millis>.png`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the effective configuration back to `--config`.
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    sline_booth::init_logger();

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    if args.save_config {
        config.save(&args.config)?;
    }

    let source = frame_source(&args, &config)?;
    let gate = detection_gate(args.landmarks.as_deref()).await;

    let pipeline = CapturePipeline::from_config(&config, source, gate)?;
    let image = pipeline.capture().await?;

    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "s-line-photo-{}.png",
            chrono::Utc::now().timestamp_millis()
        ))
    });
    std::fs::write(&output, image.png())
        .with_context(|| format!("write {} failed", output.display()))?;

    log::info!(
        "saved {}x{} photo to {}",
        image.width(),
        image.height(),
        output.display()
    );
    Ok(())
}

fn frame_source(args: &Args, config: &Config) -> Result<Box<dyn FrameSource>> {
    if let Some(input) = &args.input {
        let source = StillFrameSource::open(input)
            .with_context(|| format!("open {} failed", input.display()))?;
        return Ok(Box::new(source));
    }

    camera_source(args.camera.unwrap_or(config.camera.index), config)
}

#[cfg(feature = "native-camera")]
fn camera_source(index: u32, config: &Config) -> Result<Box<dyn FrameSource>> {
    use camera::{CameraClient, CameraConfig};
    use std::{thread, time::Duration};

    camera::init();

    let camera_config = CameraConfig::default()
        .with_width(config.camera.width)
        .with_height(config.camera.height)
        .with_mirror(config.camera.mirror);
    let mut client = CameraClient::with_index(index, camera_config)?;
    client.start()?;

    // First frames arrive shortly after the stream opens.
    thread::sleep(Duration::from_millis(500));
    log::info!("camera {index} started");

    Ok(Box::new(client))
}

#[cfg(not(feature = "native-camera"))]
fn camera_source(index: u32, _config: &Config) -> Result<Box<dyn FrameSource>> {
    anyhow::bail!("camera {index} requested but built without the `native-camera` feature; pass --input")
}

async fn detection_gate(landmarks: Option<&Path>) -> DetectionGate {
    let Some(path) = landmarks else {
        log::info!("no landmark provider configured, every capture uses the no-face overlay");
        return DetectionGate::unavailable();
    };

    DetectionGate::load(|| async move {
        FixedLandmarkProvider::from_json_file(path)
            .map(|provider| Arc::new(provider) as Arc<dyn LandmarkProvider>)
    })
    .await
}
