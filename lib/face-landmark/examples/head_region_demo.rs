use camera::{Frame, RgbaImage};
use face_landmark::{DetectionGate, FixedLandmarkProvider, HeadRegionEstimator, LandmarkProvider};
use std::sync::Arc;

// cargo run --example head_region_demo -- sline-booth/data/scenario-a.json
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sline-booth/data/scenario-a.json".to_string());
    let path = path.as_str();

    let gate = DetectionGate::load(|| async move {
        FixedLandmarkProvider::from_json_file(path)
            .map(|provider| Arc::new(provider) as Arc<dyn LandmarkProvider>)
    })
    .await;

    let frame = Frame::new(RgbaImage::new(640, 480));
    let outcome = gate.detect_outcome(&frame).await;
    log::info!("detection outcome: {outcome:?}");

    let Some(detection) = outcome.into_detection() else {
        log::info!("no face, nothing to estimate");
        return Ok(());
    };

    match HeadRegionEstimator::default().estimate(&detection, frame.dimensions()) {
        Some(region) => log::info!(
            "head region: top {:.1}, bound {:.1}, x {:.1}..{:.1} ({:?})",
            region.top_y,
            region.bottom_bound_y,
            region.left_x,
            region.right_x,
            region.strategy
        ),
        None => log::warn!("no usable landmark group"),
    }

    Ok(())
}
