use camera::{
    CameraClient, CameraConfig, FrameSource, camera_client::available_cameras,
};
use std::{thread, time::Duration};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    camera::init();

    let cameras = available_cameras()?;
    let Some((index, name)) = cameras.first().cloned() else {
        log::warn!("No working cameras found!");
        return Ok(());
    };
    log::info!("Found {} camera(s), using: {name}", cameras.len());

    let mut client = CameraClient::with_index(index, CameraConfig::default())?;
    client.start()?;

    // Give the stream a moment to deliver its first frame.
    thread::sleep(Duration::from_millis(500));

    let frame = client.current_frame()?;
    log::info!("Frame: {}x{}", frame.width(), frame.height());

    std::fs::create_dir_all("tmp")?;
    frame.image().save("tmp/camera-frame.png")?;
    log::info!("  ✓ Saved: tmp/camera-frame.png");

    client.stop()?;
    Ok(())
}
