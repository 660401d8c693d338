use image::{Rgba, RgbaImage};
use retro_effect::{Compositor, LineStroke, RetroProfile, StrokePoint};
use std::path::Path;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let output_dir = Path::new("tmp");
    std::fs::create_dir_all(output_dir)?;

    let frame = RgbaImage::from_fn(640, 480, |x, y| {
        Rgba([(x * 255 / 640) as u8, (y * 255 / 480) as u8, 160, 255])
    });

    let strokes = [
        LineStroke::straight(StrokePoint::new(320.0, 40.0), StrokePoint::new(320.0, 180.0)),
        LineStroke::curved(
            StrokePoint::new(260.0, 60.0),
            StrokePoint::new(270.0, 90.0),
            StrokePoint::new(250.0, 140.0),
            StrokePoint::new(262.0, 170.0),
        ),
    ];

    for profile in RetroProfile::all_profiles() {
        let compositor = Compositor::from_profile(*profile)?;
        let surface = compositor.compose(&frame, &strokes)?;

        let filename = format!("retro_{}.png", profile.name().to_lowercase());
        std::fs::write(output_dir.join(&filename), surface.encode_png()?)?;
        println!("✓ Generated {}", filename);
    }

    println!("  Images saved to: tmp/");
    Ok(())
}
