//! Example showing the pipeline logs of a scramble/unscramble round trip.
//!
//! Run with: cargo run -p shuffle-core --example scramble_tracing

use image::{DynamicImage, Rgb, RgbImage};
use shuffle_core::{FixedLandmarks, LandmarkBox, ScrambleMethod, Shuffler};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    // Show every pipeline stage
    fmt()
        .with_env_filter(EnvFilter::new("shuffle_core=trace,info"))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    println!("=== Scramble Pipeline Tracing Demo ===\n");

    let image = DynamicImage::from(RgbImage::from_fn(100, 100, |x, y| {
        Rgb([x as u8, y as u8, ((x + y) % 256) as u8])
    }));
    let face = FixedLandmarks(LandmarkBox::new(10, 50, 20, 60));

    for method in [ScrambleMethod::Permutation, ScrambleMethod::RowSwap] {
        let shuffler = match Shuffler::new(&[3, 17, 44, 90, 12, 150, 7, 199, 2, 61]) {
            Ok(shuffler) => shuffler.with_method(method),
            Err(e) => {
                eprintln!("Invalid key: {e}");
                return;
            }
        };

        println!("Method: {method}, key fingerprint: {}", shuffler.key().fingerprint());

        let result = shuffler
            .scramble(&image, &face)
            .and_then(|(scrambled, landmarks)| {
                println!("Scrambled region: {landmarks} ({} pixels)", landmarks.area());
                shuffler.unscramble(&scrambled, landmarks)
            });

        match result {
            Ok(restored) => println!("Restored exactly: {}\n", restored == image),
            Err(e) => println!("Round trip failed: {e}\n"),
        }
    }
}
