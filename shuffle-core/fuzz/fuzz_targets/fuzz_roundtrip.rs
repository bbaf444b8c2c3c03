#![no_main]

//! Fuzz target for Shuffler scramble/unscramble.
//!
//! The first bytes pick the method and the landmark box, the rest is the
//! key. Unscrambling must always restore the image exactly.
//!
//! Run with: cargo +nightly fuzz run fuzz_roundtrip

use image::{Rgb, RgbImage};
use libfuzzer_sys::fuzz_target;
use shuffle_core::{LandmarkBox, ScrambleMethod, Shuffler};

fuzz_target!(|data: &[u8]| {
    if data.len() < 15 {
        return;
    }
    let (head, key_bytes) = data.split_at(5);
    let raw_key: Vec<i64> = key_bytes.iter().take(100).map(|&b| i64::from(b)).collect();
    let Ok(shuffler) = Shuffler::new(&raw_key) else {
        return;
    };
    let method = if head[0] & 1 == 0 {
        ScrambleMethod::Permutation
    } else {
        ScrambleMethod::RowSwap
    };
    let shuffler = shuffler.with_method(method);

    let image = RgbImage::from_fn(48, 40, |x, y| Rgb([x as u8, y as u8, (x * y) as u8]));
    let top = u32::from(head[1] % 48);
    let left = u32::from(head[3] % 56);
    let landmarks = LandmarkBox::new(
        top,
        top + 1 + u32::from(head[2] % 48),
        left,
        left + 1 + u32::from(head[4] % 56),
    );

    if let Ok((scrambled, used)) = shuffler.scramble_buffer(&image, landmarks) {
        let restored = shuffler.unscramble_buffer(&scrambled, used).unwrap();
        assert_eq!(restored, image);
    }
});
