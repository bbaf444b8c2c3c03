#![no_main]

//! Fuzz target for the textual key and landmark forms.
//!
//! Run with: cargo +nightly fuzz run fuzz_parse

use libfuzzer_sys::fuzz_target;
use shuffle_core::{Key, LandmarkBox};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(key) = text.parse::<Key>() {
        assert!((shuffle_core::MIN_KEY_LEN..=shuffle_core::MAX_KEY_LEN).contains(&key.len()));
    }

    if let Ok(landmarks) = text.parse::<LandmarkBox>() {
        // The side-file form must parse back to the same box
        let reparsed: LandmarkBox = landmarks.to_string().parse().unwrap();
        assert_eq!(reparsed, landmarks);
    }
});
