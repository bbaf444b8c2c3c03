//! CLI integration tests for imageshuffle.
//!
//! These tests verify the CLI behavior by running the actual binary
//! and checking outputs, exit codes, and file artifacts.

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const KEY: [&str; 10] = ["3", "17", "44", "90", "12", "150", "7", "199", "2", "61"];

/// Get a Command for the imageshuffle binary.
fn imageshuffle() -> Command {
    let mut cmd = Command::cargo_bin("imageshuffle").unwrap();
    // Keep the developer's environment out of the tests
    for var in [
        "IMAGESHUFFLE_OUTPUT_DIR",
        "IMAGESHUFFLE_MATCH_THRESHOLD",
        "IMAGESHUFFLE_METHOD",
        "IMAGESHUFFLE_LOG",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Write a 100x100 gradient PNG and return its path.
fn write_test_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(100, 100, |x, y| Rgb([x as u8, y as u8, ((x * 7 + y * 3) % 256) as u8]))
        .save(&path)
        .unwrap();
    path
}

fn scramble_args<'a>(image: &'a str, key: &[&'a str]) -> Vec<&'a str> {
    let mut args = vec!["scramble", image];
    args.extend_from_slice(key);
    args
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_displays_usage() {
    imageshuffle()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reversible key-based face scrambling"))
        .stdout(predicate::str::contains("scramble"))
        .stdout(predicate::str::contains("unscramble"))
        .stdout(predicate::str::contains("recognize"))
        .stdout(predicate::str::contains("encode"));
}

#[test]
fn test_version_displays_version() {
    imageshuffle()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("imageshuffle"));
}

#[test]
fn test_help_shows_exit_codes() {
    imageshuffle()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exit codes:"))
        .stdout(predicate::str::contains("64"))
        .stdout(predicate::str::contains("65"))
        .stdout(predicate::str::contains("66"));
}

#[test]
fn test_scramble_help_shows_options() {
    imageshuffle()
        .args(["scramble", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--region"))
        .stdout(predicate::str::contains("--points"))
        .stdout(predicate::str::contains("--method"))
        .stdout(predicate::str::contains("--output-dir"));
}

#[test]
fn test_unscramble_help_shows_options() {
    imageshuffle()
        .args(["unscramble", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--landmarks"))
        .stdout(predicate::str::contains("IMAGE"));
}

// ============================================================================
// Exit Code Tests
// ============================================================================

#[test]
fn test_missing_image_returns_input_error() {
    // Exit code 66 = EX_NOINPUT
    let mut args = scramble_args("nonexistent_file.png", &KEY);
    args.extend(["--region", "10,50,20,60"]);
    imageshuffle()
        .args(&args)
        .assert()
        .code(66)
        .stderr(predicate::str::contains("Failed to read image"));
}

#[test]
fn test_short_key_returns_usage_error() {
    let temp = TempDir::new().unwrap();
    let image = write_test_image(temp.path(), "face.png");

    // Exit code 64 = EX_USAGE
    let mut args = scramble_args(image.to_str().unwrap(), &KEY[..9]);
    args.extend(["--region", "10,50,20,60"]);
    imageshuffle()
        .args(&args)
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Invalid key"))
        .stderr(predicate::str::contains("key length 9"));

    assert!(!temp.path().join("face_Scrambled.png").exists());
}

#[test]
fn test_out_of_range_key_returns_usage_error() {
    let temp = TempDir::new().unwrap();
    let image = write_test_image(temp.path(), "face.png");

    for bad in ["0", "201", "-4"] {
        let mut key = KEY;
        key[3] = bad;
        let mut args = scramble_args(image.to_str().unwrap(), &key);
        args.extend(["--region", "10,50,20,60"]);
        imageshuffle()
            .args(&args)
            .assert()
            .code(64)
            .stderr(predicate::str::contains("not in range [1, 200]"));
    }
}

#[test]
fn test_non_integer_key_returns_usage_error() {
    let temp = TempDir::new().unwrap();
    let image = write_test_image(temp.path(), "face.png");

    let mut key = KEY;
    key[0] = "three";
    let mut args = scramble_args(image.to_str().unwrap(), &key);
    args.extend(["--region", "10,50,20,60"]);
    imageshuffle()
        .args(&args)
        .assert()
        .code(64)
        .stderr(predicate::str::contains("not an integer"));
}

#[test]
fn test_missing_landmarks_returns_usage_error() {
    let temp = TempDir::new().unwrap();
    let image = write_test_image(temp.path(), "face.png");

    imageshuffle()
        .args(scramble_args(image.to_str().unwrap(), &KEY))
        .assert()
        .code(64)
        .stderr(predicate::str::contains("--region").or(predicate::str::contains("required")));
}

#[test]
fn test_region_outside_image_returns_usage_error() {
    let temp = TempDir::new().unwrap();
    let image = write_test_image(temp.path(), "face.png");

    let mut args = scramble_args(image.to_str().unwrap(), &KEY);
    args.extend(["--region", "150,180,0,10"]);
    imageshuffle()
        .args(&args)
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Invalid region"));
}

#[test]
fn test_no_face_returns_data_error() {
    let temp = TempDir::new().unwrap();
    let image = write_test_image(temp.path(), "face.png");
    let points = temp.path().join("points.json");
    fs::write(&points, "[]").unwrap();

    // Exit code 65 = EX_DATAERR
    let mut args = scramble_args(image.to_str().unwrap(), &KEY);
    args.extend(["--points", points.to_str().unwrap()]);
    imageshuffle()
        .args(&args)
        .assert()
        .code(65)
        .stderr(predicate::str::contains("No face found"));

    assert!(!temp.path().join("face_Scrambled.png").exists());
    assert!(!temp.path().join("face_Landmarks.txt").exists());
}

#[test]
fn test_missing_output_dir_returns_usage_error() {
    let temp = TempDir::new().unwrap();
    let image = write_test_image(temp.path(), "face.png");
    let missing = temp.path().join("nowhere");

    let mut args = scramble_args(image.to_str().unwrap(), &KEY);
    args.extend(["--region", "10,50,20,60", "-o", missing.to_str().unwrap()]);
    imageshuffle()
        .args(&args)
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Invalid output directory"));
}

#[test]
fn test_jpeg_input_written_as_png() {
    let temp = TempDir::new().unwrap();
    let image = temp.path().join("face.jpg");
    RgbImage::from_pixel(40, 40, Rgb([90, 60, 30])).save(&image).unwrap();

    let mut args = scramble_args(image.to_str().unwrap(), &KEY);
    args.extend(["--region", "5,20,5,20"]);
    imageshuffle()
        .args(&args)
        .assert()
        .success()
        .stdout(predicate::str::contains("face_Scrambled.png"));

    assert!(temp.path().join("face_Scrambled.png").exists());
    assert!(!temp.path().join("face_Scrambled.jpg").exists());
}

#[test]
fn test_corrupt_landmarks_file_returns_data_error() {
    let temp = TempDir::new().unwrap();
    let image = write_test_image(temp.path(), "face.png");
    let landmarks = temp.path().join("face_Landmarks.txt");
    fs::write(&landmarks, "ten fifty").unwrap();

    let mut args = vec!["unscramble", image.to_str().unwrap()];
    args.extend_from_slice(&KEY);
    args.extend(["10", "50", "20", "60", "--landmarks", landmarks.to_str().unwrap()]);
    imageshuffle()
        .args(&args)
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Failed to parse landmarks file"));
}

#[test]
fn test_unscramble_without_landmark_values_returns_usage_error() {
    let temp = TempDir::new().unwrap();
    let image = write_test_image(temp.path(), "face.png");

    // Only the key: its last four terms are taken as landmarks, leaving a
    // six-term key.
    let mut args = vec!["unscramble", image.to_str().unwrap()];
    args.extend_from_slice(&KEY);
    imageshuffle()
        .args(&args)
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Invalid"));
}

#[test]
fn test_bad_catalog_extension_returns_usage_error() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("alice")).unwrap();

    imageshuffle()
        .args([
            "encode",
            temp.path().to_str().unwrap(),
            temp.path().join("faces.pickle").to_str().unwrap(),
        ])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Unsupported catalog extension"));
}

#[test]
fn test_missing_catalog_returns_input_error() {
    let temp = TempDir::new().unwrap();
    let image = write_test_image(temp.path(), "face.png");

    imageshuffle()
        .args([
            "recognize",
            image.to_str().unwrap(),
            temp.path().join("faces.json").to_str().unwrap(),
        ])
        .assert()
        .code(66)
        .stderr(predicate::str::contains("Failed to read catalog"));
}

#[test]
fn test_corrupt_catalog_returns_data_error() {
    let temp = TempDir::new().unwrap();
    let image = write_test_image(temp.path(), "face.png");
    let catalog = temp.path().join("faces.json");
    fs::write(&catalog, b"definitely not a catalog").unwrap();

    imageshuffle()
        .args(["recognize", image.to_str().unwrap(), catalog.to_str().unwrap()])
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Failed to parse catalog"));
}

// ============================================================================
// Quiet and Color Tests
// ============================================================================

#[test]
fn test_quiet_mode_minimal_output() {
    let temp = TempDir::new().unwrap();
    let image = write_test_image(temp.path(), "face.png");

    let mut args = vec!["--quiet"];
    args.extend(scramble_args(image.to_str().unwrap(), &KEY));
    args.extend(["--region", "10,50,20,60"]);
    let output = imageshuffle().args(&args).assert().success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    assert!(
        stdout.trim().is_empty(),
        "Quiet mode should have no stdout, got: {}",
        stdout
    );
    assert!(temp.path().join("face_Scrambled.png").exists());
}

#[test]
fn test_color_never_no_ansi() {
    let temp = TempDir::new().unwrap();
    let image = write_test_image(temp.path(), "face.png");

    let mut args = vec!["--color=never", "--verbose"];
    args.extend(scramble_args(image.to_str().unwrap(), &KEY));
    args.extend(["--region", "10,50,20,60"]);
    let output = imageshuffle().args(&args).assert().success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let stderr = String::from_utf8_lossy(&output.get_output().stderr);

    // ANSI escape codes start with \x1b[
    assert!(
        !stdout.contains("\x1b["),
        "Color=never stdout should not contain ANSI codes"
    );
    assert!(
        !stderr.contains("\x1b["),
        "Color=never stderr should not contain ANSI codes"
    );
}

#[test]
fn test_logs_never_contain_key_terms() {
    let temp = TempDir::new().unwrap();
    let image = write_test_image(temp.path(), "face.png");
    let key = ["101", "102", "103", "104", "105", "106", "107", "108", "109", "110"];

    let mut args = vec!["--verbose", "--color=never"];
    args.extend(scramble_args(image.to_str().unwrap(), &key));
    args.extend(["--region", "10,50,20,60"]);
    let output = imageshuffle().args(&args).assert().success();

    let stderr = String::from_utf8_lossy(&output.get_output().stderr);
    assert!(stderr.contains("region_located"), "expected debug logs: {stderr}");
    assert!(!stderr.contains("101, 102"));
    assert!(!stderr.contains("101 102"));
}

// ============================================================================
// Error Message Tests
// ============================================================================

#[test]
fn test_invalid_method_rejected() {
    let temp = TempDir::new().unwrap();
    let image = write_test_image(temp.path(), "face.png");

    let mut args = scramble_args(image.to_str().unwrap(), &KEY);
    args.extend(["--region", "10,50,20,60", "--method", "shuffle"]);
    imageshuffle()
        .args(&args)
        .assert()
        .code(64)
        .stderr(
            predicate::str::contains("invalid").or(predicate::str::contains("possible values")),
        );
}

#[test]
fn test_conflicting_verbose_quiet_rejected() {
    let temp = TempDir::new().unwrap();
    let image = write_test_image(temp.path(), "face.png");

    // Use an actual command (not --help which bypasses conflicts)
    let mut args = vec!["--verbose", "--quiet"];
    args.extend(scramble_args(image.to_str().unwrap(), &KEY));
    args.extend(["--region", "10,50,20,60"]);
    imageshuffle()
        .args(&args)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
