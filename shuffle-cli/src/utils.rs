//! Common utility functions shared across CLI commands.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use image::{DynamicImage, ImageFormat};
use shuffle_core::{FaceCatalog, LandmarkBox, LandmarkPoints};
use tracing::{debug, warn};

const SCRAMBLED_SUFFIX: &str = "_Scrambled";
const UNSCRAMBLED_SUFFIX: &str = "_Unscrambled";
const LANDMARKS_SUFFIX: &str = "_Landmarks";

/// Resolve the directory outputs are written to.
///
/// An explicit directory must already exist; otherwise the input image's
/// own directory is used.
pub fn resolve_output_dir(image: &Path, requested: Option<PathBuf>) -> Result<PathBuf> {
    match requested {
        Some(dir) if dir.is_dir() => Ok(dir),
        Some(dir) => bail!(
            "Invalid output directory: {} does not exist or is not a directory",
            dir.display()
        ),
        None => Ok(image
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)),
    }
}

fn stem_and_extension(image: &Path) -> Result<(&str, &str)> {
    let stem = image
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("Failed to read image name: {}", image.display()))?;
    let ext = image.extension().and_then(|e| e.to_str()).unwrap_or("png");
    Ok((stem, ext))
}

fn is_lossless(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png | ImageFormat::Bmp | ImageFormat::Tiff | ImageFormat::WebP
    )
}

/// Extension for an output derived from `ext`: kept when lossless, PNG
/// otherwise.
fn output_extension(ext: &str) -> &str {
    match ImageFormat::from_extension(ext) {
        Some(format) if is_lossless(format) => ext,
        _ => "png",
    }
}

/// `<dir>/<stem>_Scrambled.<ext>`, with `.png` in place of a lossy extension.
pub fn scrambled_path(image: &Path, dir: &Path) -> Result<PathBuf> {
    let (stem, ext) = stem_and_extension(image)?;
    let ext = output_extension(ext);
    Ok(dir.join(format!("{stem}{SCRAMBLED_SUFFIX}.{ext}")))
}

/// `<dir>/<stem>_Landmarks.txt`
pub fn landmarks_path(image: &Path, dir: &Path) -> Result<PathBuf> {
    let (stem, _) = stem_and_extension(image)?;
    Ok(dir.join(format!("{stem}{LANDMARKS_SUFFIX}.txt")))
}

/// `<dir>/<stem>_Unscrambled.<ext>`, dropping a trailing `_Scrambled` from
/// the stem.
pub fn unscrambled_path(image: &Path, dir: &Path) -> Result<PathBuf> {
    let (stem, ext) = stem_and_extension(image)?;
    let stem = stem.strip_suffix(SCRAMBLED_SUFFIX).unwrap_or(stem);
    let ext = output_extension(ext);
    Ok(dir.join(format!("{stem}{UNSCRAMBLED_SUFFIX}.{ext}")))
}

/// Landmarks side file written next to `scrambled` at scramble time.
pub fn recorded_landmarks_path(scrambled: &Path) -> Result<PathBuf> {
    let (stem, _) = stem_and_extension(scrambled)?;
    let stem = stem.strip_suffix(SCRAMBLED_SUFFIX).unwrap_or(stem);
    let dir = resolve_output_dir(scrambled, None)?;
    Ok(dir.join(format!("{stem}{LANDMARKS_SUFFIX}.txt")))
}

/// Output format for `path`, which must be lossless.
///
/// JPEG and GIF would re-quantize the scrambled pixels, making the image
/// impossible to restore.
pub fn lossless_format(path: &Path) -> Result<ImageFormat> {
    let format = ImageFormat::from_path(path).map_err(|_| {
        anyhow!(
            "Unsupported output format: cannot tell the image format of {}",
            path.display()
        )
    })?;

    if !is_lossless(format) {
        bail!(
            "Unsupported output format: {format:?} is lossy or not writable, use PNG, BMP, TIFF or WebP"
        );
    }
    Ok(format)
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read image: {}", path.display()))?;
    let image = image::load_from_memory(&bytes)
        .with_context(|| format!("Failed to decode image: {}", path.display()))?;
    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "Loaded image"
    );
    Ok(image)
}

/// Encode `image` in memory.
pub fn encode_image(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format)
        .with_context(|| format!("Failed to encode image as {format:?}"))?;
    Ok(buffer.into_inner())
}

/// Read a landmarks side file (`top bottom left right`).
pub fn read_landmarks(path: &Path) -> Result<LandmarkBox> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read landmarks file: {}", path.display()))?;
    text.parse::<LandmarkBox>()
        .map_err(|e| anyhow!("Failed to parse landmarks file {}: {e}", path.display()))
}

/// Load landmark points from a JSON `[[x, y], ...]` file.
pub fn load_points(path: &Path) -> Result<LandmarkPoints> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read points file: {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse points file: {}", path.display()))
}

/// Load a face catalog, trying CBOR first then JSON.
pub fn load_catalog(path: &Path) -> Result<FaceCatalog> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
    let catalog = FaceCatalog::from_bytes(&bytes)
        .with_context(|| format!("Failed to parse catalog: {}", path.display()))?;
    debug!(entries = catalog.len(), "Loaded catalog");
    Ok(catalog)
}

/// Write every file in order, or none of them.
///
/// Contents must already be fully encoded. If a write fails, files written
/// earlier in this call are removed again.
pub fn write_all_or_nothing(outputs: &[(PathBuf, Vec<u8>)]) -> Result<()> {
    for (i, (path, bytes)) in outputs.iter().enumerate() {
        if let Err(err) = fs::write(path, bytes) {
            for (written, _) in &outputs[..i] {
                if let Err(cleanup) = fs::remove_file(written) {
                    warn!(path = %written.display(), error = %cleanup, "Failed to remove partial output");
                }
            }
            return Err(err).with_context(|| format!("Failed to write {}", path.display()));
        }
        debug!(path = %path.display(), bytes = bytes.len(), "Wrote output");
    }
    Ok(())
}
