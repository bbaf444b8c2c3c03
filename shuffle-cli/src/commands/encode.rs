//! Encode command implementation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use image::ImageFormat;
use shuffle_core::{FaceCatalog, FaceEncoder, PerceptualEncoder};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::{utils, Output};

/// On-disk catalog encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CatalogFormat {
    /// Human-readable JSON
    Json,
    /// Compact CBOR
    Cbor,
}

impl CatalogFormat {
    /// Format implied by the catalog's file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Ok(Self::Json),
            Some("cbor") => Ok(Self::Cbor),
            _ => bail!(
                "Unsupported catalog extension: {} (expected .json or .cbor)",
                path.display()
            ),
        }
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Directory of images, one subdirectory per person
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Catalog to create or append to (.json or .cbor)
    #[arg(value_name = "CATALOG")]
    pub catalog: PathBuf,

    /// Catalog encoding (defaults to the catalog's extension)
    #[arg(short, long, value_enum)]
    pub format: Option<CatalogFormat>,
}

/// Label for an image: its parent directory name, or the file stem for
/// images at the top of the dataset.
fn label_for(dataset: &Path, image: &Path) -> Option<String> {
    let parent = image.parent()?;
    let name = if parent == dataset {
        image.file_stem()?
    } else {
        parent.file_name()?
    };
    name.to_str().map(str::to_string)
}

/// Execute the encode command.
pub fn execute(args: EncodeArgs, output: Output) -> Result<()> {
    let format = match args.format {
        Some(format) => {
            // The extension must still be a catalog extension
            CatalogFormat::from_path(&args.catalog)?;
            format
        }
        None => CatalogFormat::from_path(&args.catalog)?,
    };

    if !args.dataset.is_dir() {
        bail!("Dataset not found: {}", args.dataset.display());
    }

    let mut catalog = if args.catalog.exists() {
        utils::load_catalog(&args.catalog)?
    } else {
        FaceCatalog::new()
    };
    let existing = catalog.len();

    let encoder = PerceptualEncoder::default();
    let mut added = FaceCatalog::new();
    let mut per_name: BTreeMap<String, usize> = BTreeMap::new();

    let entries = WalkDir::new(&args.dataset)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "Skipping unreadable dataset entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| ImageFormat::from_path(entry.path()).is_ok());

    for entry in entries {
        let path = entry.path();
        let Some(name) = label_for(&args.dataset, path) else {
            warn!(path = %path.display(), "Skipping image without a usable label");
            continue;
        };

        let encoding = match utils::load_image(path).and_then(|image| Ok(encoder.encode(&image)?)) {
            Ok(encoding) => encoding,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Skipping image");
                continue;
            }
        };

        debug!(path = %path.display(), %name, encoding = %encoding.to_hex(), "Encoded image");
        *per_name.entry(name.clone()).or_default() += 1;
        added.push(name, encoding);
    }

    if added.is_empty() {
        bail!(
            "Failed to read dataset: no decodable images in {}",
            args.dataset.display()
        );
    }

    let added_count = added.len();
    catalog.merge(added);

    let bytes = match format {
        CatalogFormat::Json => catalog.to_json(),
        CatalogFormat::Cbor => catalog.to_cbor(),
    }
    .context("Failed to encode catalog")?;
    utils::write_all_or_nothing(&[(args.catalog.clone(), bytes)])?;

    info!(
        path = %args.catalog.display(),
        added = added_count,
        total = catalog.len(),
        "Catalog written"
    );

    if !output.quiet {
        println!("{}", "Catalog updated".green().bold());
        println!("   {} {}", "Catalog:".dimmed(), args.catalog.display());
        println!(
            "   {} {} ({} already present)",
            "Encoded:".dimmed(),
            added_count,
            existing
        );
        for (name, count) in &per_name {
            println!("   {} {} x{}", "Face:".dimmed(), name, count);
        }
    }

    Ok(())
}
