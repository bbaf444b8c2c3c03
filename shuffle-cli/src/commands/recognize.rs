//! Recognize command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use shuffle_core::{FaceEncoder, FixedLandmarks, LandmarkBox, PerceptualEncoder};
use tracing::info;

use crate::config::Config;
use crate::{utils, Output};

#[derive(Args, Debug)]
pub struct RecognizeArgs {
    /// Image containing the face to identify
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Catalog written by `encode` (.json or .cbor)
    #[arg(value_name = "CATALOG")]
    pub catalog: PathBuf,

    /// Maximum Hamming distance for a catalog entry to count as a match
    #[arg(short, long, value_name = "N")]
    pub threshold: Option<u32>,

    /// Only encode this box (top,bottom,left,right) instead of the whole image
    #[arg(long, value_name = "T,B,L,R")]
    pub region: Option<LandmarkBox>,
}

/// Execute the recognize command.
pub fn execute(args: RecognizeArgs, config: &Config, output: Output) -> Result<()> {
    let threshold = args.threshold.unwrap_or(config.match_threshold);
    let catalog = utils::load_catalog(&args.catalog)?;
    let image = utils::load_image(&args.image)?;

    let encoder = PerceptualEncoder::default();
    let encoding = match args.region {
        Some(region) => encoder.encode_detected(&image, &FixedLandmarks(region)),
        None => encoder.encode(&image),
    }
    .context("Encoding face failed")?;

    let name = catalog.recognize(&encoding, threshold);
    info!(
        encoding = %encoding.to_hex(),
        threshold,
        matched = name.unwrap_or("-"),
        "Recognition finished"
    );

    match name {
        Some(name) if output.quiet => println!("{name}"),
        Some(name) => println!("{} {}", "Match:".dimmed(), name.green().bold()),
        None if output.quiet => println!("No match"),
        None => println!("{}", "No match".yellow()),
    }

    Ok(())
}
