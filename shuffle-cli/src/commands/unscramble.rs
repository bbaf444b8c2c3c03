//! Unscramble command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use shuffle_core::{Key, LandmarkBox, ScrambleMethod, Shuffler};
use tracing::{debug, info, warn};

use super::MethodArg;
use crate::config::Config;
use crate::{utils, Output};

#[derive(Args, Debug)]
pub struct UnscrambleArgs {
    /// Scrambled image
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Key terms followed by the four landmark values
    /// (top bottom left right) printed at scramble time
    #[arg(
        value_name = "VALUES",
        required = true,
        num_args = 1..,
        allow_negative_numbers = true
    )]
    pub values: Vec<String>,

    /// Directory for the restored image
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Landmarks file written at scramble time; its region size is checked
    /// against the landmarks given on the command line. Defaults to the
    /// `_Landmarks.txt` file next to the image, when present
    #[arg(short, long, value_name = "FILE")]
    pub landmarks: Option<PathBuf>,

    /// Method the image was scrambled with
    #[arg(short, long, value_enum)]
    pub method: Option<MethodArg>,
}

/// Split trailing landmark values off the key terms.
fn split_values(values: &[String]) -> Result<(Key, LandmarkBox)> {
    let (key_terms, landmark_terms) = values.split_at(values.len().saturating_sub(4));
    let landmarks: LandmarkBox = landmark_terms.join(" ").parse()?;
    let key: Key = key_terms.join(" ").parse()?;
    Ok((key, landmarks))
}

/// Execute the unscramble command.
pub fn execute(args: UnscrambleArgs, config: &Config, output: Output) -> Result<()> {
    let (key, landmarks) = split_values(&args.values)?;
    let method = args.method.map_or(config.method, ScrambleMethod::from);

    let requested_dir = args.output_dir.or_else(|| config.output_dir.clone());
    let out_dir = utils::resolve_output_dir(&args.image, requested_dir)?;
    let image_path = utils::unscrambled_path(&args.image, &out_dir)?;
    let format = utils::lossless_format(&image_path)?;

    let recorded_path = match args.landmarks {
        Some(path) => Some(path),
        None => {
            let side_file = utils::recorded_landmarks_path(&args.image)?;
            side_file.is_file().then_some(side_file)
        }
    };
    let expected_len = match &recorded_path {
        Some(path) => {
            let recorded = utils::read_landmarks(path)?;
            debug!(path = %path.display(), %recorded, n = recorded.area(), "Loaded recorded landmarks");
            Some(recorded.area())
        }
        None => {
            warn!(
                image = %args.image.display(),
                "No landmarks file found, region size cannot be checked"
            );
            None
        }
    };

    let image = utils::load_image(&args.image)?;
    let shuffler = Shuffler::from_key(key).with_method(method);
    let restored = match expected_len {
        Some(expected_len) => shuffler.unscramble_expecting(&image, landmarks, expected_len),
        None => shuffler.unscramble(&image, landmarks),
    }
    .context("Unscrambling failed")?;

    let image_bytes = utils::encode_image(&restored, format)?;
    utils::write_all_or_nothing(&[(image_path.clone(), image_bytes)])?;

    info!(path = %image_path.display(), %landmarks, %method, "Image unscrambled");

    if !output.quiet {
        println!("{}", "Face region restored".green().bold());
        println!("   {} {}", "Image:".dimmed(), image_path.display());
        println!("   {} {}", "Region:".dimmed(), landmarks);
        println!("   {} {}", "Method:".dimmed(), method);
    }

    Ok(())
}
