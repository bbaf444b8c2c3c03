//! Scramble command implementation.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Args};
use colored::Colorize;
use shuffle_core::{FixedLandmarks, Key, LandmarkBox, LandmarkDetector, ScrambleMethod, Shuffler};
use tracing::info;

use super::MethodArg;
use crate::config::Config;
use crate::{utils, Output};

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("landmarks").required(true).args(["region", "points"])))]
pub struct ScrambleArgs {
    /// Image to scramble
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Key terms: 10 to 100 integers between 1 and 200
    #[arg(value_name = "KEY", required = true, num_args = 1.., allow_negative_numbers = true)]
    pub key: Vec<String>,

    /// Directory for the scrambled image and landmarks file
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Face box as top,bottom,left,right (bottom and right exclusive)
    #[arg(long, value_name = "T,B,L,R")]
    pub region: Option<LandmarkBox>,

    /// JSON file of [x, y] landmark points from a landmark model
    #[arg(long, value_name = "FILE")]
    pub points: Option<PathBuf>,

    /// How the key is turned into a pixel permutation
    #[arg(short, long, value_enum)]
    pub method: Option<MethodArg>,
}

/// Execute the scramble command.
pub fn execute(args: ScrambleArgs, config: &Config, output: Output) -> Result<()> {
    let key: Key = args.key.join(" ").parse()?;
    let method = args.method.map_or(config.method, ScrambleMethod::from);

    let requested_dir = args.output_dir.or_else(|| config.output_dir.clone());
    let out_dir = utils::resolve_output_dir(&args.image, requested_dir)?;
    let image_path = utils::scrambled_path(&args.image, &out_dir)?;
    let landmarks_path = utils::landmarks_path(&args.image, &out_dir)?;
    let format = utils::lossless_format(&image_path)?;

    let image = utils::load_image(&args.image)?;
    let detector: Box<dyn LandmarkDetector> = match (args.region, &args.points) {
        (Some(region), _) => Box::new(FixedLandmarks(region)),
        (None, Some(points)) => Box::new(utils::load_points(points)?),
        (None, None) => bail!("Missing landmarks: pass --region or --points"),
    };

    let shuffler = Shuffler::from_key(key).with_method(method);
    let (scrambled, landmarks) = shuffler
        .scramble(&image, detector.as_ref())
        .context("Scrambling failed")?;

    // Encode everything before touching the filesystem
    let image_bytes = utils::encode_image(&scrambled, format)?;
    let landmark_bytes = format!("{landmarks}\n").into_bytes();
    utils::write_all_or_nothing(&[
        (image_path.clone(), image_bytes),
        (landmarks_path.clone(), landmark_bytes),
    ])?;

    info!(
        path = %image_path.display(),
        %landmarks,
        n = landmarks.area(),
        %method,
        "Image scrambled"
    );

    if !output.quiet {
        println!("{}", "Face region scrambled".green().bold());
        println!("   {} {}", "Image:".dimmed(), image_path.display());
        println!("   {} {}", "Landmarks:".dimmed(), landmarks_path.display());
        println!(
            "   {} {} ({} pixels)",
            "Region:".dimmed(),
            landmarks,
            landmarks.area()
        );
        println!("   {} {}", "Method:".dimmed(), method);
        println!("   {} {}", "Key:".dimmed(), shuffler.key().fingerprint());
    }

    Ok(())
}
