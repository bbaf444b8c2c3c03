//! imageshuffle - reversible key-based face scrambling.

use std::io::IsTerminal;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod exit_codes;
mod utils;

use config::Config;
use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  64  Usage error (invalid key, region, output directory or catalog name)
  65  Data error (no face, region size mismatch, corrupt landmarks or catalog)
  66  Input file missing or unreadable
  74  Output could not be written";

#[derive(Parser)]
#[command(name = "imageshuffle")]
#[command(author, version, about = "Reversible key-based face scrambling", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Print only results and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// When to color output
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scramble the face region of an image with a key
    Scramble(commands::scramble::ScrambleArgs),

    /// Restore a scrambled image with its key and landmarks
    Unscramble(commands::unscramble::UnscrambleArgs),

    /// Identify the face in an image against a catalog
    Recognize(commands::recognize::RecognizeArgs),

    /// Build or extend a face catalog from a directory of labelled images
    Encode(commands::encode::EncodeArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Apply to `colored` output and report whether log lines may use ANSI.
    fn apply(self) -> bool {
        match self {
            Self::Always => {
                colored::control::set_override(true);
                true
            }
            Self::Never => {
                colored::control::set_override(false);
                false
            }
            Self::Auto => std::io::stderr().is_terminal(),
        }
    }
}

/// Output verbosity shared by every command.
#[derive(Clone, Copy, Debug)]
pub struct Output {
    pub quiet: bool,
}

fn init_tracing(cli: &Cli, config: &Config, ansi: bool) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    let filter = config
        .log_filter
        .as_deref()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .init();
}

fn run(cli: Cli, config: &Config) -> Result<()> {
    let output = Output { quiet: cli.quiet };

    match cli.command {
        Commands::Scramble(args) => commands::scramble::execute(args, config, output),
        Commands::Unscramble(args) => commands::unscramble::execute(args, config, output),
        Commands::Recognize(args) => commands::recognize::execute(args, config, output),
        Commands::Encode(args) => commands::encode::execute(args, output),
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version also arrive here
            let code = if err.use_stderr() {
                exit_codes::USAGE_ERROR
            } else {
                exit_codes::SUCCESS
            };
            let _ = err.print();
            process::exit(code);
        }
    };

    let config = Config::from_env();
    let ansi = cli.color.apply();
    init_tracing(&cli, &config, ansi);

    if let Err(err) = run(cli, &config) {
        let exit = ExitCode::from_anyhow(&err);
        if let Some(message) = &exit.message {
            eprintln!("{} {}", "Error:".red().bold(), message);
        }
        process::exit(exit.code);
    }
}
