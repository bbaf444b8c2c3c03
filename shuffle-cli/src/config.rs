//! CLI configuration
//!
//! Defaults come from environment variables; command-line flags override
//! them.

use std::path::PathBuf;

use shuffle_core::{ScrambleMethod, DEFAULT_MATCH_THRESHOLD};

/// Configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Output directory for written images (default: next to the input)
    pub output_dir: Option<PathBuf>,
    /// Maximum Hamming distance for a catalog match (default: 10)
    pub match_threshold: u32,
    /// Scramble method when `--method` is not given (default: permutation)
    pub method: ScrambleMethod,
    /// Log filter directives, overriding `-v`/`-q`
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: None,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            method: ScrambleMethod::default(),
            log_filter: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value. Unparseable values fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let output_dir = lookup("IMAGESHUFFLE_OUTPUT_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        let match_threshold = lookup("IMAGESHUFFLE_MATCH_THRESHOLD")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.match_threshold);

        let method = lookup("IMAGESHUFFLE_METHOD")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.method);

        let log_filter = lookup("IMAGESHUFFLE_LOG")
            .or_else(|| lookup("RUST_LOG"))
            .filter(|filter| !filter.trim().is_empty());

        Self {
            output_dir,
            match_threshold,
            method,
            log_filter,
        }
    }
}
