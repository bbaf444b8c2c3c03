//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling scripts to tell a bad key from a missing file.

use shuffle_core::ShuffleError;

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (invalid key, region, output directory).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Data format error (no face, size mismatch, corrupt side file).
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// I/O error (cannot write output file).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Represents an exit code with optional error context.
#[derive(Debug)]
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Library errors carry their own classification
        let code = match err.chain().find_map(|e| e.downcast_ref::<ShuffleError>()) {
            Some(shuffle_err) => Self::classify(shuffle_err),
            None => Self::classify_message(&message),
        };

        Self {
            code,
            message: Some(message),
        }
    }

    fn classify(err: &ShuffleError) -> i32 {
        match err {
            ShuffleError::InvalidKey { .. } | ShuffleError::InvalidRegion(_) => USAGE_ERROR,
            ShuffleError::FaceNotFound
            | ShuffleError::SizeMismatch { .. }
            | ShuffleError::InvalidPermutation(_)
            | ShuffleError::UnsupportedImage(_)
            | ShuffleError::Catalog(_) => DATA_ERROR,
        }
    }

    fn classify_message(message: &str) -> i32 {
        if message.contains("Failed to read") || message.contains("not found") {
            INPUT_ERROR
        } else if message.contains("Failed to parse") || message.contains("Failed to decode") {
            DATA_ERROR
        } else if message.contains("Invalid output directory")
            || message.contains("Unsupported output format")
            || message.contains("Unsupported catalog")
        {
            USAGE_ERROR
        } else if message.contains("Failed to write") || message.contains("Failed to encode") {
            IO_ERROR
        } else {
            GENERAL_ERROR
        }
    }
}
