//! Subcommand implementations.

pub mod encode;
pub mod recognize;
pub mod scramble;
pub mod unscramble;

use clap::ValueEnum;
use shuffle_core::ScrambleMethod;

/// `--method` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    /// Keyed shuffle of every pixel in the region
    Permutation,
    /// Key-scheduled swaps of whole rows
    RowSwap,
}

impl From<MethodArg> for ScrambleMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Permutation => ScrambleMethod::Permutation,
            MethodArg::RowSwap => ScrambleMethod::RowSwap,
        }
    }
}
