use std::path::PathBuf;

use clap::Parser;

/// Benchmark scaling analyzer
#[derive(Debug, Parser)]
pub struct Args {
    /// Path to the benchmark results CSV
    pub results: PathBuf,

    /// Directory the chart images are written to
    #[arg(short, default_value = ".")]
    pub out_dir: PathBuf,
}
